//! Voice-note transcoding via the ffmpeg CLI.
//!
//! Re-encodes a clip at an increased tempo (`atempo` audio filter) inside a
//! scratch directory. Temp files are namespaced by job id (`<id>.ogg` for
//! the decoded input, `<id>_accelerated.ogg` for the output) and are always
//! removed before a failure is reported; the caller removes them after it
//! has consumed a successful result (see [`Transcoder::cleanup`]).

mod error;

pub use error::{Error, Result};

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use {
    base64::Engine,
    tokio::process::Command,
    tracing::{debug, warn},
};

use zaprelay_common::Config;

/// File extension for both temp files.
const AUDIO_EXT: &str = "ogg";

/// Suffix distinguishing the output path from the input path.
const OUTPUT_SUFFIX: &str = "_accelerated";

/// Binary name searched in PATH when no explicit path is configured.
const BINARY_NAME: &str = "ffmpeg";

/// ffmpeg-backed tempo transcoder.
///
/// Jobs with distinct ids touch disjoint files, so no internal locking is
/// needed; the caller guarantees id uniqueness (message ids are unique).
#[derive(Debug, Clone)]
pub struct Transcoder {
    scratch_dir: PathBuf,
    tempo: f32,
    ffmpeg_path: Option<String>,
    timeout: Duration,
}

impl Transcoder {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            scratch_dir: config.scratch_dir.clone(),
            tempo: config.tempo,
            ffmpeg_path: config.ffmpeg_path.clone(),
            timeout: config.transcode_timeout,
        }
    }

    /// Create with explicit options (primarily for tests).
    #[must_use]
    pub fn with_options(
        scratch_dir: impl Into<PathBuf>,
        tempo: f32,
        ffmpeg_path: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            tempo,
            ffmpeg_path,
            timeout,
        }
    }

    /// Input temp file for a job: `<scratch>/<job_id>.ogg`.
    #[must_use]
    pub fn input_path(&self, job_id: &str) -> PathBuf {
        self.scratch_dir.join(format!("{job_id}.{AUDIO_EXT}"))
    }

    /// Output temp file for a job: `<scratch>/<job_id>_accelerated.ogg`.
    /// Always distinct from [`Self::input_path`] for the same id.
    #[must_use]
    pub fn output_path(&self, job_id: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{job_id}{OUTPUT_SUFFIX}.{AUDIO_EXT}"))
    }

    fn atempo_filter(&self) -> String {
        format!("atempo={}", self.tempo)
    }

    /// Find the ffmpeg binary: explicit config path first, then PATH.
    fn find_ffmpeg(&self) -> Option<PathBuf> {
        if let Some(ref path_str) = self.ffmpeg_path {
            let path = Path::new(path_str);
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            warn!(path = %path_str, "configured ffmpeg path does not exist");
            return None;
        }
        which::which(BINARY_NAME).ok()
    }

    /// Decode the base64 clip, re-encode it at the configured tempo, and
    /// return the output path.
    ///
    /// On any failure from the input write onward, both temp files are
    /// removed before the error is returned. On success the caller owns
    /// both files and must call [`Self::cleanup`] once done.
    pub async fn transcode(&self, audio_b64: &str, job_id: &str) -> Result<PathBuf> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(audio_b64)?;

        let ffmpeg = self.find_ffmpeg().ok_or(Error::BinaryNotFound)?;

        tokio::fs::create_dir_all(&self.scratch_dir).await?;

        let input = self.input_path(job_id);
        let output = self.output_path(job_id);

        // The write itself can fail partway (disk full) and leave a partial
        // input file, so it sits inside the cleanup-guarded block too.
        let result = async {
            tokio::fs::write(&input, &bytes).await?;
            debug!(job_id, tempo = self.tempo, "running ffmpeg");
            self.run_pipeline(&ffmpeg, &input, &output, job_id).await
        }
        .await;

        match result {
            Ok(()) => Ok(output),
            Err(err) => {
                self.cleanup(job_id).await;
                Err(err)
            },
        }
    }

    async fn run_pipeline(
        &self,
        ffmpeg: &Path,
        input: &Path,
        output: &Path,
        job_id: &str,
    ) -> Result<()> {
        let mut cmd = Command::new(ffmpeg);
        cmd.arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(input)
            .arg("-filter:a")
            .arg(self.atempo_filter())
            .arg(output);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;

        let out = match result {
            Err(_) => {
                return Err(Error::Timeout {
                    job_id: job_id.into(),
                    seconds: self.timeout.as_secs(),
                });
            },
            Ok(Err(spawn_err)) => {
                return Err(Error::Pipeline {
                    job_id: job_id.into(),
                    detail: spawn_err.to_string(),
                });
            },
            Ok(Ok(out)) => out,
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(Error::Pipeline {
                job_id: job_id.into(),
                detail: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Remove both temp files for a job if present. Idempotent: a missing
    /// file is not an error; anything else is logged and swallowed so the
    /// caller's finally-style invocation never fails.
    pub async fn cleanup(&self, job_id: &str) {
        for path in [self.input_path(job_id), self.output_path(job_id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(job_id, path = %path.display(), "removed temp file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                Err(e) => {
                    warn!(job_id, path = %path.display(), error = %e, "failed to remove temp file");
                },
            }
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn transcoder(dir: &Path, ffmpeg: Option<String>) -> Transcoder {
        Transcoder::with_options(dir, 1.25, ffmpeg, Duration::from_secs(10))
    }

    /// Write an executable stand-in for ffmpeg.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    /// Copies the `-i` input to the final argument, like a successful run.
    #[cfg(unix)]
    const COPY_SCRIPT: &str = "#!/bin/sh\n\
        in=\"\"\n\
        while [ \"$#\" -gt 1 ]; do\n\
          if [ \"$1\" = \"-i\" ]; then in=\"$2\"; fi\n\
          shift\n\
        done\n\
        cp \"$in\" \"$1\"\n";

    #[cfg(unix)]
    const FAIL_SCRIPT: &str = "#!/bin/sh\necho 'boom: invalid data' >&2\nexit 1\n";

    #[cfg(unix)]
    const SLEEP_SCRIPT: &str = "#!/bin/sh\nsleep 5\n";

    #[test]
    fn paths_are_distinct_and_deterministic() {
        let t = transcoder(Path::new("temp"), None);
        let input = t.input_path("abc123");
        let output = t.output_path("abc123");
        assert_eq!(input, PathBuf::from("temp/abc123.ogg"));
        assert_eq!(output, PathBuf::from("temp/abc123_accelerated.ogg"));
        assert_ne!(input, output);
    }

    #[test]
    fn atempo_filter_formats_tempo() {
        let t = transcoder(Path::new("temp"), None);
        assert_eq!(t.atempo_filter(), "atempo=1.25");
        let t = Transcoder::with_options("temp", 1.5, None, Duration::from_secs(1));
        assert_eq!(t.atempo_filter(), "atempo=1.5");
    }

    #[tokio::test]
    async fn cleanup_of_missing_files_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcoder(dir.path(), None);
        // Nothing was ever written; both calls must be no-ops.
        t.cleanup("nope").await;
        t.cleanup("nope").await;
    }

    #[tokio::test]
    async fn invalid_base64_fails_before_any_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcoder(dir.path(), None);
        let err = t.transcode("not base64!!!", "job1").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(!t.input_path("job1").exists());
        assert!(!t.output_path("job1").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_produces_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = fake_ffmpeg(dir.path(), COPY_SCRIPT);
        let t = transcoder(dir.path(), Some(ffmpeg));

        let b64 = base64::engine::general_purpose::STANDARD.encode(b"fake ogg bytes");
        let output = t.transcode(&b64, "abc123").await.unwrap();

        assert_eq!(output, t.output_path("abc123"));
        assert!(output.exists());
        assert_eq!(std::fs::read(&output).unwrap(), b"fake ogg bytes");
        // Caller-side cleanup removes both files.
        t.cleanup("abc123").await;
        assert!(!t.input_path("abc123").exists());
        assert!(!t.output_path("abc123").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pipeline_failure_cleans_up_and_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = fake_ffmpeg(dir.path(), FAIL_SCRIPT);
        let t = transcoder(dir.path(), Some(ffmpeg));

        let b64 = base64::engine::general_purpose::STANDARD.encode(b"clip");
        let err = t.transcode(&b64, "abc123").await.unwrap_err();

        match err {
            Error::Pipeline { job_id, detail } => {
                assert_eq!(job_id, "abc123");
                assert!(detail.contains("boom"));
            },
            other => panic!("expected pipeline error, got {other:?}"),
        }
        assert!(!t.input_path("abc123").exists());
        assert!(!t.output_path("abc123").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_input_write_cleans_up_the_input_path() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = fake_ffmpeg(dir.path(), COPY_SCRIPT);
        let t = transcoder(dir.path(), Some(ffmpeg));

        // Occupy the input path with a symlink loop so the write itself
        // fails mid-job, after the scratch dir already exists.
        let input = t.input_path("leakjob");
        std::os::unix::fs::symlink("leakjob.ogg", &input).unwrap();

        let b64 = base64::engine::general_purpose::STANDARD.encode(b"clip");
        let err = t.transcode(&b64, "leakjob").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        // Nothing left at either path, not even the symlink.
        assert!(std::fs::symlink_metadata(&input).is_err());
        assert!(!t.output_path("leakjob").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timed_out_run_cleans_up_and_reports_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = fake_ffmpeg(dir.path(), SLEEP_SCRIPT);
        let t = Transcoder::with_options(dir.path(), 1.25, Some(ffmpeg), Duration::from_millis(100));

        let b64 = base64::engine::general_purpose::STANDARD.encode(b"clip");
        let err = t.transcode(&b64, "slowjob").await.unwrap_err();

        match err {
            Error::Timeout { job_id, .. } => assert_eq!(job_id, "slowjob"),
            other => panic!("expected timeout error, got {other:?}"),
        }
        assert!(!t.input_path("slowjob").exists());
        assert!(!t.output_path("slowjob").exists());
    }

    #[tokio::test]
    async fn missing_binary_is_reported_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcoder(
            dir.path(),
            Some(dir.path().join("no-such-ffmpeg").to_str().unwrap().into()),
        );
        let b64 = base64::engine::general_purpose::STANDARD.encode(b"clip");
        let err = t.transcode(&b64, "job2").await.unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound));
        assert!(!t.input_path("job2").exists());
    }
}
