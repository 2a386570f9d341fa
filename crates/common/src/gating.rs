//! Sender identity gating.
//!
//! The platform reports senders with a transport suffix
//! (`5511999999999@c.us`); the allow-list is configured with the bare
//! number, so identifiers are normalized before comparison.

/// Strip the platform suffix from a sender identifier.
#[must_use]
pub fn normalize_sender(sender: &str) -> &str {
    sender.split('@').next().unwrap_or(sender)
}

/// Check whether a sender may interact with the relay.
///
/// `None` means no allow-list is configured, so everyone is allowed. When an
/// allowed number is set, the normalized sender must match it exactly.
#[must_use]
pub fn is_allowed(sender: &str, allowed: Option<&str>) -> bool {
    match allowed {
        None => true,
        Some(number) => normalize_sender(sender) == number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_platform_suffix() {
        assert_eq!(normalize_sender("5511999999999@c.us"), "5511999999999");
        assert_eq!(
            normalize_sender("5511999999999@s.whatsapp.net"),
            "5511999999999"
        );
        assert_eq!(normalize_sender("5511999999999"), "5511999999999");
    }

    #[test]
    fn no_allowlist_allows_everyone() {
        assert!(is_allowed("anyone@c.us", None));
        assert!(is_allowed("anyone", None));
    }

    #[test]
    fn allowlist_matches_normalized_sender() {
        assert!(is_allowed("5511999999999@c.us", Some("5511999999999")));
        assert!(is_allowed("5511999999999", Some("5511999999999")));
        assert!(!is_allowed("5511888888888@c.us", Some("5511999999999")));
    }

    #[test]
    fn allowlist_match_is_exact() {
        // Prefixes and suffixes of the allowed number must not pass.
        assert!(!is_allowed("55119999999990@c.us", Some("5511999999999")));
        assert!(!is_allowed("511999999999@c.us", Some("5511999999999")));
    }
}
