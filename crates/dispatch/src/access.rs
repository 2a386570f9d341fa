use zaprelay_common::gating;

/// Determine if an inbound message should be processed.
///
/// Returns `Ok(())` if the sender is allowed, or `Err(reason)` if the
/// message should be silently dropped.
pub fn check_access(allowed_number: Option<&str>, sender: &str) -> Result<(), AccessDenied> {
    if gating::is_allowed(sender, allowed_number) {
        Ok(())
    } else {
        Err(AccessDenied::NotAllowedNumber)
    }
}

/// Reason an inbound message was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    NotAllowedNumber,
}

impl std::fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAllowedNumber => write!(f, "sender is not the allowed number"),
        }
    }
}
