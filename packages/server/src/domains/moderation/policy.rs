use crate::common::{CoreError, CoreResult};

/// Validation policy for moderation input (configured per deployment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationPolicy {
    /// Minimum rejection reason length in characters, after trimming whitespace
    pub min_reason_len: usize,
}

impl ModerationPolicy {
    pub const DEFAULT_MIN_REASON_LEN: usize = 10;

    /// Check a rejection reason. The reason is stored exactly as given; trimming
    /// only applies to the length check.
    pub fn validate_reason(&self, reason: &str) -> CoreResult<()> {
        let trimmed = reason.trim();
        if trimmed.is_empty() || trimmed.chars().count() < self.min_reason_len {
            return Err(CoreError::InvalidReason {
                min_len: self.min_reason_len.max(1),
            });
        }
        Ok(())
    }
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            min_reason_len: Self::DEFAULT_MIN_REASON_LEN,
        }
    }
}
