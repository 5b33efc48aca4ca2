/// How repeated likes/unlikes are reported.
///
/// Strict mode surfaces `AlreadyLiked` / `NotLiked` so clients can detect
/// double submissions; relaxed mode treats them as no-ops that report the
/// current count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementPolicy {
    pub strict_toggle: bool,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            strict_toggle: true,
        }
    }
}
