/// Default backfill recovery bound.
///
/// Acts as a guard against runaway chains (a chain this long is
/// pathological, not a normal gap); recovery past this many headers is
/// truncated and logged.
pub const DEFAULT_ITERATION_LIMIT: usize = 1_000_000;

/// Configuration for a [`crate::Subscription`].
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Maximum number of headers collected in one backfill walk.
    pub iteration_limit: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            iteration_limit: DEFAULT_ITERATION_LIMIT,
        }
    }
}
