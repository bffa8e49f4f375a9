use core::num::NonZeroUsize;

const TEN: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Countdown settings for a [`CountdownTree`](crate::CountdownTree).
///
/// The tree runs a full rebalance pass every time its countdown reaches zero.
/// The first pass fires after `initial_countdown` mutating operations; every
/// pass after that fires after `max(height, min_period)` operations, where
/// `height` is the tree height right after the previous pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Operations before the first rebalance pass.
    pub initial_countdown: NonZeroUsize,

    /// Lower bound on the countdown after a pass.
    pub min_period: NonZeroUsize,
}

impl Config {
    /// Ten operations until the first pass, and at least ten between passes.
    pub const DEFAULT: Config = Config {
        initial_countdown: TEN,
        min_period: TEN,
    };

    #[must_use]
    pub const fn with_initial_countdown(mut self, initial_countdown: NonZeroUsize) -> Self {
        self.initial_countdown = initial_countdown;
        self
    }

    #[must_use]
    pub const fn with_min_period(mut self, min_period: NonZeroUsize) -> Self {
        self.min_period = min_period;
        self
    }

    /// Returns the countdown to use after a pass left the tree `height` tall.
    pub(crate) fn period_for(&self, height: usize) -> usize {
        height.max(self.min_period.get())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}
