//! Solver options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration resolved once per solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipOptions {
    /// Require integer solutions (otherwise the rational optimum is returned)
    pub integer: bool,
    /// Compute the lexicographic maximum instead of the minimum
    pub maximize: bool,
    /// Unknowns may be negative
    pub urs_unknowns: bool,
    /// Parameters may be negative
    pub urs_params: bool,
    /// Attach dual values to rational leaves
    pub compute_dual: bool,
    /// Collapse redundant branches of the result
    pub simplify: bool,
    /// Strengthen constant cuts with a Bezout multiplier
    pub deepest_cut: bool,
    /// Verbosity level (0-3)
    pub verbosity: u8,
    /// Give up after this many engine iterations
    pub max_iterations: Option<u64>,
    /// Give up after this much wall-clock time
    pub time_limit: Option<Duration>,
}

impl Default for PipOptions {
    fn default() -> Self {
        Self {
            integer: true,
            maximize: false,
            urs_unknowns: false,
            urs_params: false,
            compute_dual: false,
            simplify: true,
            deepest_cut: false,
            verbosity: 0,
            max_iterations: None,
            time_limit: None,
        }
    }
}

impl PipOptions {
    /// Same as [`PipOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the rational optimum instead of the integer one.
    pub fn with_rational(mut self) -> Self {
        self.integer = false;
        self
    }

    /// Ask for the lexicographic maximum.
    pub fn with_maximize(mut self, enable: bool) -> Self {
        self.maximize = enable;
        self
    }

    /// Let the unknowns take negative values.
    pub fn with_urs_unknowns(mut self, enable: bool) -> Self {
        self.urs_unknowns = enable;
        self
    }

    /// Let the parameters take negative values.
    pub fn with_urs_params(mut self, enable: bool) -> Self {
        self.urs_params = enable;
        self
    }

    /// Dual values are only computed for rational solutions.
    pub fn with_dual(mut self, enable: bool) -> Self {
        self.compute_dual = enable;
        self
    }

    /// Keep or collapse redundant branches.
    pub fn with_simplify(mut self, enable: bool) -> Self {
        self.simplify = enable;
        self
    }

    /// Use the Bezout-strengthened constant cut.
    pub fn with_deepest_cut(mut self, enable: bool) -> Self {
        self.deepest_cut = enable;
        self
    }

    /// Logging detail, from 0 (silent) to 3 (tableau dumps).
    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.verbosity = level;
        self
    }

    /// Iteration budget, shared by every solve of a [`crate::pip::Solver`].
    pub fn with_max_iterations(mut self, limit: u64) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    /// Wall-clock budget of each solve.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Whether a big parameter shift is needed for the unknowns.
    pub(crate) fn shifts_unknowns(&self) -> bool {
        self.maximize || self.urs_unknowns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = PipOptions::default();
        assert!(opts.integer);
        assert!(opts.simplify);
        assert!(!opts.maximize);
        assert!(!opts.shifts_unknowns());
    }

    #[test]
    fn test_builder() {
        let opts = PipOptions::new()
            .with_rational()
            .with_maximize(true)
            .with_dual(true)
            .with_max_iterations(10);
        assert!(!opts.integer);
        assert!(opts.shifts_unknowns());
        assert!(opts.compute_dual);
        assert_eq!(opts.max_iterations, Some(10));
    }

    #[test]
    fn test_serde_round_trip() {
        let opts = PipOptions::new()
            .with_urs_params(true)
            .with_time_limit(Duration::from_millis(250));
        let json = serde_json::to_string(&opts).unwrap();
        let back: PipOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }
}
