//! Engine tuning knobs and emulated terminal geometry.

use std::time::Duration;

/// Emulated terminal dimensions, advertised to spawned processes through the
/// `COLUMNS`/`LINES` environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    /// Terminal width.
    pub cols: u16,
    /// Terminal height.
    pub rows: u16,
}

impl Default for TermSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

impl TermSize {
    /// Reads dimensions from the environment, falling back to 80x24.
    pub fn from_env() -> Self {
        let cols = std::env::var("COLUMNS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(80);
        let rows = std::env::var("LINES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        Self { cols, rows }
    }
}

/// Configuration for the process engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a graceful stop waits for the listener to observe completion
    /// before escalating to a kill.
    pub grace_period: Duration,
    /// Cadence for state and exit polling loops.
    pub poll_interval: Duration,
    /// Broadcast ring capacity. A subscriber that falls further behind than
    /// this skips ahead to the oldest retained line.
    pub channel_capacity: usize,
    /// Terminal geometry advertised to PTY-emulated launches.
    pub term: TermSize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(2),
            poll_interval: Duration::from_millis(50),
            channel_capacity: 256,
            term: TermSize::default(),
        }
    }
}

impl EngineConfig {
    /// Creates config from environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            term: TermSize::from_env(),
            ..Default::default()
        }
    }

    /// Sets the terminal geometry.
    pub fn with_term(mut self, cols: u16, rows: u16) -> Self {
        self.term = TermSize { cols, rows };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.term, TermSize { cols: 80, rows: 24 });
    }

    #[test]
    fn test_with_term() {
        let config = EngineConfig::default().with_term(120, 40);
        assert_eq!(config.term.cols, 120);
        assert_eq!(config.term.rows, 40);
    }

    #[test]
    fn test_term_size_default() {
        assert_eq!(TermSize::default(), TermSize { cols: 80, rows: 24 });
    }

    #[test]
    fn test_from_env_matches_env_or_defaults() {
        // Reads the ambient environment the same way from_env does, so the
        // test holds whether or not COLUMNS/LINES are set.
        let cols = std::env::var("COLUMNS")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(80);
        let rows = std::env::var("LINES")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(24);

        let term = TermSize::from_env();
        assert_eq!(term, TermSize { cols, rows });
        assert_eq!(EngineConfig::from_env().term, term);
    }
}
