use std::fmt;
use std::time::Duration;

use crate::topology::RoutingMode;

pub const DEFAULT_RIP_PERIODIC_UPDATE_RATE_MS: u64 = 5000;
pub const DEFAULT_RIP_TIMEOUT_THRESHOLD_MS: u64 = 12000;
pub const DEFAULT_TCP_RTO_MIN_US: u64 = 1000;
pub const DEFAULT_TCP_RTO_MAX_US: u64 = 5_000_000;

/// Protocol timers set by the `rip` and `tcp` directives.
/// RIP timers are in milliseconds, TCP retransmission bounds in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingParameters {
    pub rip_periodic_update_rate_ms: u64,
    pub rip_timeout_threshold_ms: u64,
    pub tcp_rto_min_us: u64,
    pub tcp_rto_max_us: u64,
}

impl Default for TimingParameters {
    fn default() -> Self {
        TimingParameters {
            rip_periodic_update_rate_ms: DEFAULT_RIP_PERIODIC_UPDATE_RATE_MS,
            rip_timeout_threshold_ms: DEFAULT_RIP_TIMEOUT_THRESHOLD_MS,
            tcp_rto_min_us: DEFAULT_TCP_RTO_MIN_US,
            tcp_rto_max_us: DEFAULT_TCP_RTO_MAX_US,
        }
    }
}

impl TimingParameters {
    /// How often a router sends its periodic RIP update
    pub fn rip_periodic_update_rate(&self) -> Duration {
        Duration::from_millis(self.rip_periodic_update_rate_ms)
    }
    /// How long a learned RIP route lives without being refreshed
    pub fn rip_timeout_threshold(&self) -> Duration {
        Duration::from_millis(self.rip_timeout_threshold_ms)
    }
    pub fn tcp_rto_min(&self) -> Duration {
        Duration::from_micros(self.tcp_rto_min_us)
    }
    pub fn tcp_rto_max(&self) -> Duration {
        Duration::from_micros(self.tcp_rto_max_us)
    }
}

impl fmt::Display for TimingParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "rip periodic-update-rate {} # in milliseconds",
            self.rip_periodic_update_rate_ms
        )?;
        writeln!(
            f,
            "rip route-timeout-threshold {} # in milliseconds",
            self.rip_timeout_threshold_ms
        )?;
        writeln!(f, "tcp rto-min {} # in microseconds", self.tcp_rto_min_us)?;
        writeln!(f, "tcp rto-max {} # in microseconds", self.tcp_rto_max_us)
    }
}

/// Knobs for a single parse.
///
/// `defaults` and `routing_mode` are the values a `Topology` starts from
/// before any line is read. With `strict_directives` set, a line whose first
/// token is not a known directive aborts the parse instead of being skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub defaults: TimingParameters,
    pub routing_mode: RoutingMode,
    pub strict_directives: bool,
}

impl ParserOptions {
    pub fn strict() -> Self {
        ParserOptions {
            strict_directives: true,
            ..ParserOptions::default()
        }
    }
}
