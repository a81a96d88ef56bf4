//! Sink configuration: the tunable timing constants and hard-reset budget,
//! assembled with a builder in the teacher's `EmacConfig::new().with_*`
//! style.

use crate::constants;
use crate::error::ConfigError;

/// Build-time-tunable configuration for one port's stack.
///
/// All fields default to the values in [`crate::constants`]; use the
/// `with_*` methods to override one at a time, then [`SinkConfig::validate`]
/// before handing it to [`crate::port::Port::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinkConfig {
    pub(crate) t_typec_sink_wait_cap_ms: u32,
    pub(crate) t_sender_response_ms: u32,
    pub(crate) t_ps_transition_ms: u32,
    pub(crate) t_sink_request_ms: u32,
    pub(crate) t_pps_request_ms: u32,
    pub(crate) t_chunking_not_supported_ms: u32,
    pub(crate) t_pd_debounce_ms: u32,
    pub(crate) t_hard_reset_complete_ms: u32,
    pub(crate) n_hard_reset_count: u8,
}

impl SinkConfig {
    /// Configuration using the spec-default timing constants.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            t_typec_sink_wait_cap_ms: constants::T_TYPEC_SINK_WAIT_CAP_MS,
            t_sender_response_ms: constants::T_SENDER_RESPONSE_MS,
            t_ps_transition_ms: constants::T_PS_TRANSITION_MS,
            t_sink_request_ms: constants::T_SINK_REQUEST_MS,
            t_pps_request_ms: constants::T_PPS_REQUEST_MS,
            t_chunking_not_supported_ms: constants::T_CHUNKING_NOT_SUPPORTED_MS,
            t_pd_debounce_ms: constants::T_PD_DEBOUNCE_MS,
            t_hard_reset_complete_ms: constants::T_HARD_RESET_COMPLETE_MS,
            n_hard_reset_count: constants::N_HARD_RESET_COUNT,
        }
    }

    /// Override the initial Source_Capabilities wait.
    #[must_use]
    pub const fn with_typec_sink_wait_cap_ms(mut self, ms: u32) -> Self {
        self.t_typec_sink_wait_cap_ms = ms;
        self
    }

    /// Override the Request/Soft_Reset response timeout.
    #[must_use]
    pub const fn with_sender_response_ms(mut self, ms: u32) -> Self {
        self.t_sender_response_ms = ms;
        self
    }

    /// Override the PS_RDY-after-Accept timeout.
    #[must_use]
    pub const fn with_ps_transition_ms(mut self, ms: u32) -> Self {
        self.t_ps_transition_ms = ms;
        self
    }

    /// Override the `Ready`-state request retry interval while `min_power`.
    #[must_use]
    pub const fn with_sink_request_ms(mut self, ms: u32) -> Self {
        self.t_sink_request_ms = ms;
        self
    }

    /// Override the PPS keepalive period.
    #[must_use]
    pub const fn with_pps_request_ms(mut self, ms: u32) -> Self {
        self.t_pps_request_ms = ms;
        self
    }

    /// Override the hard-reset retry budget.
    #[must_use]
    pub const fn with_hard_reset_count(mut self, count: u8) -> Self {
        self.n_hard_reset_count = count;
        self
    }

    /// Validate the timing constants and hard-reset count are within the
    /// ranges the USB-PD specification allows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = (310..=620).contains(&self.t_typec_sink_wait_cap_ms)
            && (24..=30).contains(&self.t_sender_response_ms)
            && (450..=550).contains(&self.t_ps_transition_ms)
            && self.t_sink_request_ms > 0
            && self.t_pps_request_ms > 0
            && self.t_pps_request_ms <= 10_000
            && (40..=50).contains(&self.t_chunking_not_supported_ms)
            && (10..=20).contains(&self.t_pd_debounce_ms)
            && self.t_hard_reset_complete_ms > 0;
        if !in_range {
            return Err(ConfigError::InvalidTiming);
        }
        if self.n_hard_reset_count == 0 || self.n_hard_reset_count > 16 {
            return Err(ConfigError::InvalidHardResetCount);
        }
        Ok(())
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SinkConfig::new().validate().is_ok());
    }

    #[test]
    fn out_of_range_timing_is_rejected() {
        let config = SinkConfig::new().with_sender_response_ms(1000);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }

    #[test]
    fn zero_hard_reset_count_is_rejected() {
        let config = SinkConfig::new().with_hard_reset_count(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidHardResetCount));
    }

    #[test]
    fn builder_overrides_compose() {
        let config = SinkConfig::new()
            .with_sender_response_ms(28)
            .with_hard_reset_count(3);
        assert_eq!(config.t_sender_response_ms, 28);
        assert_eq!(config.n_hard_reset_count, 3);
        assert!(config.validate().is_ok());
    }
}
