//! Protocol timing constants and other tunables from the USB-PD specification.
//!
//! Mirrors `lib/include/pd.h` / `lib/include/policy_engine.h` in the original
//! PD Buddy Sink Firmware: every wait in the Policy Engine and the Hard-Reset
//! coordinator is bounded by one of these durations. Values are expressed in
//! milliseconds so they can be handed directly to whatever timer type the
//! caller's executor provides.

/// Initial wait for Source_Capabilities after CC attach (310-620 ms per spec;
/// we pick the commonly used 620 ms upper bound so slow sources are not cut
/// off prematurely).
pub const T_TYPEC_SINK_WAIT_CAP_MS: u32 = 620;

/// Maximum time to wait for a Source's response to a Request or Soft_Reset.
pub const T_SENDER_RESPONSE_MS: u32 = 30;

/// Maximum time to wait for PS_RDY after an Accept.
pub const T_PS_TRANSITION_MS: u32 = 550;

/// Retry interval for a Request after receiving Wait, while in `Ready`.
pub const T_SINK_REQUEST_MS: u32 = 100;

/// Maximum period between PPS keepalive requests (rev 3.0 APDO contracts).
pub const T_PPS_REQUEST_MS: u32 = 10_000;

/// Wait before refusing an extended message that needs chunking support we
/// do not implement (single-chunk only, see spec Non-goals).
pub const T_CHUNKING_NOT_SUPPORTED_MS: u32 = 45;

/// Debounce period used while polling Type-C Current in `SourceUnresponsive`.
pub const T_PD_DEBOUNCE_MS: u32 = 15;

/// Maximum time to wait for the PHY to confirm it sent a hard reset before
/// giving up and moving on regardless (see [`crate::tasks::hard_reset`]).
pub const T_HARD_RESET_COMPLETE_MS: u32 = 5;

/// Number of consecutive hard resets tolerated before the Policy Engine
/// gives up and falls back to `SourceUnresponsive`.
pub const N_HARD_RESET_COUNT: u8 = 2;

/// Number of message buffers in the shared pool (§4.1): one RX-in-flight,
/// one PE-held, one TX-in-flight, and one spare.
pub const MESSAGE_POOL_SIZE: usize = 4;

/// Sentinel value meaning "no PPS APDO present" for the 3-bit object
/// position fields in [`crate::port::PeState`] (valid positions are 1-7).
pub const NO_PPS_INDEX: u8 = 8;

/// INT_N poll cadence used by [`crate::tasks::int_n`] on platforms without
/// a true edge-triggered interrupt.
pub const INT_N_POLL_INTERVAL_MS: u32 = 1;
