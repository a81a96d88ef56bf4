//! Error types for the USB-PD sink stack.
//!
//! Errors here are strictly *software* errors — malformed configuration,
//! message-pool bookkeeping failures, and PHY I/O failures. Ordinary
//! *protocol* failures (timeouts, rejected requests, CRC mismatches handled
//! by soft/hard reset) are not errors in this sense: they are first-class
//! state transitions inside the Policy Engine and Protocol Layer tasks, per
//! §7 of the design. This module exists only for the boundary where a
//! `Result` is the right shape: pool exhaustion, configuration validation,
//! and PHY driver calls.

use core::fmt;

/// Errors from the shared message-buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// `alloc()` was called but every buffer in the pool is currently
    /// checked out. Resolves the "pool exhaustion" open question from the
    /// design notes: this is surfaced as a typed error rather than a panic
    /// or a block, since the pool is sized so this should never occur under
    /// correct ownership discipline and a `no_std` library must not assume
    /// it may panic.
    Exhausted,
}

impl PoolError {
    /// Human-readable description, independent of `Display`/`defmt`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "message pool exhausted",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors validating a [`crate::config::SinkConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A timing constant was set to zero or otherwise outside the range the
    /// USB-PD specification allows for it.
    InvalidTiming,
    /// The configured hard-reset retry count would never terminate (it must
    /// be small enough that the counter type cannot wrap).
    InvalidHardResetCount,
}

impl ConfigError {
    /// Human-readable description, independent of `Display`/`defmt`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTiming => "timing constant outside the USB-PD spec range",
            Self::InvalidHardResetCount => "hard reset count out of range",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the [`crate::phy::PhyDriver`] boundary, wrapping the
/// driver-specific receive/transmit error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyError<E> {
    /// The underlying transport (typically I2C) reported an error.
    Bus(E),
    /// The PHY reported a received packet was discarded (CRC failure,
    /// concurrent collision) rather than delivering it.
    Discarded,
}

impl<E: fmt::Debug> fmt::Display for PhyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "phy: bus error: {e:?}"),
            Self::Discarded => f.write_str("phy: message discarded"),
        }
    }
}

/// Unified error type for the crate's fallible, non-protocol operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// See [`PoolError`].
    Pool(PoolError),
    /// See [`ConfigError`].
    Config(ConfigError),
    /// See [`PhyError`].
    Phy(PhyError<E>),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "pool: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Phy(e) => write!(f, "{e}"),
        }
    }
}

impl<E> From<PoolError> for Error<E> {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl<E> From<PhyError<E>> for Error<E> {
    fn from(e: PhyError<E>) -> Self {
        Self::Phy(e)
    }
}

/// Result alias for [`PoolError`].
pub type PoolResult<T> = Result<T, PoolError>;
/// Result alias for [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
/// Result alias for [`PhyError`].
pub type PhyResult<T, E> = Result<T, PhyError<E>>;
/// Result alias for the unified [`Error`].
pub type Result<T, E> = core::result::Result<T, Error<E>>;
