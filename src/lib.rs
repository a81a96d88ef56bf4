//! USB Power Delivery Sink Protocol Stack
//!
//! A `no_std`, `no_alloc` Rust implementation of a USB-PD sink's protocol
//! stack, targeting FUSB302B-class PHYs.
//!
//! This crate provides the Policy Engine, Protocol Layer, and Hard-Reset
//! coordinator that sit between a board-specific [`phy::PhyDriver`]
//! implementation and a board-specific [`dpm::DevicePolicyManager`], the way
//! the PD Buddy Sink Firmware splits `lib/src/policy_engine.c` from
//! `src/device_policy_manager.c`.
//!
//! # Architecture
//!
//! The stack is organized into five cooperative, concurrent tasks
//! ([`tasks`]), each a direct translation of one ChibiOS thread in the
//! original firmware:
//!
//! 1. **INT_N dispatcher** ([`tasks::int_n`]): polls the PHY and fans
//!    interrupt bits out to the other four tasks' event channels.
//! 2. **Protocol RX** ([`tasks::protocol_rx`]): tracks received message IDs
//!    and hands validated messages to the Policy Engine.
//! 3. **Protocol TX** ([`tasks::protocol_tx`]): constructs, transmits, and
//!    retries outgoing messages on the Policy Engine's behalf.
//! 4. **Hard-Reset coordinator** ([`tasks::hard_reset`]): drives the
//!    Hard Reset signaling sequence shared by the Policy Engine and the PHY.
//! 5. **Policy Engine** ([`tasks::policy_engine`]): the USB-PD sink state
//!    machine itself.
//!
//! Tasks communicate only through [`sync::EventChannel`]s and
//! [`sync::Mailbox`]es bundled per-port in [`tasks::channels::Channels`], and
//! share port state through [`sync::SharedPort`] — all built on
//! [`sync::primitives::CriticalSectionCell`]/[`sync::primitives::AtomicWaker`]
//! so any task can be driven from interrupt or task context alike.
//!
//! # Supported PHYs
//!
//! This crate does not ship a register-level PHY driver; implement
//! [`phy::PhyDriver`] against your silicon (see [`phy::fusb302b`] for a
//! sketch against the FUSB302B's I2C register map).
//!
//! # Features
//!
//! - `defmt`: Derive [`defmt::Format`] on public types for embedded logging.
//!
//! # Example
//!
//! ```ignore
//! use usb_pd_sink::config::SinkConfig;
//! use usb_pd_sink::message::{DataRole, PowerRole};
//! use usb_pd_sink::sync::SharedPort;
//! use usb_pd_sink::tasks::channels::Channels;
//!
//! static PORT: SharedPort = SharedPort::new(PowerRole::Sink, DataRole::Ufp);
//! static CHANNELS: Channels = Channels::new();
//!
//! let config = SinkConfig::new().with_hard_reset_count(2);
//! config.validate().unwrap();
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in clippy.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod constants;
pub mod dpm;
pub mod error;
pub mod message;
pub mod phy;
pub mod port;
pub mod sync;
pub mod tasks;

// Test utilities (only available during testing)
#[cfg(test)]
mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::SinkConfig;
pub use dpm::DevicePolicyManager;
pub use error::{ConfigError, ConfigResult, Error, PhyError, PhyResult, PoolError, PoolResult, Result};
pub use phy::{PhyDriver, PhyInterruptStatus, PhyStatus, TypeCCurrent};
pub use port::{PeState, Port};
pub use sync::SharedPort;
