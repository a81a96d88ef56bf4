//! FUSB302B-class PHY driver contract.
//!
//! This module defines the boundary between the protocol tasks and the
//! physical FUSB302B (or compatible) transceiver. The actual register-level
//! I2C driver is out of scope (Non-goals, spec.md §1); [`generic`] provides
//! the trait itself plus the status/typec-current types the dispatcher and
//! Policy Engine need, and [`fusb302b`] sketches how a concrete
//! implementation would fill it in.
//!
//! # Architecture
//!
//! The PHY layer is independent of the protocol state machines, which talk
//! to it only through [`generic::PhyDriver`]. This allows:
//!
//! - Reuse across different transceiver generations
//! - Testing with the scripted doubles in [`crate::test_utils`]
//! - A host build with no hardware at all
//!
//! # Example
//!
//! ```ignore
//! use usb_pd_sink::phy::{PhyDriver, PhyInterruptStatus};
//!
//! async fn poll(phy: &mut impl PhyDriver) {
//!     let status = phy.read_status().await.unwrap();
//!     if status.i_gcrc_sent {
//!         // wake the protocol-rx task
//!     }
//! }
//! ```

pub mod fusb302b;
pub mod generic;

pub use generic::{
    DriverRxError, DriverTxError, PhyDriver, PhyInterruptStatus, PhyStatus, TypeCCurrent,
};
