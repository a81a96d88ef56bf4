//! Reference sketch of a [`super::generic::PhyDriver`] for the FUSB302B.
//!
//! A full register-level driver is out of scope for this crate (Non-goals,
//! spec.md §1) — there is no I2C register map, no BMC encoder, no CC-pin
//! detection logic here. This module documents the shape such a driver
//! would take, grounded on the I2C address table and per-port config in
//! `lib/include/pdb_fusb.h`, so that downstream crates implementing
//! [`super::generic::PhyDriver`] against real silicon have a starting point.

/// FUSB302B I2C address (package variant `FUSB302BMPX`).
pub const FUSB302B_ADDR: u8 = 0x22;
/// FUSB302B01 I2C address.
pub const FUSB302B01_ADDR: u8 = 0x23;
/// FUSB302B10 I2C address.
pub const FUSB302B10_ADDR: u8 = 0x24;
/// FUSB302B11 I2C address.
pub const FUSB302B11_ADDR: u8 = 0x25;

/// Per-port configuration needed to talk to one FUSB302B, mirroring
/// `struct pdb_fusb_config` (`lib/include/pdb_fusb.h`): an I2C bus handle,
/// the chip's bus address, and the GPIO line wired to `INT_N`.
///
/// Left generic over the bus/pin types so callers can plug in whatever
/// `embedded-hal`/`embedded-hal-async` implementation their board support
/// crate provides; this crate does not depend on any specific HAL.
#[derive(Debug, Clone, Copy)]
pub struct Fusb302bConfig<I2c, IntPin> {
    /// The I2C bus the FUSB302B is attached to.
    pub i2c: I2c,
    /// The chip's 7-bit I2C address (one of the `FUSB302B*_ADDR` constants).
    pub address: u8,
    /// The GPIO input wired to the chip's open-drain `INT_N` output.
    pub int_n: IntPin,
}

impl<I2c, IntPin> Fusb302bConfig<I2c, IntPin> {
    /// Build a config for the base `FUSB302BMPX` part at its default address.
    pub fn new(i2c: I2c, int_n: IntPin) -> Self {
        Self {
            i2c,
            address: FUSB302B_ADDR,
            int_n,
        }
    }

    /// Override the I2C address, e.g. for the `B01`/`B10`/`B11` variants.
    #[must_use]
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }
}
