//! Power Data Objects, as sent in a Source_Capabilities message.
//!
//! Unit scaling follows the original firmware's `PD_PDV2MV`/`PD_MV2PDV` and
//! `PD_CA2PAI` family of macros (confirmed against
//! `src/device_policy_manager.c`): Fixed PDO voltage is 50 mV/unit, Fixed PDO
//! current is 10 mA/unit, and Augmented PDO (PPS) voltage is 100 mV/unit
//! with current in 50 mA/unit.

use proc_bitfield::bitfield;

/// Fixed-point voltage, stored internally in millivolts.
pub type MilliVolts = u32;
/// Fixed-point current, stored internally in milliamps.
pub type MilliAmps = u32;

bitfield! {
    /// Raw 32-bit Power Data Object with only the 2-bit type tag decoded
    /// generically; use [`PowerDataObject::decode`] for the typed view.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    struct RawPdo(pub u32): Debug, FromStorage, IntoStorage {
        pub raw_type: u8 @ 30..=31,
        pub raw_apdo_type: u8 @ 28..=29,
    }
}

bitfield! {
    /// A Fixed Supply Power Data Object (type `00`).
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct FixedSupplyPdo(pub u32): Debug, FromStorage, IntoStorage {
        pub dual_role_power: bool @ 29,
        pub usb_suspend_supported: bool @ 28,
        pub unconstrained_power: bool @ 27,
        pub usb_comms_capable: bool @ 26,
        pub dual_role_data: bool @ 25,
        pub raw_voltage: u16 @ 10..=19,
        pub raw_max_current: u16 @ 0..=9,
    }
}

impl FixedSupplyPdo {
    /// Voltage in millivolts (raw field is 50 mV/unit).
    #[must_use]
    pub fn voltage_mv(&self) -> MilliVolts {
        MilliVolts::from(self.raw_voltage()) * 50
    }

    /// Maximum current in milliamps (raw field is 10 mA/unit).
    #[must_use]
    pub fn max_current_ma(&self) -> MilliAmps {
        MilliAmps::from(self.raw_max_current()) * 10
    }

    /// Build a Fixed Supply PDO from millivolts/milliamps, rounding down to
    /// the nearest representable unit.
    #[must_use]
    pub fn from_mv_ma(voltage_mv: MilliVolts, max_current_ma: MilliAmps) -> Self {
        Self(0)
            .with_raw_voltage(((voltage_mv / 50) & 0x3FF) as u16)
            .with_raw_max_current(((max_current_ma / 10) & 0x3FF) as u16)
    }
}

bitfield! {
    /// A Programmable Power Supply Augmented Power Data Object (PPS APDO,
    /// type `11`, APDO type `00`). Only introduced in spec revision 3.0.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct PpsApdo(pub u32): Debug, FromStorage, IntoStorage {
        pub pps_power_limited: bool @ 27,
        pub raw_max_voltage: u8 @ 17..=24,
        pub raw_min_voltage: u8 @ 8..=15,
        pub raw_max_current: u8 @ 0..=6,
    }
}

impl PpsApdo {
    /// Maximum voltage in millivolts (raw field is 100 mV/unit).
    #[must_use]
    pub fn max_voltage_mv(&self) -> MilliVolts {
        MilliVolts::from(self.raw_max_voltage()) * 100
    }

    /// Minimum voltage in millivolts (raw field is 100 mV/unit).
    #[must_use]
    pub fn min_voltage_mv(&self) -> MilliVolts {
        MilliVolts::from(self.raw_min_voltage()) * 100
    }

    /// Maximum current in milliamps (raw field is 50 mA/unit).
    #[must_use]
    pub fn max_current_ma(&self) -> MilliAmps {
        MilliAmps::from(self.raw_max_current()) * 50
    }

    /// Build a PPS APDO from millivolts/milliamps, rounding down to the
    /// nearest representable unit.
    #[must_use]
    pub fn from_mv_ma(min_voltage_mv: MilliVolts, max_voltage_mv: MilliVolts, max_current_ma: MilliAmps) -> Self {
        Self(0)
            .with_raw_min_voltage(((min_voltage_mv / 100) & 0xFF) as u8)
            .with_raw_max_voltage(((max_voltage_mv / 100) & 0xFF) as u8)
            .with_raw_max_current(((max_current_ma / 50) & 0x7F) as u8)
    }
}

/// A single entry of a Source_Capabilities message, decoded from its 2-bit
/// (and, for Augmented, nested 2-bit) type tag.
///
/// Variable Supply and Battery Supply PDOs are out of scope (Non-goals):
/// they decode to [`PowerDataObject::Other`] rather than a typed variant,
/// since this stack never requests against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDataObject {
    /// Type `00`: Fixed Supply.
    Fixed(FixedSupplyPdo),
    /// Type `11`, APDO type `00`: Programmable Power Supply.
    Pps(PpsApdo),
    /// Any other PDO type/object-position combination (Variable Supply,
    /// Battery Supply, or a non-PPS Augmented PDO).
    Other(u32),
}

impl PowerDataObject {
    /// Decode a raw 32-bit data object into its typed form.
    #[must_use]
    pub fn decode(raw: u32) -> Self {
        let tag = RawPdo(raw);
        match tag.raw_type() {
            0b00 => Self::Fixed(FixedSupplyPdo(raw)),
            0b11 if tag.raw_apdo_type() == 0b00 => Self::Pps(PpsApdo(raw)),
            _ => Self::Other(raw),
        }
    }

    /// Re-encode back to a raw 32-bit data object.
    #[must_use]
    pub fn encode(&self) -> u32 {
        match self {
            Self::Fixed(pdo) => u32::from(*pdo),
            Self::Pps(apdo) => u32::from(*apdo),
            Self::Other(raw) => *raw,
        }
    }
}
