//! Request Data Objects, sent by the sink in a Request message.
//!
//! Builder layout and unit scaling follow `src/device_policy_manager.c`'s
//! `pdbs_dpm_evaluate_capability`: Fixed/Variable RDOs use 10 mA/unit
//! current fields (`PD_RDO_FV_*_CURRENT_SET`), while a Programmable RDO
//! (rev 3.0 PPS) uses 50 mA/unit current and 20 mV/unit requested voltage
//! (`PD_CA2PAI`/`PD_MV2PRV`).

use proc_bitfield::bitfield;

use super::pdo::{MilliAmps, MilliVolts};

bitfield! {
    /// A Fixed or Variable Supply Request Data Object.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct FixedVariableRdo(pub u32): Debug, FromStorage, IntoStorage {
        /// 1-based index into the Source_Capabilities list being requested.
        pub object_position: u8 @ 28..=31,
        pub giveback: bool @ 27,
        pub capability_mismatch: bool @ 26,
        pub usb_comms_capable: bool @ 25,
        pub no_usb_suspend: bool @ 24,
        /// Minimum acceptable current (if `giveback`) or operating current,
        /// 10 mA/unit.
        pub raw_min_or_operating_current: u16 @ 10..=19,
        /// Maximum operating current, 10 mA/unit.
        pub raw_max_operating_current: u16 @ 0..=9,
    }
}

impl FixedVariableRdo {
    /// Build a Fixed/Variable RDO requesting `operating_ma` with a maximum
    /// of `max_ma`, against the `object_position`th (1-based) capability.
    #[must_use]
    pub fn new(
        object_position: u8,
        operating_ma: MilliAmps,
        max_ma: MilliAmps,
        no_usb_suspend: bool,
        usb_comms_capable: bool,
    ) -> Self {
        debug_assert!((1..=7).contains(&object_position));
        Self(0)
            .with_object_position(object_position)
            .with_giveback(false)
            .with_capability_mismatch(false)
            .with_usb_comms_capable(usb_comms_capable)
            .with_no_usb_suspend(no_usb_suspend)
            .with_raw_min_or_operating_current(((operating_ma / 10) & 0x3FF) as u16)
            .with_raw_max_operating_current(((max_ma / 10) & 0x3FF) as u16)
    }

    /// Build a GiveBack-capable Fixed/Variable RDO, where
    /// [`Self::raw_min_or_operating_current`] instead holds the minimum
    /// current the sink is willing to accept.
    #[must_use]
    pub fn new_giveback(
        object_position: u8,
        min_ma: MilliAmps,
        operating_ma: MilliAmps,
        no_usb_suspend: bool,
        usb_comms_capable: bool,
    ) -> Self {
        debug_assert!((1..=7).contains(&object_position));
        Self(0)
            .with_object_position(object_position)
            .with_giveback(true)
            .with_capability_mismatch(false)
            .with_usb_comms_capable(usb_comms_capable)
            .with_no_usb_suspend(no_usb_suspend)
            .with_raw_min_or_operating_current(((min_ma / 10) & 0x3FF) as u16)
            .with_raw_max_operating_current(((operating_ma / 10) & 0x3FF) as u16)
    }

    /// Operating (or, if `giveback`, minimum) current in milliamps.
    #[must_use]
    pub fn operating_current_ma(&self) -> MilliAmps {
        MilliAmps::from(self.raw_min_or_operating_current()) * 10
    }

    /// Maximum operating current in milliamps.
    #[must_use]
    pub fn max_operating_current_ma(&self) -> MilliAmps {
        MilliAmps::from(self.raw_max_operating_current()) * 10
    }
}

bitfield! {
    /// A Programmable Power Supply (PPS) Request Data Object.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ProgrammableRdo(pub u32): Debug, FromStorage, IntoStorage {
        pub object_position: u8 @ 28..=31,
        pub capability_mismatch: bool @ 26,
        pub usb_comms_capable: bool @ 25,
        pub no_usb_suspend: bool @ 24,
        /// Requested output voltage, 20 mV/unit.
        pub raw_output_voltage: u16 @ 9..=19,
        /// Requested operating current, 50 mA/unit.
        pub raw_operating_current: u8 @ 0..=6,
    }
}

impl ProgrammableRdo {
    /// Build a PPS RDO requesting `voltage_mv`/`current_ma` against the
    /// `object_position`th (1-based) APDO.
    #[must_use]
    pub fn new(
        object_position: u8,
        voltage_mv: MilliVolts,
        current_ma: MilliAmps,
        no_usb_suspend: bool,
        usb_comms_capable: bool,
    ) -> Self {
        debug_assert!((1..=7).contains(&object_position));
        Self(0)
            .with_object_position(object_position)
            .with_capability_mismatch(false)
            .with_usb_comms_capable(usb_comms_capable)
            .with_no_usb_suspend(no_usb_suspend)
            .with_raw_output_voltage(((voltage_mv / 20) & 0x7FF) as u16)
            .with_raw_operating_current(((current_ma / 50) & 0x7F) as u8)
    }

    /// Requested output voltage in millivolts.
    #[must_use]
    pub fn output_voltage_mv(&self) -> MilliVolts {
        MilliVolts::from(self.raw_output_voltage()) * 20
    }

    /// Requested operating current in milliamps.
    #[must_use]
    pub fn operating_current_ma(&self) -> MilliAmps {
        MilliAmps::from(self.raw_operating_current()) * 50
    }
}

/// Either flavor of Request Data Object this stack can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestDataObject {
    /// A request against a Fixed or Variable Supply PDO.
    FixedVariable(FixedVariableRdo),
    /// A request against a PPS APDO (revision 3.0 only).
    Programmable(ProgrammableRdo),
}

impl RequestDataObject {
    /// Encode to a raw 32-bit data object for transmission.
    #[must_use]
    pub fn encode(&self) -> u32 {
        match self {
            Self::FixedVariable(rdo) => u32::from(*rdo),
            Self::Programmable(rdo) => u32::from(*rdo),
        }
    }

    /// 1-based object position this request targets.
    #[must_use]
    pub fn object_position(&self) -> u8 {
        match self {
            Self::FixedVariable(rdo) => rdo.object_position(),
            Self::Programmable(rdo) => rdo.object_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_variable_rdo_round_trips_units() {
        let rdo = FixedVariableRdo::new(2, 2000, 3000, true, false);
        assert_eq!(rdo.object_position(), 2);
        assert_eq!(rdo.operating_current_ma(), 2000);
        assert_eq!(rdo.max_operating_current_ma(), 3000);
        assert!(!rdo.giveback());
        assert!(rdo.no_usb_suspend());
    }

    #[test]
    fn giveback_rdo_sets_flag_and_min_current() {
        let rdo = FixedVariableRdo::new_giveback(1, 500, 2000, true, false);
        assert!(rdo.giveback());
        assert_eq!(rdo.operating_current_ma(), 500);
        assert_eq!(rdo.max_operating_current_ma(), 2000);
    }

    #[test]
    fn programmable_rdo_round_trips_units() {
        let rdo = ProgrammableRdo::new(3, 9000, 3000, true, true);
        assert_eq!(rdo.object_position(), 3);
        assert_eq!(rdo.output_voltage_mv(), 9000);
        assert_eq!(rdo.operating_current_ma(), 3000);
        assert!(rdo.usb_comms_capable());
    }

    #[test]
    fn request_data_object_encode_dispatches() {
        let fixed = RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false));
        let prog = RequestDataObject::Programmable(ProgrammableRdo::new(4, 5000, 1000, true, false));
        assert_eq!(fixed.object_position(), 1);
        assert_eq!(prog.object_position(), 4);
        assert_ne!(fixed.encode(), prog.encode());
    }
}
