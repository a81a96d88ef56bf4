//! The 16-bit PD message header.
//!
//! Field layout per the USB-PD specification (and `lib/include/pd.h`'s
//! `PD_HDR_*` macros in the original firmware):
//!
//! ```text
//! bit  15 .. 12   message type      (4 bits)
//! bit      11     port data role    (1 bit)
//! bit  10 ..  9   spec revision     (2 bits)
//! bit       8     port power role   (1 bit)
//! bit   7 ..  5   message ID        (3 bits)
//! bit   4 ..  2   number of objects (3 bits)
//! bit       0     extended          (1 bit)
//! ```
//!
//! bit 1 is reserved and always read as zero.

use proc_bitfield::bitfield;

bitfield! {
    /// Typed view over a raw 16-bit PD message header.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Header(pub u16): Debug, FromStorage, IntoStorage {
        /// Raw 4-bit message type; see [`MessageType`] for the typed view.
        pub raw_message_type: u8 @ 12..=15,
        /// Data role of the sender: 0 = UFP, 1 = DFP.
        pub data_role: bool @ 11,
        /// Raw 2-bit specification revision; see [`SpecRevision`].
        pub raw_spec_revision: u8 @ 9..=10,
        /// Power role of the sender: 0 = Sink, 1 = Source.
        pub power_role: bool @ 8,
        /// Rolling message ID, 0-7, incremented by the sender per transmitted
        /// message (not incremented on retransmission).
        pub message_id: u8 @ 5..=7,
        /// Number of 32-bit data objects following the header, 0-7.
        pub num_data_objects: u8 @ 2..=4,
        /// Set if this is an extended message (header is followed by a
        /// 16-bit extended header rather than data objects directly).
        pub extended: bool @ 0,
    }
}

impl Header {
    /// Build a Control message header (`num_data_objects == 0`).
    #[must_use]
    pub const fn control(
        message_type: ControlMessageType,
        spec_revision: SpecRevision,
        power_role: PowerRole,
        data_role: DataRole,
        message_id: u8,
    ) -> Self {
        Self(0)
            .with_raw_message_type(message_type.to_raw())
            .with_raw_spec_revision(spec_revision as u8)
            .with_power_role(matches!(power_role, PowerRole::Source))
            .with_data_role(matches!(data_role, DataRole::Dfp))
            .with_message_id(message_id & 0x7)
            .with_num_data_objects(0)
            .with_extended(false)
    }

    /// Build a Data message header with `num_data_objects` objects following.
    #[must_use]
    pub const fn data(
        message_type: DataMessageType,
        spec_revision: SpecRevision,
        power_role: PowerRole,
        data_role: DataRole,
        message_id: u8,
        num_data_objects: u8,
    ) -> Self {
        debug_assert!(num_data_objects <= 7);
        Self(0)
            .with_raw_message_type(message_type.to_raw())
            .with_raw_spec_revision(spec_revision as u8)
            .with_power_role(matches!(power_role, PowerRole::Source))
            .with_data_role(matches!(data_role, DataRole::Dfp))
            .with_message_id(message_id & 0x7)
            .with_num_data_objects(num_data_objects)
            .with_extended(false)
    }

    /// Whether this header describes a Data message (`num_data_objects > 0`
    /// or extended), as opposed to a Control message.
    #[must_use]
    pub fn is_data_message(&self) -> bool {
        self.num_data_objects() > 0 || self.extended()
    }

    /// The message type interpreted according to [`Self::is_data_message`].
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        if self.is_data_message() {
            MessageType::Data(DataMessageType::from_raw(self.raw_message_type()))
        } else {
            MessageType::Control(ControlMessageType::from_raw(self.raw_message_type()))
        }
    }

    /// The negotiated/declared specification revision.
    #[must_use]
    pub fn spec_revision(&self) -> SpecRevision {
        SpecRevision::from_raw(self.raw_spec_revision())
    }
}

/// Specification revision carried in the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpecRevision {
    /// Revision 1.0. Never produced by this stack (see design notes open
    /// question on spec-revision selection); accepted on receive only for
    /// completeness of the decode path.
    V1_0 = 0b00,
    /// Revision 2.0.
    V2_0 = 0b01,
    /// Revision 3.0 (adds PPS APDOs, extended messages, Fast Role Swap).
    V3_0 = 0b10,
}

impl SpecRevision {
    fn from_raw(raw: u8) -> Self {
        match raw & 0b11 {
            0b00 => Self::V1_0,
            0b01 => Self::V2_0,
            _ => Self::V3_0,
        }
    }
}

/// Power role carried in the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerRole {
    /// Power sink. This stack always sends this role.
    Sink,
    /// Power source.
    Source,
}

/// Data role carried in the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRole {
    /// Upstream Facing Port.
    Ufp,
    /// Downstream Facing Port.
    Dfp,
}

/// Either a Control or a Data message type, resolved from the raw 4-bit
/// field plus `num_data_objects`/`extended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    /// A Control message (no data objects).
    Control(ControlMessageType),
    /// A Data message (one or more data objects, or an extended message).
    Data(DataMessageType),
}

/// Control message types this stack sends or must recognize on receive.
///
/// Non-goals exclude VDM/sourcing-specific messages; those decode to
/// [`ControlMessageType::Unknown`] rather than being individually named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ControlMessageType {
    /// Reserved / unused value 0.
    Reserved = 0x0,
    GoodCrc = 0x1,
    GotoMin = 0x2,
    Accept = 0x3,
    Reject = 0x4,
    Ping = 0x5,
    PsRdy = 0x6,
    GetSourceCap = 0x7,
    GetSinkCap = 0x8,
    DrSwap = 0x9,
    PrSwap = 0xA,
    VconnSwap = 0xB,
    Wait = 0xC,
    SoftReset = 0xD,
    NotSupported = 0xE,
    /// Any control message type this stack has no explicit handling for
    /// (revision-3.0-only control messages such as Get_Source_Cap_Extended).
    Unknown(u8),
}

impl ControlMessageType {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0x0 => Self::Reserved,
            0x1 => Self::GoodCrc,
            0x2 => Self::GotoMin,
            0x3 => Self::Accept,
            0x4 => Self::Reject,
            0x5 => Self::Ping,
            0x6 => Self::PsRdy,
            0x7 => Self::GetSourceCap,
            0x8 => Self::GetSinkCap,
            0x9 => Self::DrSwap,
            0xA => Self::PrSwap,
            0xB => Self::VconnSwap,
            0xC => Self::Wait,
            0xD => Self::SoftReset,
            0xE => Self::NotSupported,
            other => Self::Unknown(other),
        }
    }

    /// Re-encode back to the raw 4-bit message-type field.
    ///
    /// Written as an explicit match rather than `as u8`: the `Unknown(u8)`
    /// variant carries data, and casting a non-unit-variant enum with `as`
    /// is rejected by the compiler.
    const fn to_raw(self) -> u8 {
        match self {
            Self::Reserved => 0x0,
            Self::GoodCrc => 0x1,
            Self::GotoMin => 0x2,
            Self::Accept => 0x3,
            Self::Reject => 0x4,
            Self::Ping => 0x5,
            Self::PsRdy => 0x6,
            Self::GetSourceCap => 0x7,
            Self::GetSinkCap => 0x8,
            Self::DrSwap => 0x9,
            Self::PrSwap => 0xA,
            Self::VconnSwap => 0xB,
            Self::Wait => 0xC,
            Self::SoftReset => 0xD,
            Self::NotSupported => 0xE,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Data message types this stack sends or must recognize on receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataMessageType {
    SourceCapabilities = 0x1,
    Request = 0x2,
    SinkCapabilities = 0x4,
    /// Any data message type out of scope for this sink-only stack (VDM,
    /// BIST, Battery_Status, Alert, and revision-3.0-only types).
    Unknown(u8),
}

impl DataMessageType {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0x1 => Self::SourceCapabilities,
            0x2 => Self::Request,
            0x4 => Self::SinkCapabilities,
            other => Self::Unknown(other),
        }
    }

    /// Re-encode back to the raw 4-bit message-type field; see
    /// [`ControlMessageType::to_raw`] for why this can't just be `as u8`.
    const fn to_raw(self) -> u8 {
        match self {
            Self::SourceCapabilities => 0x1,
            Self::Request => 0x2,
            Self::SinkCapabilities => 0x4,
            Self::Unknown(raw) => raw,
        }
    }
}
