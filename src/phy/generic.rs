//! The `PhyDriver` trait and the status types carried across it.
//!
//! `PhyInterruptStatus` follows the same flat bool-struct-parsed-from-a-raw-
//! word idiom as the teacher's `driver::interrupt::InterruptStatus`, here
//! decoding the FUSB302B's `INTERRUPT`/`INTERRUPTA`/`INTERRUPTB` registers
//! instead of a DMA status word (`lib/src/int_n.c`'s `fusb_get_status`).
//! `PhyDriver` itself is grounded on
//! `examples/other_examples/4fb1e7c8_elagil-usbpd__usbpd-traits-src-lib.rs.rs`'s
//! `Driver` trait: async-fn-in-trait, associated RX/TX error types, and
//! `HAS_AUTO_*` associated consts describing what the hardware does for you.

use core::future::Future;

use crate::message::MessageBuffer;

/// Type-C Current advertisement read from `fusb_tcc_current`
/// (`enum fusb_typec_current` in `lib/include/pdb_fusb.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TypeCCurrent {
    /// No valid Type-C Current detected (not attached, or a PD-only source
    /// advertising default via Rp).
    None,
    /// Default USB current (500 mA / 900 mA depending on USB generation).
    Default,
    /// 1.5 A advertisement.
    Current1500mA,
    /// 3.0 A advertisement.
    Current3000mA,
}

/// Decoded `INTERRUPT`/`INTERRUPTA`/`INTERRUPTB`/`STATUS1` bits relevant to
/// the protocol tasks, as read by [`PhyDriver::read_status`].
///
/// Mirrors `lib/src/int_n.c`'s `IntNPoll`: each flag here corresponds to
/// exactly one event that function signals to a specific task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyInterruptStatus {
    /// `INTERRUPTB.I_GCRCSENT`: a GoodCRC was sent in response to a valid
    /// received message. Signals the Protocol RX task.
    pub i_gcrc_sent: bool,
    /// `INTERRUPTA.I_RETRYFAIL`: the hardware retry counter expired without
    /// receiving a GoodCRC. Signals the Protocol TX task.
    pub i_retry_fail: bool,
    /// `INTERRUPTA.I_TXSENT`: a message (and its GoodCRC) was sent
    /// successfully. Signals the Protocol TX task.
    pub i_tx_sent: bool,
    /// `INTERRUPTA.I_HARDRST`: a Hard Reset ordered signal was received from
    /// the line. Signals the Hard-Reset task.
    pub i_hard_reset: bool,
    /// `INTERRUPTA.I_HARDSENT`: a Hard Reset ordered signal finished
    /// transmitting. Signals the Hard-Reset task.
    pub i_hard_sent: bool,
    /// `INTERRUPT.I_OCP_TEMP`: the over-current/over-temperature interrupt
    /// fired. Combined with [`Self::overtemp`] before being forwarded.
    pub i_ocp_temp: bool,
    /// `STATUS1.OVRTEMP`: the over-temperature status bit is currently set.
    pub overtemp: bool,
}

impl PhyInterruptStatus {
    /// Whether any flag is set (mirrors `InterruptStatus::any`).
    #[must_use]
    pub fn any(&self) -> bool {
        self.i_gcrc_sent
            || self.i_retry_fail
            || self.i_tx_sent
            || self.i_hard_reset
            || self.i_hard_sent
            || self.i_ocp_temp
    }

    /// Whether the combination of `i_ocp_temp` and `overtemp` represents a
    /// real over-temperature event that must be forwarded to the Policy
    /// Engine (`lib/src/int_n.c` ANDs the interrupt bit with the status
    /// bit before signalling `PDB_EVT_PE_I_OVRTEMP`).
    #[must_use]
    pub fn is_overtemp_event(&self) -> bool {
        self.i_ocp_temp && self.overtemp
    }
}

/// A snapshot of PHY status not tied to a specific interrupt, returned
/// alongside [`PhyInterruptStatus`] by [`PhyDriver::read_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyStatus {
    /// Decoded interrupt flags for this poll.
    pub interrupts: PhyInterruptStatus,
}

/// Error receiving a message from the PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverRxError<E> {
    /// The underlying transport reported an error.
    Bus(E),
    /// The received message was discarded (CRC failure, concurrent
    /// transmission on the line).
    Discarded,
    /// A Hard Reset ordered signal was received before or during reception.
    HardReset,
}

/// Error transmitting a message through the PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverTxError<E> {
    /// The underlying transport reported an error.
    Bus(E),
    /// Transmission was discarded (collision, excessive noise, no GoodCRC
    /// and the hardware retry counter expired).
    Discarded,
    /// A Hard Reset ordered signal was received before or during
    /// transmission.
    HardReset,
}

/// The contract the protocol tasks use to talk to the PHY.
///
/// A concrete FUSB302B implementation is out of scope for this crate
/// (Non-goals, spec.md §1); [`super::fusb302b`] sketches how one would be
/// built against this trait and an I2C bus.
pub trait PhyDriver {
    /// The underlying transport's error type (typically an I2C error).
    type BusError: core::fmt::Debug;

    /// If `true`, the PHY sends GoodCRC automatically and the Protocol RX
    /// task does not construct or transmit its own.
    const HAS_AUTO_GOOD_CRC: bool = true;

    /// If `true`, the PHY automatically retries an unacknowledged
    /// transmission up to the configured retry count, and the Protocol TX
    /// task does not implement its own `Check_RetryCounter` loop (it still
    /// waits for the terminal `I_TXSENT`/`I_RETRYFAIL` interrupt).
    const HAS_AUTO_RETRY: bool = true;

    /// Reset the PHY's PD logic (message IDs, FIFOs) without touching
    /// Type-C detection. Called when entering the Hard-Reset coordinator's
    /// `ResetLayer` state.
    fn reset(&mut self) -> impl Future<Output = Result<(), Self::BusError>>;

    /// Drive a Hard Reset ordered signal onto the line.
    fn send_hard_reset(&mut self) -> impl Future<Output = Result<(), DriverTxError<Self::BusError>>>;

    /// Transmit an encoded message.
    fn send_message(
        &mut self,
        message: &MessageBuffer,
    ) -> impl Future<Output = Result<(), DriverTxError<Self::BusError>>>;

    /// Receive the next message into `buffer`, returning its encoded length.
    fn read_message(
        &mut self,
        buffer: &mut MessageBuffer,
    ) -> impl Future<Output = Result<usize, DriverRxError<Self::BusError>>>;

    /// Read and clear the pending interrupt/status bits (the INT_N
    /// dispatcher's per-poll action in `lib/src/int_n.c`).
    fn read_status(&mut self) -> impl Future<Output = Result<PhyStatus, Self::BusError>>;

    /// Read the current Type-C Current advertisement on CC.
    fn get_typec_current(&mut self) -> impl Future<Output = Result<TypeCCurrent, Self::BusError>>;

    /// One-time hardware bring-up: configure the PHY for PD communication
    /// and enable its interrupt sources.
    fn setup(&mut self) -> impl Future<Output = Result<(), Self::BusError>>;
}
