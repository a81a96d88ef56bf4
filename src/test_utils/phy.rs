//! A scripted [`PhyDriver`] for exercising `tasks::*` without real silicon.
//!
//! Every queue is filled up-front by a test and drained in FIFO order by the
//! task under test, the same `set_register`-then-assert shape as the
//! teacher's `MockMdioBus`, just keyed by call rather than by register
//! address.

use core::cell::RefCell;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::message::MessageBuffer;
use crate::phy::{DriverRxError, DriverTxError, PhyDriver, PhyStatus, TypeCCurrent};

/// A [`PhyDriver::BusError`] standing in for a real bus error; carries no
/// data since no test needs to distinguish bus failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// A [`PhyDriver`] entirely scripted by a test: responses to `read_status`
/// and `read_message` are queued up-front, and every `send_message`/
/// `send_hard_reset`/`reset` call is recorded for later assertion.
#[derive(Default)]
pub struct ScriptedPhy {
    statuses: RefCell<VecDeque<Result<PhyStatus, MockBusError>>>,
    rx_messages: RefCell<VecDeque<Result<MessageBuffer, DriverRxError<MockBusError>>>>,
    tx_result: RefCell<Option<Result<(), DriverTxError<MockBusError>>>>,
    typec_current: RefCell<TypeCCurrent>,
    sent_messages: RefCell<Vec<MessageBuffer>>,
    hard_resets_sent: RefCell<usize>,
    resets: RefCell<usize>,
}

impl ScriptedPhy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            typec_current: RefCell::new(TypeCCurrent::Default),
            ..Default::default()
        }
    }

    /// Queue the next [`PhyDriver::read_status`] result.
    pub fn push_status(&self, status: PhyStatus) {
        self.statuses.borrow_mut().push_back(Ok(status));
    }

    /// Queue the next [`PhyDriver::read_message`] result.
    pub fn push_rx_message(&self, message: MessageBuffer) {
        self.rx_messages.borrow_mut().push_back(Ok(message));
    }

    pub fn push_rx_error(&self, error: DriverRxError<MockBusError>) {
        self.rx_messages.borrow_mut().push_back(Err(error));
    }

    /// Set what the next `send_message`/`send_hard_reset` call returns.
    /// Defaults to `Ok(())` when unset.
    pub fn set_tx_result(&self, result: Result<(), DriverTxError<MockBusError>>) {
        *self.tx_result.borrow_mut() = Some(result);
    }

    pub fn set_typec_current(&self, current: TypeCCurrent) {
        *self.typec_current.borrow_mut() = current;
    }

    /// Every message handed to `send_message`, in order.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<MessageBuffer> {
        self.sent_messages.borrow().clone()
    }

    #[must_use]
    pub fn hard_resets_sent(&self) -> usize {
        *self.hard_resets_sent.borrow()
    }

    #[must_use]
    pub fn resets(&self) -> usize {
        *self.resets.borrow()
    }

    fn tx_result(&self) -> Result<(), DriverTxError<MockBusError>> {
        self.tx_result.borrow().unwrap_or(Ok(()))
    }
}

impl PhyDriver for ScriptedPhy {
    type BusError = MockBusError;

    async fn reset(&mut self) -> Result<(), Self::BusError> {
        *self.resets.borrow_mut() += 1;
        Ok(())
    }

    async fn send_hard_reset(&mut self) -> Result<(), DriverTxError<Self::BusError>> {
        *self.hard_resets_sent.borrow_mut() += 1;
        self.tx_result()
    }

    async fn send_message(&mut self, message: &MessageBuffer) -> Result<(), DriverTxError<Self::BusError>> {
        self.sent_messages.borrow_mut().push(*message);
        self.tx_result()
    }

    async fn read_message(&mut self, buffer: &mut MessageBuffer) -> Result<usize, DriverRxError<Self::BusError>> {
        match self.rx_messages.borrow_mut().pop_front() {
            Some(Ok(message)) => {
                let bytes = message.as_bytes();
                buffer.storage_mut()[..bytes.len()].copy_from_slice(bytes);
                buffer.set_len(bytes.len());
                Ok(bytes.len())
            }
            Some(Err(error)) => Err(error),
            None => Err(DriverRxError::Discarded),
        }
    }

    async fn read_status(&mut self) -> Result<PhyStatus, Self::BusError> {
        match self.statuses.borrow_mut().pop_front() {
            Some(result) => result,
            None => Ok(PhyStatus::default()),
        }
    }

    async fn get_typec_current(&mut self) -> Result<TypeCCurrent, Self::BusError> {
        Ok(*self.typec_current.borrow())
    }

    async fn setup(&mut self) -> Result<(), Self::BusError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::{PhyInterruptStatus, PhyStatus};
    use crate::test_utils::block_on;

    #[test]
    fn read_status_drains_queue_then_reports_idle() {
        let mut phy = ScriptedPhy::new();
        phy.push_status(PhyStatus {
            interrupts: PhyInterruptStatus {
                i_tx_sent: true,
                ..Default::default()
            },
        });
        let first = block_on(phy.read_status()).unwrap();
        assert!(first.interrupts.i_tx_sent);
        let second = block_on(phy.read_status()).unwrap();
        assert!(!second.interrupts.any());
    }

    #[test]
    fn send_message_records_and_defaults_to_success() {
        let mut phy = ScriptedPhy::new();
        let message = MessageBuffer::from_header_and_objects(0x1234, &[]);
        block_on(phy.send_message(&message)).unwrap();
        assert_eq!(phy.sent_messages(), std::vec![message]);
    }

    #[test]
    fn send_message_honours_scripted_failure() {
        let mut phy = ScriptedPhy::new();
        phy.set_tx_result(Err(DriverTxError::Discarded));
        let message = MessageBuffer::from_header_and_objects(0x1234, &[]);
        assert_eq!(
            block_on(phy.send_message(&message)),
            Err(DriverTxError::Discarded)
        );
    }

    #[test]
    fn read_message_copies_scripted_bytes_into_buffer() {
        let mut phy = ScriptedPhy::new();
        let scripted = MessageBuffer::from_header_and_objects(0xBEEF, &[7]);
        phy.push_rx_message(scripted);
        let mut buffer = MessageBuffer::EMPTY;
        let len = block_on(phy.read_message(&mut buffer)).unwrap();
        assert_eq!(len, scripted.as_bytes().len());
        assert_eq!(buffer, scripted);
    }
}
