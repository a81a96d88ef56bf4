//! Protocol TX: message-ID stamping, transmission, and GoodCRC matching.
//!
//! A direct translation of `lib/src/protocol_tx.c`'s nine-state machine.
//! Unlike [`super::protocol_rx`] (whose states return to `WaitPHY` after at
//! most a couple of hops and read naturally as a chain of `async fn` calls),
//! this state machine's states form real cycles — `WaitMessage` is reached
//! from `TransmissionError`/`MessageSent` as well as from `run`'s initial
//! entry — so it is written the way the C source's `switch` loop is,
//! as an explicit state enum driven by one `loop` in [`run`], with each
//! state a plain (non-recursive) `async fn`.
//!
//! The `Check_RetryCounter` state the generic PD spec describes is absent
//! here, same as in the C source: the FUSB302B (or any
//! [`PhyDriver::HAS_AUTO_RETRY`] PHY) retries automatically, so this layer
//! only ever learns the terminal `TxSent`/`RetryFail` outcome.

use crate::message::{ControlMessageType, Header, MessageBuffer, MessageType};
use crate::phy::PhyDriver;
use crate::sync::SharedPort;

use super::channels::Channels;
use super::events::prl_tx::{DISCARD, MSG_TX, RESET, RETRY_FAIL, TX_SENT};
use super::events::{pe, prl_rx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    PhyReset,
    WaitMessage,
    Reset,
    ConstructMessage,
    WaitResponse,
    MatchMessageId,
    TransmissionError,
    MessageSent,
    DiscardMessage,
}

/// Run the Protocol TX state machine forever.
pub async fn run<P: PhyDriver>(phy: &mut P, port: &SharedPort, channels: &Channels) -> ! {
    let mut state = TxState::PhyReset;
    let mut message: Option<MessageBuffer> = None;
    loop {
        state = match state {
            TxState::PhyReset => phy_reset(phy, channels, &mut message).await,
            TxState::WaitMessage => wait_message(channels, &mut message).await,
            TxState::Reset => reset(port, channels).await,
            TxState::ConstructMessage => construct_message(phy, port, channels, &mut message).await,
            TxState::WaitResponse => wait_response(channels).await,
            TxState::MatchMessageId => match_message_id(phy, port, &message).await,
            TxState::TransmissionError => transmission_error(port, channels, &mut message),
            TxState::MessageSent => message_sent(port, channels, &mut message),
            TxState::DiscardMessage => discard_message(port, &mut message),
        };
    }
}

async fn phy_reset<P: PhyDriver>(
    phy: &mut P,
    channels: &Channels,
    message: &mut Option<MessageBuffer>,
) -> TxState {
    let _ = phy.reset().await;

    if message.take().is_some() {
        channels.pe_events.signal(pe::TX_ERR);
    }

    TxState::WaitMessage
}

async fn wait_message(channels: &Channels, message: &mut Option<MessageBuffer>) -> TxState {
    let bits = channels.prl_tx_events.wait_any(RESET | DISCARD | MSG_TX).await;

    if bits & RESET != 0 {
        return TxState::PhyReset;
    }
    if bits & DISCARD != 0 {
        return TxState::DiscardMessage;
    }

    // bits & MSG_TX != 0: the Policy Engine already posted to the mailbox
    // before signalling, so this never blocks in practice.
    let buffer = channels.prl_tx_inbox.fetch().await;
    *message = Some(buffer);

    if is_soft_reset(&buffer) {
        TxState::Reset
    } else {
        TxState::ConstructMessage
    }
}

fn is_soft_reset(buffer: &MessageBuffer) -> bool {
    let header = Header(buffer.raw_header());
    matches!(
        header.message_type(),
        MessageType::Control(ControlMessageType::SoftReset)
    ) && header.num_data_objects() == 0
}

async fn reset(port: &SharedPort, channels: &Channels) -> TxState {
    port.with(|p| p.prl.tx_message_id_counter = 0);
    channels.prl_rx_events.signal(prl_rx::RESET);
    TxState::ConstructMessage
}

async fn construct_message<P: PhyDriver>(
    phy: &mut P,
    port: &SharedPort,
    channels: &Channels,
    message: &mut Option<MessageBuffer>,
) -> TxState {
    if let Some(bits) = channels.prl_tx_events.try_wait_any(RESET | DISCARD) {
        if bits & RESET != 0 {
            return TxState::PhyReset;
        }
        return TxState::DiscardMessage;
    }

    let Some(buffer) = message.as_mut() else {
        return TxState::WaitMessage;
    };

    let counter = port.with(|p| p.prl.tx_message_id_counter);
    let header = Header(buffer.raw_header()).with_message_id(counter);
    buffer.set_raw_header(u16::from(header));

    if phy.send_message(buffer).await.is_err() {
        return TxState::TransmissionError;
    }

    TxState::WaitResponse
}

async fn wait_response(channels: &Channels) -> TxState {
    let bits = channels
        .prl_tx_events
        .wait_any(RESET | DISCARD | TX_SENT | RETRY_FAIL)
        .await;

    if bits & RESET != 0 {
        return TxState::PhyReset;
    }
    if bits & DISCARD != 0 {
        return TxState::DiscardMessage;
    }
    if bits & TX_SENT != 0 {
        return TxState::MatchMessageId;
    }
    TxState::TransmissionError
}

async fn match_message_id<P: PhyDriver>(
    phy: &mut P,
    port: &SharedPort,
    message: &Option<MessageBuffer>,
) -> TxState {
    let mut good_crc = MessageBuffer::EMPTY;
    let Ok(len) = phy.read_message(&mut good_crc).await else {
        return TxState::TransmissionError;
    };
    good_crc.set_len(len);

    let header = Header(good_crc.raw_header());
    let counter = port.with(|p| p.prl.tx_message_id_counter);

    let is_good_crc = matches!(
        header.message_type(),
        MessageType::Control(ControlMessageType::GoodCrc)
    ) && header.num_data_objects() == 0
        && header.message_id() == counter;

    debug_assert!(message.is_some(), "MatchMessageID reached with no in-flight message");

    if is_good_crc {
        TxState::MessageSent
    } else {
        TxState::TransmissionError
    }
}

fn transmission_error(port: &SharedPort, channels: &Channels, message: &mut Option<MessageBuffer>) -> TxState {
    #[cfg(feature = "defmt")]
    defmt::debug!("transmission failed, no matching GoodCRC");
    port.with(|p| p.prl.advance_tx_counter());
    channels.pe_events.signal(pe::TX_ERR);
    *message = None;
    TxState::WaitMessage
}

fn message_sent(port: &SharedPort, channels: &Channels, message: &mut Option<MessageBuffer>) -> TxState {
    port.with(|p| p.prl.advance_tx_counter());
    channels.pe_events.signal(pe::TX_DONE);
    *message = None;
    TxState::WaitMessage
}

fn discard_message(port: &SharedPort, message: &mut Option<MessageBuffer>) -> TxState {
    if message.take().is_some() {
        port.with(|p| p.prl.advance_tx_counter());
    }
    TxState::PhyReset
}
