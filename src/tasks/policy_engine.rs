//! Policy Engine: the sink's top-level negotiation state machine.
//!
//! A translation of `lib/src/policy_engine.c`'s seventeen states. Like
//! [`super::protocol_tx`] and [`super::hard_reset`], most of these states
//! form real cycles (`Ready` alone has five different ways back into itself
//! or onward), so this is written as an explicit state enum driven by one
//! `loop` in [`run`] rather than a chain of recursive `async fn` calls.
//!
//! Two details the distilled spec only summarizes, visible in the C source:
//!
//! - `EvalCap` computes `last_pps` from the *previous* cached request's
//!   object position before the [`DevicePolicyManager`] overwrites it with a
//!   new one (design notes §11.2) — the read happens first, unconditionally,
//!   in the "re-evaluate without a fresh message" branch.
//! - `SendNotSupported`'s own transmission failure routes to `SendSoftReset`,
//!   not `HardReset` like every other transmit failure in this module —
//!   refusing a message is itself considered recoverable at the soft-reset
//!   level.
//! - `SelectCap`'s Accept branch, not `TransitionSink`, is where
//!   `DPM.transition_standby` is called and `min_power` is cleared: the
//!   standby call is gated on the *new* request's object position differing
//!   from `last_pps`, but the `min_power` clear itself is unconditional.
//!   `TransitionSink` only reads `min_power` on `PS_RDY` to decide whether to
//!   call `DPM.transition_requested` — it never writes it.
//!
//! The PPS keepalive (`chVTSet`-driven in the original firmware, an
//! independent virtual timer signalling `PDB_EVT_PE_PPS_REQUEST` into the PE
//! thread's event group) has no standalone timer task here: there is no
//! background task that can signal the event while `Ready` is not itself
//! waiting. Instead `Ready`'s own [`crate::sync::select::wait_any_timeout`]
//! is given [`T_PPS_REQUEST_MS`] as its timeout whenever `SelectCap` last
//! armed the keepalive — rev 3.0 and the transmitted request's object
//! position at or past `pps_index` — and a timeout in that state is handled
//! identically to the firmware's externally-signalled keepalive: re-run
//! capability selection against the cached request.
//! [`super::events::pe::PPS_REQUEST`] stays defined for parity with the
//! original event table, but nothing in this crate signals it directly.

use embedded_hal_async::delay::DelayNs;

use crate::constants::{
    N_HARD_RESET_COUNT, NO_PPS_INDEX, T_CHUNKING_NOT_SUPPORTED_MS, T_PD_DEBOUNCE_MS,
    T_PPS_REQUEST_MS, T_PS_TRANSITION_MS, T_SENDER_RESPONSE_MS, T_SINK_REQUEST_MS,
    T_TYPEC_SINK_WAIT_CAP_MS,
};
use crate::dpm::DevicePolicyManager;
use crate::message::{
    ControlMessageType, DataMessageType, Header, MessageBuffer, MessageType, PowerDataObject,
    RequestDataObject, SpecRevision,
};
use crate::phy::PhyDriver;
use crate::sync::{select::wait_any_timeout, SharedPort};

use super::channels::Channels;
use super::events::hard_reset as hard_reset_events;
use super::events::pe::{GET_SOURCE_CAP, HARD_SENT, MSG_RX, NEW_POWER, OVER_TEMP, RESET, TX_DONE, TX_ERR};
use super::events::prl_tx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Startup,
    Discovery,
    WaitCap,
    EvalCap,
    SelectCap,
    TransitionSink,
    Ready,
    GetSourceCap,
    GiveSinkCap,
    HardReset,
    TransitionDefault,
    SoftReset,
    SendSoftReset,
    SendNotSupported,
    ChunkReceived,
    NotSupportedReceived,
    SourceUnresponsive,
}

/// Outcome of handing a message to [`super::protocol_tx`] and waiting for it
/// to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxOutcome {
    Sent,
    Failed,
    Reset,
}

/// Run the Policy Engine forever.
pub async fn run<P: PhyDriver, M: DevicePolicyManager, D: DelayNs>(
    phy: &mut P,
    dpm: &mut M,
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
) -> ! {
    let mut state = State::Startup;
    let mut pending_caps: Option<MessageBuffer> = None;
    loop {
        state = match state {
            State::Startup => startup(dpm),
            State::Discovery => discovery(),
            State::WaitCap => wait_cap(timer, port, channels, &mut pending_caps).await,
            State::EvalCap => eval_cap(dpm, port, &mut pending_caps),
            State::SelectCap => select_cap(dpm, timer, port, channels).await,
            State::TransitionSink => transition_sink(dpm, timer, port, channels).await,
            State::Ready => ready(dpm, timer, port, channels, &mut pending_caps).await,
            State::GetSourceCap => get_source_cap(port, channels).await,
            State::GiveSinkCap => give_sink_cap(dpm, port, channels).await,
            State::HardReset => hard_reset(port, channels).await,
            State::TransitionDefault => transition_default(dpm, port, channels),
            State::SoftReset => soft_reset(port, channels).await,
            State::SendSoftReset => send_soft_reset(timer, port, channels).await,
            State::SendNotSupported => send_not_supported(port, channels).await,
            State::ChunkReceived => chunk_received(timer).await,
            State::NotSupportedReceived => not_supported_received(dpm),
            State::SourceUnresponsive => source_unresponsive(phy, dpm, timer, port).await,
        };
    }
}

async fn transmit(channels: &Channels, message: MessageBuffer) -> TxOutcome {
    channels.prl_tx_inbox.post(message).await;
    channels.prl_tx_events.signal(prl_tx::MSG_TX);
    let bits = channels.pe_events.wait_any(TX_DONE | TX_ERR | RESET).await;
    if bits & RESET != 0 {
        TxOutcome::Reset
    } else if bits & TX_DONE != 0 {
        TxOutcome::Sent
    } else {
        TxOutcome::Failed
    }
}

fn control_message(port: &SharedPort, ty: ControlMessageType) -> MessageBuffer {
    let (spec_revision, power_role, data_role) = port.with(|p| {
        (
            p.pe.spec_revision.unwrap_or(SpecRevision::V2_0),
            p.pe.power_role,
            p.pe.data_role,
        )
    });
    let header = Header::control(ty, spec_revision, power_role, data_role, 0);
    MessageBuffer::from_header_and_objects(u16::from(header), &[])
}

fn is_control(header: Header, ty: ControlMessageType) -> bool {
    header.message_type() == MessageType::Control(ty) && header.num_data_objects() == 0
}

/// 1-based object position a Request targets, read directly from its data
/// object regardless of whether it is a Fixed/Variable or Programmable RDO
/// (both share the same bit range for this field).
fn request_object_position(buffer: &MessageBuffer) -> u8 {
    buffer.data_object(0).map_or(0, |raw| ((raw >> 28) & 0xF) as u8)
}

fn build_request_buffer(port: &SharedPort, rdo: RequestDataObject) -> MessageBuffer {
    let (spec_revision, power_role, data_role) = port.with(|p| {
        (
            p.pe.spec_revision.unwrap_or(SpecRevision::V2_0),
            p.pe.power_role,
            p.pe.data_role,
        )
    });
    let header = Header::data(DataMessageType::Request, spec_revision, power_role, data_role, 0, 1);
    MessageBuffer::from_header_and_objects(u16::from(header), &[rdo.encode()])
}

fn store_request(port: &SharedPort, request: Option<RequestDataObject>) {
    let buffer = request.map(|rdo| build_request_buffer(port, rdo));
    port.with(|p| p.last_request = buffer);
}

fn startup<M: DevicePolicyManager>(dpm: &mut M) -> State {
    dpm.pd_start();
    State::Discovery
}

/// A trivial pass-through, kept as its own state because the original
/// seventeen-state table names it, even though this stack (sink-only, no
/// VBUS/VCONN bring-up of its own) has nothing to do here before waiting for
/// Source_Capabilities.
fn discovery() -> State {
    State::WaitCap
}

async fn wait_cap<D: DelayNs>(
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
    pending_caps: &mut Option<MessageBuffer>,
) -> State {
    let Some(bits) = wait_any_timeout(&channels.pe_events, timer, MSG_RX | RESET, T_TYPEC_SINK_WAIT_CAP_MS).await
    else {
        return State::HardReset;
    };
    if bits & RESET != 0 {
        return State::Startup;
    }

    let Some(message) = channels.pe_inbox.try_fetch() else {
        return State::WaitCap;
    };
    let header = Header(message.raw_header());
    if header.message_type() != MessageType::Data(DataMessageType::SourceCapabilities) {
        // Anything else this early is not actionable; keep waiting for caps,
        // same as the C source's wait_cap discarding non-matching messages.
        return State::WaitCap;
    }

    port.with(|p| p.pe.negotiate_spec_revision(header.spec_revision()));
    *pending_caps = Some(message);
    State::EvalCap
}

fn eval_cap<M: DevicePolicyManager>(dpm: &mut M, port: &SharedPort, pending_caps: &mut Option<MessageBuffer>) -> State {
    if let Some(caps) = pending_caps.take() {
        let header = Header(caps.raw_header());
        let mut pps_index = NO_PPS_INDEX;
        for i in 0..header.num_data_objects() {
            if let Some(obj) = caps.data_object(usize::from(i)) {
                if matches!(PowerDataObject::decode(obj), PowerDataObject::Pps(_)) {
                    pps_index = i + 1;
                    break;
                }
            }
        }
        port.with(|p| {
            p.pe.pps_index = pps_index;
            p.pe.last_pps = NO_PPS_INDEX;
        });

        let header_template = port.with(|p| p.pe.header_template());
        let request = dpm.evaluate_capability(Some(&caps), header_template);
        store_request(port, request);
    } else {
        // Re-evaluating the same capabilities (NEW_POWER): read the *old*
        // request's object position against the *current* pps_index before
        // it gets overwritten below.
        port.with(|p| {
            let previous_position = p.last_request.map_or(0, |r| request_object_position(&r));
            p.pe.last_pps = if previous_position >= p.pe.pps_index {
                previous_position
            } else {
                NO_PPS_INDEX
            };
        });

        let header_template = port.with(|p| p.pe.header_template());
        let request = dpm.evaluate_capability(None, header_template);
        store_request(port, request);
    }

    State::SelectCap
}

async fn select_cap<M: DevicePolicyManager, D: DelayNs>(
    dpm: &mut M,
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
) -> State {
    let Some(request) = port.with(|p| p.last_request) else {
        // The DPM declined every capability; nothing to negotiate until a
        // fresh Source_Capabilities arrives.
        return State::WaitCap;
    };

    match transmit(channels, request).await {
        TxOutcome::Reset => return State::Startup,
        TxOutcome::Failed => return State::HardReset,
        TxOutcome::Sent => {}
    }

    // Arm or cancel the PPS keepalive against the request we just sent,
    // independent of whatever response (if any) comes back: rev 3.0 and an
    // object position at or past the current pps_index.
    let position = request_object_position(&request);
    let armed = port.with(|p| p.pe.spec_revision == Some(SpecRevision::V3_0) && position >= p.pe.pps_index);
    port.with(|p| p.pe.pps_keepalive_armed = armed);

    let Some(bits) = wait_any_timeout(&channels.pe_events, timer, MSG_RX | RESET, T_SENDER_RESPONSE_MS).await else {
        return State::HardReset;
    };
    if bits & RESET != 0 {
        return State::Startup;
    }

    let Some(response) = channels.pe_inbox.try_fetch() else {
        return State::HardReset;
    };
    let header = Header(response.raw_header());

    if is_control(header, ControlMessageType::Accept) {
        let last_pps = port.with(|p| p.pe.last_pps);
        if position != last_pps {
            dpm.transition_standby();
        }
        port.with(|p| p.pe.min_power = false);
        return State::TransitionSink;
    }
    if is_control(header, ControlMessageType::SoftReset) {
        return State::SoftReset;
    }
    if is_control(header, ControlMessageType::Reject) || is_control(header, ControlMessageType::Wait) {
        let explicit_contract = port.with(|p| p.pe.explicit_contract);
        if !explicit_contract {
            return State::WaitCap;
        }
        let is_wait = is_control(header, ControlMessageType::Wait);
        port.with(|p| p.pe.min_power = is_wait);
        return State::Ready;
    }

    State::SendSoftReset
}

async fn transition_sink<M: DevicePolicyManager, D: DelayNs>(
    dpm: &mut M,
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
) -> State {
    let Some(bits) = wait_any_timeout(&channels.pe_events, timer, MSG_RX | RESET, T_PS_TRANSITION_MS).await else {
        return State::HardReset;
    };
    if bits & RESET != 0 {
        return State::Startup;
    }

    let Some(message) = channels.pe_inbox.try_fetch() else {
        return State::HardReset;
    };
    let header = Header(message.raw_header());

    if is_control(header, ControlMessageType::PsRdy) {
        let min_power = port.with(|p| p.pe.min_power);
        if !min_power {
            dpm.transition_requested();
        }
        port.with(|p| p.pe.explicit_contract = true);
        #[cfg(feature = "defmt")]
        defmt::info!("explicit contract established");
        return State::Ready;
    }
    if is_control(header, ControlMessageType::SoftReset) {
        return State::SoftReset;
    }

    State::SendSoftReset
}

async fn ready<M: DevicePolicyManager, D: DelayNs>(
    dpm: &mut M,
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
    pending_caps: &mut Option<MessageBuffer>,
) -> State {
    let mask = MSG_RX | RESET | GET_SOURCE_CAP | NEW_POWER | OVER_TEMP;
    let (min_power, pps_active) = port.with(|p| (p.pe.min_power, p.pe.pps_keepalive_armed));

    let bits = if min_power {
        wait_any_timeout(&channels.pe_events, timer, mask, T_SINK_REQUEST_MS).await
    } else if pps_active {
        wait_any_timeout(&channels.pe_events, timer, mask, T_PPS_REQUEST_MS).await
    } else {
        Some(channels.pe_events.wait_any(mask).await)
    };

    let Some(bits) = bits else {
        // Min-power retry and the PPS keepalive both resolve the same way:
        // re-run capability selection against the cached request.
        return State::SelectCap;
    };

    if bits & RESET != 0 {
        return State::Startup;
    }
    if bits & OVER_TEMP != 0 {
        return State::HardReset;
    }
    if bits & GET_SOURCE_CAP != 0 {
        return State::GetSourceCap;
    }
    if bits & NEW_POWER != 0 {
        *pending_caps = None;
        return State::EvalCap;
    }

    let Some(message) = channels.pe_inbox.try_fetch() else {
        return State::Ready;
    };
    let header = Header(message.raw_header());

    if is_control(header, ControlMessageType::GetSinkCap) {
        return State::GiveSinkCap;
    }
    if is_control(header, ControlMessageType::GotoMin) {
        return if dpm.giveback_enabled() {
            dpm.transition_min();
            port.with(|p| p.pe.min_power = true);
            State::Ready
        } else {
            State::SendNotSupported
        };
    }
    if is_control(header, ControlMessageType::Ping) {
        return State::Ready;
    }
    if is_control(header, ControlMessageType::SoftReset) {
        return State::SoftReset;
    }
    if is_control(header, ControlMessageType::NotSupported) {
        return State::NotSupportedReceived;
    }
    if header.message_type() == MessageType::Data(DataMessageType::SourceCapabilities) {
        *pending_caps = Some(message);
        return State::EvalCap;
    }
    if header.extended() {
        return State::ChunkReceived;
    }

    State::SendSoftReset
}

async fn get_source_cap(port: &SharedPort, channels: &Channels) -> State {
    let message = control_message(port, ControlMessageType::GetSourceCap);
    match transmit(channels, message).await {
        TxOutcome::Sent => State::WaitCap,
        TxOutcome::Failed => State::HardReset,
        TxOutcome::Reset => State::Startup,
    }
}

async fn give_sink_cap<M: DevicePolicyManager>(dpm: &mut M, port: &SharedPort, channels: &Channels) -> State {
    let header_template = port.with(|p| p.pe.header_template());
    let message = dpm.get_sink_capability(header_template);
    match transmit(channels, message).await {
        TxOutcome::Sent => State::Ready,
        TxOutcome::Failed => State::HardReset,
        TxOutcome::Reset => State::Startup,
    }
}

async fn hard_reset(port: &SharedPort, channels: &Channels) -> State {
    let count = port.with(|p| {
        p.pe.hard_reset_count += 1;
        p.pe.hard_reset_count
    });
    if count > N_HARD_RESET_COUNT {
        #[cfg(feature = "defmt")]
        defmt::warn!("hard reset count {} exceeds limit, source unresponsive", count);
        return State::SourceUnresponsive;
    }
    #[cfg(feature = "defmt")]
    defmt::debug!("issuing hard reset {}", count);

    channels.hard_reset_events.signal(hard_reset_events::RESET);
    channels.pe_events.wait_any(HARD_SENT).await;
    State::TransitionDefault
}

fn transition_default<M: DevicePolicyManager>(dpm: &mut M, port: &SharedPort, channels: &Channels) -> State {
    dpm.transition_default();
    port.with(|p| p.pe.reset_session());
    channels.hard_reset_events.signal(hard_reset_events::DONE);
    State::Startup
}

async fn soft_reset(port: &SharedPort, channels: &Channels) -> State {
    port.with(|p| p.reset_for_hard_or_soft_reset());
    let message = control_message(port, ControlMessageType::Accept);
    match transmit(channels, message).await {
        TxOutcome::Sent => State::WaitCap,
        TxOutcome::Failed => State::HardReset,
        TxOutcome::Reset => State::Startup,
    }
}

async fn send_soft_reset<D: DelayNs>(timer: &mut D, port: &SharedPort, channels: &Channels) -> State {
    port.with(|p| p.reset_for_hard_or_soft_reset());
    let message = control_message(port, ControlMessageType::SoftReset);

    match transmit(channels, message).await {
        TxOutcome::Reset => return State::Startup,
        TxOutcome::Failed => return State::HardReset,
        TxOutcome::Sent => {}
    }

    let Some(bits) = wait_any_timeout(&channels.pe_events, timer, MSG_RX | RESET, T_SENDER_RESPONSE_MS).await else {
        return State::HardReset;
    };
    if bits & RESET != 0 {
        return State::Startup;
    }
    let Some(response) = channels.pe_inbox.try_fetch() else {
        return State::HardReset;
    };

    if is_control(Header(response.raw_header()), ControlMessageType::Accept) {
        State::WaitCap
    } else {
        State::HardReset
    }
}

async fn send_not_supported(port: &SharedPort, channels: &Channels) -> State {
    let spec_revision = port.with(|p| p.pe.spec_revision.unwrap_or(SpecRevision::V2_0));
    let ty = if matches!(spec_revision, SpecRevision::V3_0) {
        ControlMessageType::NotSupported
    } else {
        // Rev 2.0 has no Not_Supported control message; Reject is its
        // closest equivalent.
        ControlMessageType::Reject
    };
    let message = control_message(port, ty);

    match transmit(channels, message).await {
        TxOutcome::Sent => State::Ready,
        // Unlike every other transmit failure in this module, refusing a
        // message that falls back to SendSoftReset rather than straight to
        // a hard reset.
        TxOutcome::Failed => State::SendSoftReset,
        TxOutcome::Reset => State::Startup,
    }
}

async fn chunk_received<D: DelayNs>(timer: &mut D) -> State {
    timer.delay_ms(T_CHUNKING_NOT_SUPPORTED_MS).await;
    State::SendNotSupported
}

fn not_supported_received<M: DevicePolicyManager>(dpm: &mut M) -> State {
    dpm.not_supported_received();
    State::Ready
}

/// Poll Type-C Current forever, watching for two consecutive samples the DPM
/// accepts. This is this stack's terminal fallback: the firmware this is
/// grounded on never routes back out of it into renegotiation, only notifies
/// the DPM via `transition_typec` (e.g. to fall back to a fixed USB default
/// rail) — matching [`crate::port::PeState::last_typec_match`]'s tri-state
/// sentinel, which intentionally never resets once entered here.
async fn source_unresponsive<P: PhyDriver, M: DevicePolicyManager, D: DelayNs>(
    phy: &mut P,
    dpm: &mut M,
    timer: &mut D,
    port: &SharedPort,
) -> State {
    timer.delay_ms(T_PD_DEBOUNCE_MS).await;

    let Ok(current) = phy.get_typec_current().await else {
        port.with(|p| p.pe.last_typec_match = None);
        return State::SourceUnresponsive;
    };

    let accepted = dpm.evaluate_typec_current(current);
    let agreed_twice = port.with(|p| {
        let agreed = accepted && p.pe.last_typec_match == Some(accepted);
        p.pe.last_typec_match = Some(accepted);
        agreed
    });

    if agreed_twice {
        dpm.transition_typec();
    }
    State::SourceUnresponsive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DataRole, FixedVariableRdo, PowerRole};
    use crate::phy::{DriverTxError, TypeCCurrent};
    use crate::test_utils::block_on;
    use crate::test_utils::dpm::ScriptedDpm;
    use crate::test_utils::phy::ScriptedPhy;
    use crate::test_utils::timer::MockTimer;

    fn new_port() -> SharedPort {
        SharedPort::new(PowerRole::Sink, DataRole::Ufp)
    }

    fn source_caps(pps_position: Option<u8>) -> MessageBuffer {
        let header = Header::data(
            DataMessageType::SourceCapabilities,
            SpecRevision::V3_0,
            PowerRole::Source,
            DataRole::Dfp,
            0,
            if pps_position.is_some() { 2 } else { 1 },
        );
        let mut objects = std::vec![u32::from(crate::message::FixedSupplyPdo::from_mv_ma(5000, 3000))];
        if let Some(position) = pps_position {
            assert_eq!(position, 2, "test helper only places PPS at index 2");
            objects.push(u32::from(crate::message::PpsApdo::from_mv_ma(3300, 11000, 3000)) | (0b11 << 30));
        }
        MessageBuffer::from_header_and_objects(u16::from(header), &objects)
    }

    fn control_from_source(ty: ControlMessageType) -> MessageBuffer {
        let header = Header::control(ty, SpecRevision::V2_0, PowerRole::Source, DataRole::Dfp, 0);
        MessageBuffer::from_header_and_objects(u16::from(header), &[])
    }

    #[test]
    fn startup_calls_pd_start_and_moves_to_discovery() {
        let mut dpm = ScriptedDpm::new();
        assert_eq!(startup(&mut dpm), State::Discovery);
        assert!(dpm.calls().is_empty());
    }

    #[test]
    fn wait_cap_times_out_to_hard_reset() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut pending = None;

        let next = block_on(wait_cap(&mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::HardReset);
        assert_eq!(timer.requested_ms(), std::vec![u64::from(T_TYPEC_SINK_WAIT_CAP_MS)]);
    }

    #[test]
    fn wait_cap_discards_unrelated_messages_and_keeps_waiting() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut pending = None;
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Ping)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(wait_cap(&mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::WaitCap);
        assert!(pending.is_none());
    }

    #[test]
    fn wait_cap_accepts_source_capabilities_and_negotiates_revision() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut pending = None;
        channels.pe_inbox.try_post(source_caps(None)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(wait_cap(&mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::EvalCap);
        assert!(pending.is_some());
        assert_eq!(port.with(|p| p.pe.spec_revision), Some(SpecRevision::V3_0));
    }

    #[test]
    fn eval_cap_detects_pps_index_and_stores_request() {
        let port = new_port();
        let mut dpm = ScriptedDpm::new();
        let rdo = RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 3000, 3000, true, false));
        dpm.set_request(Some(rdo));
        let mut pending = Some(source_caps(Some(2)));

        let next = eval_cap(&mut dpm, &port, &mut pending);

        assert_eq!(next, State::SelectCap);
        assert_eq!(port.with(|p| p.pe.pps_index), 2);
        assert!(port.with(|p| p.last_request).is_some());
        assert!(pending.is_none());
    }

    #[test]
    fn eval_cap_reads_previous_object_position_before_overwriting() {
        let port = new_port();
        port.with(|p| {
            p.pe.pps_index = 2;
            p.last_request = Some(build_request_buffer(
                &SharedPort::new(PowerRole::Sink, DataRole::Ufp),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(3, 1000, 1000, true, false)),
            ));
        });
        let mut dpm = ScriptedDpm::new();
        dpm.set_request(Some(RequestDataObject::FixedVariable(FixedVariableRdo::new(
            1, 1000, 1000, true, false,
        ))));
        let mut pending = None;

        eval_cap(&mut dpm, &port, &mut pending);

        // previous object position (3) >= pps_index (2), so last_pps takes it.
        assert_eq!(port.with(|p| p.pe.last_pps), 3);
    }

    #[test]
    fn select_cap_with_no_stored_request_returns_to_wait_cap() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::WaitCap);
    }

    #[test]
    fn select_cap_accept_goes_to_transition_sink() {
        let port = new_port();
        port.with(|p| {
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();

        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Accept)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::TransitionSink);
        assert!(channels.prl_tx_inbox.try_fetch().is_some());
    }

    #[test]
    fn select_cap_accept_calls_transition_standby_when_position_differs_from_last_pps() {
        let port = new_port();
        port.with(|p| {
            p.pe.last_pps = 3;
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Accept)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::TransitionSink);
        assert_eq!(
            dpm.calls(),
            std::vec![crate::test_utils::dpm::DpmCall::TransitionStandby]
        );
        assert!(!port.with(|p| p.pe.min_power));
    }

    #[test]
    fn select_cap_accept_skips_transition_standby_when_position_matches_last_pps() {
        let port = new_port();
        port.with(|p| {
            p.pe.last_pps = 1;
            p.pe.min_power = true;
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Accept)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::TransitionSink);
        assert!(dpm.calls().is_empty());
        // min_power is cleared unconditionally on Accept, even when the
        // standby call itself was skipped.
        assert!(!port.with(|p| p.pe.min_power));
    }

    #[test]
    fn select_cap_arms_pps_keepalive_for_rev_3_request_at_or_past_pps_index() {
        let port = new_port();
        port.with(|p| {
            p.pe.spec_revision = Some(SpecRevision::V3_0);
            p.pe.pps_index = 2;
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(2, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Reject)).unwrap();
        channels.pe_events.signal(MSG_RX);

        block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert!(port.with(|p| p.pe.pps_keepalive_armed));
    }

    #[test]
    fn select_cap_does_not_arm_pps_keepalive_below_pps_index() {
        let port = new_port();
        port.with(|p| {
            p.pe.spec_revision = Some(SpecRevision::V3_0);
            p.pe.pps_index = 2;
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Reject)).unwrap();
        channels.pe_events.signal(MSG_RX);

        block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert!(!port.with(|p| p.pe.pps_keepalive_armed));
    }

    fn p_for_header() -> SharedPort {
        SharedPort::new(PowerRole::Sink, DataRole::Ufp)
    }

    #[test]
    fn select_cap_reject_without_contract_returns_to_wait_cap() {
        let port = new_port();
        port.with(|p| {
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Reject)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::WaitCap);
    }

    #[test]
    fn select_cap_wait_with_existing_contract_enters_min_power_ready() {
        let port = new_port();
        port.with(|p| {
            p.pe.explicit_contract = true;
            p.last_request = Some(build_request_buffer(
                &p_for_header(),
                RequestDataObject::FixedVariable(FixedVariableRdo::new(1, 1000, 1000, true, false)),
            ));
        });
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_events.signal(TX_DONE);
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::Wait)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(select_cap(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::Ready);
        assert!(port.with(|p| p.pe.min_power));
    }

    #[test]
    fn transition_sink_ps_rdy_confirms_contract_and_calls_transition_requested() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::PsRdy)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(transition_sink(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::Ready);
        assert!(port.with(|p| p.pe.explicit_contract));
        assert_eq!(dpm.calls(), std::vec![crate::test_utils::dpm::DpmCall::TransitionRequested]);
    }

    #[test]
    fn transition_sink_times_out_to_hard_reset() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();

        let next = block_on(transition_sink(&mut dpm, &mut timer, &port, &channels));

        assert_eq!(next, State::HardReset);
    }

    #[test]
    fn ready_dispatches_get_source_cap_event() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        let mut pending = None;
        channels.pe_events.signal(GET_SOURCE_CAP);

        let next = block_on(ready(&mut dpm, &mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::GetSourceCap);
    }

    #[test]
    fn ready_gotomin_without_giveback_sends_not_supported() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        let mut pending = None;
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::GotoMin)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(ready(&mut dpm, &mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::SendNotSupported);
    }

    #[test]
    fn ready_gotomin_with_giveback_reduces_power() {
        let port = new_port();
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        dpm.set_giveback_enabled(true);
        let mut pending = None;
        channels.pe_inbox.try_post(control_from_source(ControlMessageType::GotoMin)).unwrap();
        channels.pe_events.signal(MSG_RX);

        let next = block_on(ready(&mut dpm, &mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::Ready);
        assert!(port.with(|p| p.pe.min_power));
    }

    #[test]
    fn ready_times_out_with_pps_active_and_reselects_capability() {
        let port = new_port();
        port.with(|p| p.pe.pps_keepalive_armed = true);
        let channels = Channels::new();
        let mut timer = MockTimer::new();
        let mut dpm = ScriptedDpm::new();
        let mut pending = None;

        let next = block_on(ready(&mut dpm, &mut timer, &port, &channels, &mut pending));

        assert_eq!(next, State::SelectCap);
        assert_eq!(timer.requested_ms(), std::vec![u64::from(T_PPS_REQUEST_MS)]);
    }

    #[test]
    fn hard_reset_escalates_to_source_unresponsive_past_the_limit() {
        let port = new_port();
        port.with(|p| p.pe.hard_reset_count = N_HARD_RESET_COUNT);
        let channels = Channels::new();

        let next = block_on(hard_reset(&port, &channels));

        assert_eq!(next, State::SourceUnresponsive);
    }

    #[test]
    fn hard_reset_signals_coordinator_and_waits_for_hard_sent() {
        let port = new_port();
        let channels = Channels::new();
        channels.pe_events.signal(HARD_SENT);

        let next = block_on(hard_reset(&port, &channels));

        assert_eq!(next, State::TransitionDefault);
        assert_eq!(
            channels.hard_reset_events.try_wait_any(hard_reset_events::RESET),
            Some(hard_reset_events::RESET)
        );
    }

    #[test]
    fn transition_default_resets_session_and_signals_done() {
        let port = new_port();
        port.with(|p| p.pe.explicit_contract = true);
        let channels = Channels::new();
        let mut dpm = ScriptedDpm::new();

        let next = transition_default(&mut dpm, &port, &channels);

        assert_eq!(next, State::Startup);
        assert!(!port.with(|p| p.pe.explicit_contract));
        assert_eq!(
            channels.hard_reset_events.try_wait_any(hard_reset_events::DONE),
            Some(hard_reset_events::DONE)
        );
        assert_eq!(dpm.calls(), std::vec![crate::test_utils::dpm::DpmCall::TransitionDefault]);
    }

    #[test]
    fn send_not_supported_uses_reject_below_rev_3() {
        let port = new_port();
        port.with(|p| p.pe.spec_revision = Some(SpecRevision::V2_0));
        let channels = Channels::new();
        channels.pe_events.signal(TX_DONE);

        let next = block_on(send_not_supported(&port, &channels));

        assert_eq!(next, State::Ready);
        let sent = channels.prl_tx_inbox.try_fetch().unwrap();
        assert!(is_control(Header(sent.raw_header()), ControlMessageType::Reject));
    }

    #[test]
    fn send_not_supported_failure_routes_to_send_soft_reset_not_hard_reset() {
        let port = new_port();
        let channels = Channels::new();
        channels.pe_events.signal(TX_ERR);

        let next = block_on(send_not_supported(&port, &channels));

        assert_eq!(next, State::SendSoftReset);
    }

    #[test]
    fn chunk_received_waits_then_sends_not_supported() {
        let mut timer = MockTimer::new();
        let next = block_on(chunk_received(&mut timer));
        assert_eq!(next, State::SendNotSupported);
        assert_eq!(timer.requested_ms(), std::vec![u64::from(T_CHUNKING_NOT_SUPPORTED_MS)]);
    }

    #[test]
    fn not_supported_received_notifies_dpm_and_returns_to_ready() {
        let mut dpm = ScriptedDpm::new();
        let next = not_supported_received(&mut dpm);
        assert_eq!(next, State::Ready);
        assert_eq!(
            dpm.calls(),
            std::vec![crate::test_utils::dpm::DpmCall::NotSupportedReceived]
        );
    }

    #[test]
    fn source_unresponsive_stays_put_on_a_single_sample() {
        let port = new_port();
        let mut phy = ScriptedPhy::new();
        phy.set_typec_current(TypeCCurrent::Current1500mA);
        let mut dpm = ScriptedDpm::new();
        dpm.set_typec_acceptable(true);
        let mut timer = MockTimer::new();

        let next = block_on(source_unresponsive(&mut phy, &mut dpm, &mut timer, &port));

        assert_eq!(next, State::SourceUnresponsive);
        assert!(dpm.calls().is_empty());
    }

    #[test]
    fn source_unresponsive_triggers_transition_typec_after_two_agreeing_samples() {
        let port = new_port();
        let mut phy = ScriptedPhy::new();
        phy.set_typec_current(TypeCCurrent::Current1500mA);
        let mut dpm = ScriptedDpm::new();
        dpm.set_typec_acceptable(true);
        let mut timer = MockTimer::new();

        block_on(source_unresponsive(&mut phy, &mut dpm, &mut timer, &port));
        let next = block_on(source_unresponsive(&mut phy, &mut dpm, &mut timer, &port));

        assert_eq!(next, State::SourceUnresponsive);
        assert_eq!(
            dpm.calls(),
            std::vec![crate::test_utils::dpm::DpmCall::TransitionTypec]
        );
    }

    #[test]
    fn give_sink_cap_sends_dpm_supplied_capability() {
        let port = new_port();
        let channels = Channels::new();
        let mut dpm = ScriptedDpm::new();
        dpm.set_sink_capability(MessageBuffer::from_header_and_objects(0x1234, &[]));
        channels.pe_events.signal(TX_DONE);

        let next = block_on(give_sink_cap(&mut dpm, &port, &channels));

        assert_eq!(next, State::Ready);
        assert_eq!(channels.prl_tx_inbox.try_fetch().unwrap().raw_header(), 0x1234);
    }

    #[test]
    fn soft_reset_resets_session_and_accepts() {
        let port = new_port();
        port.with(|p| p.prl.tx_message_id_counter = 5);
        let channels = Channels::new();
        channels.pe_events.signal(TX_DONE);

        let next = block_on(soft_reset(&port, &channels));

        assert_eq!(next, State::WaitCap);
        assert_eq!(port.with(|p| p.prl.tx_message_id_counter), 0);
        let sent = channels.prl_tx_inbox.try_fetch().unwrap();
        assert!(is_control(Header(sent.raw_header()), ControlMessageType::Accept));
    }

    #[test]
    fn get_source_cap_transmit_failure_goes_to_hard_reset() {
        let port = new_port();
        let channels = Channels::new();
        channels.pe_events.signal(TX_ERR);

        let next = block_on(get_source_cap(&port, &channels));

        assert_eq!(next, State::HardReset);
    }
}
