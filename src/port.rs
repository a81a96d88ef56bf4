//! `Port`: the sole owner of one port's mutable protocol state.
//!
//! The original firmware keeps thread handles and per-port fields scattered
//! across `pdb_config` and its `policy_engine`/`protocol_layer` sub-structs,
//! each touched directly by whichever global thread function runs next (per
//! the design notes' REDESIGN FLAGS). Here every field those threads
//! touched lives in [`Port`] instead, and every task function in
//! [`crate::tasks`] takes `&mut Port` (or the relevant sub-state) rather
//! than reaching into module statics.

use crate::constants::NO_PPS_INDEX;
use crate::message::{ControlMessageType, DataRole, Header, MessageBuffer, PowerRole, SpecRevision};

/// Per-port state written only by the Policy Engine task.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeState {
    /// Whether a contract has been confirmed by PS_RDY.
    pub explicit_contract: bool,
    /// True while operating at a reduced (GotoMin/Wait) current.
    pub min_power: bool,
    /// Consecutive hard resets issued so far this session;
    /// `> `[`crate::constants::N_HARD_RESET_COUNT`]` ` routes to
    /// `SourceUnresponsive`.
    pub hard_reset_count: u8,
    /// This port's fixed power role (this stack always sinks).
    pub power_role: PowerRole,
    /// This port's fixed data role.
    pub data_role: DataRole,
    /// The negotiated specification revision, `None` until the first
    /// Source_Capabilities arrives. Rev 1.0 is never produced (Open
    /// Question resolution, design notes §11.4): once set, this becomes
    /// rev 3.0 if the partner advertised ≥ 3.0, else rev 2.0, and stays
    /// fixed until the next hard reset.
    pub spec_revision: Option<SpecRevision>,
    /// 1-based index of the first PPS APDO in the last Source_Capabilities,
    /// or [`NO_PPS_INDEX`] if none was present.
    pub pps_index: u8,
    /// 1-based object position of the last PPS request sent, or
    /// [`NO_PPS_INDEX`] if the last request was not against a PPS APDO.
    pub last_pps: u8,
    /// Whether `SelectCap` last armed the PPS keepalive: rev 3.0 and the
    /// transmitted request's object position at or past `pps_index`. Drives
    /// `Ready`'s choice of [`crate::constants::T_PPS_REQUEST_MS`] as its
    /// wait timeout, independent of `last_pps` (which only tracks the
    /// previous request for the `transition_standby` skip decision).
    pub pps_keepalive_armed: bool,
    /// Most recent Type-C Current evaluation result while in
    /// `SourceUnresponsive`, or `None` if no sample has been taken yet this
    /// session. Two consecutive `Some` samples that agree trigger
    /// `transition_typec`; `None` never agrees with anything, so the first
    /// sample after entering `SourceUnresponsive` can never trigger it alone.
    pub last_typec_match: Option<bool>,
}

impl PeState {
    /// Initial state on entry to `Startup`: no contract, full power,
    /// hard-reset counter at zero, and spec revision unset until the first
    /// Source_Capabilities arrives.
    #[must_use]
    pub const fn new(power_role: PowerRole, data_role: DataRole) -> Self {
        Self {
            explicit_contract: false,
            min_power: false,
            hard_reset_count: 0,
            power_role,
            data_role,
            spec_revision: None,
            pps_index: NO_PPS_INDEX,
            last_pps: NO_PPS_INDEX,
            pps_keepalive_armed: false,
            last_typec_match: None,
        }
    }

    /// Build a header using the negotiated spec revision (or rev 2.0 if
    /// none has been negotiated yet — this stack never transmits before
    /// `EvalCap`, by which point [`Self::spec_revision`] is always set, but
    /// the fallback keeps this total for test code that builds headers
    /// earlier).
    #[must_use]
    pub fn header_template(&self) -> Header {
        Header::control(
            ControlMessageType::Reserved,
            self.spec_revision.unwrap_or(SpecRevision::V2_0),
            self.power_role,
            self.data_role,
            0,
        )
    }

    /// Record the session's negotiated spec revision from a partner's
    /// advertised revision, the first time Source_Capabilities arrives.
    /// A no-op once already set (fixed until the next hard reset).
    pub fn negotiate_spec_revision(&mut self, partner_revision: SpecRevision) {
        if self.spec_revision.is_none() {
            self.spec_revision = Some(if matches!(partner_revision, SpecRevision::V3_0) {
                SpecRevision::V3_0
            } else {
                SpecRevision::V2_0
            });
        }
    }

    /// Reset to the `Startup` entry values, keeping the negotiated roles
    /// but clearing everything that is per-session (called entering
    /// `TransitionDefault`).
    pub fn reset_session(&mut self) {
        self.explicit_contract = false;
        self.min_power = false;
        self.spec_revision = None;
        self.pps_index = NO_PPS_INDEX;
        self.last_pps = NO_PPS_INDEX;
        self.pps_keepalive_armed = false;
    }
}

/// Per-port state written only by the Protocol RX/TX tasks.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrlState {
    /// Last received message ID, or `None` immediately after a reset.
    pub rx_message_id: Option<u8>,
    /// Next outgoing message ID, 0..=7, wrapping.
    pub tx_message_id_counter: u8,
}

impl PrlState {
    /// Zero both counters (`ResetLayer`/Soft_Reset handling).
    pub fn reset(&mut self) {
        self.rx_message_id = None;
        self.tx_message_id_counter = 0;
    }

    /// Advance the TX counter modulo 8, as done after every transmission
    /// attempt (success, failure, or discard) per §4.4.
    pub fn advance_tx_counter(&mut self) {
        self.tx_message_id_counter = (self.tx_message_id_counter + 1) & 0x7;
    }
}

/// All mutable state for one USB-PD sink port.
///
/// Task functions in [`crate::tasks`] are given `&mut Port` (or narrower
/// `&mut PeState`/`&mut PrlState` borrows); there are no module-level
/// statics anywhere in this crate, so multiple ports can run side by side
/// simply by holding multiple `Port` values.
#[derive(Debug, Clone, Copy)]
pub struct Port {
    /// Policy Engine state.
    pub pe: PeState,
    /// Protocol layer state.
    pub prl: PrlState,
    /// The last transmitted Request, retained for retransmission and for
    /// `last_pps` bookkeeping across `EvalCap`.
    pub last_request: Option<MessageBuffer>,
}

impl Port {
    /// A fresh port in its `Startup` entry state (const, suitable for static
    /// initialization — see [`crate::sync::SharedPort::new`]).
    #[must_use]
    pub const fn new(power_role: PowerRole, data_role: DataRole) -> Self {
        Self {
            pe: PeState::new(power_role, data_role),
            prl: PrlState {
                rx_message_id: None,
                tx_message_id_counter: 0,
            },
            last_request: None,
        }
    }

    /// Reset both the PE session state and the PRL message-ID counters, as
    /// done by the Hard-Reset coordinator's `ResetLayer` state and by
    /// receipt of a Soft_Reset.
    pub fn reset_for_hard_or_soft_reset(&mut self) {
        self.pe.reset_session();
        self.prl.reset();
        self.last_request = None;
    }
}
