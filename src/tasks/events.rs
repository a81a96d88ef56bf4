//! Event bit assignments for each task's [`crate::sync::EventChannel`].
//!
//! One module per receiving task, mirroring `lib/include/pdb_event.h`'s
//! `PDB_EVT_*` flag groups (one group per ChibiOS thread). Values are kept as
//! plain `u32` bit masks rather than a typed enum so several can be combined
//! in a single `wait_any`/`signal_many` call exactly as the firmware combines
//! them in one `chEvtSignal`.

/// Events delivered to `tasks::protocol_rx`.
pub mod prl_rx {
    /// Hard-Reset coordinator or a Soft_Reset requests the RX state machine
    /// reset back to `WaitPhy` with message-ID tracking cleared.
    pub const RESET: u32 = 1 << 0;
    /// PHY confirmed a GoodCRC was sent for the message currently being
    /// processed (`INTERRUPTB.I_GCRCSENT`).
    pub const GOOD_CRC_SENT: u32 = 1 << 1;
}

/// Events delivered to `tasks::protocol_tx`.
pub mod prl_tx {
    /// Hard-Reset coordinator or a Soft_Reset requests the TX state machine
    /// reset back to `PhyReset`.
    pub const RESET: u32 = 1 << 0;
    /// Protocol RX asks the in-flight transmission (if any) be abandoned
    /// (a late Soft_Reset collided with an in-progress send).
    pub const DISCARD: u32 = 1 << 1;
    /// A message was posted to the TX mailbox; begin `ConstructMessage`.
    pub const MSG_TX: u32 = 1 << 2;
    /// PHY reports the message (and its GoodCRC) was sent successfully.
    pub const TX_SENT: u32 = 1 << 3;
    /// PHY's automatic retry counter expired without a GoodCRC.
    pub const RETRY_FAIL: u32 = 1 << 4;
    /// The Policy Engine is starting a new AMS; not waited on directly, but
    /// signalled so link-layer bookkeeping (if any) stays in step.
    pub const START_AMS: u32 = 1 << 5;
}

/// Events delivered to `tasks::hard_reset`.
pub mod hard_reset {
    /// The Policy Engine requests a hard reset be transmitted.
    pub const RESET: u32 = 1 << 0;
    /// The PHY line reports an incoming Hard Reset ordered signal.
    pub const HARD_RESET_RECEIVED: u32 = 1 << 1;
    /// The PHY confirms it finished transmitting a Hard Reset ordered
    /// signal.
    pub const HARD_RESET_SENT: u32 = 1 << 2;
    /// The Policy Engine has finished its own post-reset bring-up
    /// (`TransitionDefault` complete).
    pub const DONE: u32 = 1 << 3;
}

/// Events delivered to `tasks::policy_engine`.
pub mod pe {
    /// The Hard-Reset coordinator has reset protocol state; re-enter
    /// `Startup` regardless of the state the Policy Engine was in.
    pub const RESET: u32 = 1 << 0;
    /// A message has been posted to the Policy Engine's inbox mailbox.
    pub const MSG_RX: u32 = 1 << 1;
    /// The message the Policy Engine last asked Protocol TX to send was
    /// transmitted and acknowledged.
    pub const TX_DONE: u32 = 1 << 2;
    /// The message the Policy Engine last asked Protocol TX to send could
    /// not be delivered.
    pub const TX_ERR: u32 = 1 << 3;
    /// The Hard-Reset coordinator confirms a hard reset was transmitted.
    pub const HARD_SENT: u32 = 1 << 4;
    /// Combined over-current/over-temperature event from the PHY.
    pub const OVER_TEMP: u32 = 1 << 5;
    /// Device Policy Manager-triggered request to re-read Source
    /// Capabilities (`pdb_dpm_get_source_cap`).
    pub const GET_SOURCE_CAP: u32 = 1 << 6;
    /// Device Policy Manager-triggered request to re-evaluate capabilities
    /// against a new policy without waiting for a fresh Source_Capabilities
    /// (`pdb_dpm_new_power`).
    pub const NEW_POWER: u32 = 1 << 7;
    /// The PPS keepalive timer elapsed; retransmit the last Request.
    pub const PPS_REQUEST: u32 = 1 << 8;
}
