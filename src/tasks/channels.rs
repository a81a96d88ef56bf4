//! The event channels and mailboxes wiring one port's five tasks together.
//!
//! Grounded on the firmware's global `_policy_engine_thread`,
//! `_protocol_rx_thread`, `_protocol_tx_thread`, `_hard_reset_thread` handles
//! plus `_pdb_event.ch_prl_tx`/`_pdb_event.ch_pe_sink_startup` mailboxes
//! (`lib/include/pdb_event.h`): everything two tasks need to exchange is
//! collected into one [`Channels`] so a port's entire concurrency surface is
//! one `static`.

use crate::constants::MESSAGE_POOL_SIZE;
use crate::message::MessageBuffer;
use crate::sync::{EventChannel, Mailbox};

/// One port's event channels and inter-task mailboxes.
///
/// Sized by [`MESSAGE_POOL_SIZE`]: a mailbox can never hold more in-flight
/// messages than there are buffers to put in it.
pub struct Channels {
    /// See [`super::events::prl_rx`].
    pub prl_rx_events: EventChannel,
    /// See [`super::events::prl_tx`].
    pub prl_tx_events: EventChannel,
    /// See [`super::events::hard_reset`].
    pub hard_reset_events: EventChannel,
    /// See [`super::events::pe`].
    pub pe_events: EventChannel,
    /// Messages handed from `tasks::protocol_rx` to `tasks::policy_engine`.
    pub pe_inbox: Mailbox<MessageBuffer, MESSAGE_POOL_SIZE>,
    /// Messages handed from `tasks::policy_engine` to `tasks::protocol_tx`.
    pub prl_tx_inbox: Mailbox<MessageBuffer, MESSAGE_POOL_SIZE>,
}

impl Channels {
    /// Empty channels and mailboxes, suitable for `static` initialization.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prl_rx_events: EventChannel::new(),
            prl_tx_events: EventChannel::new(),
            hard_reset_events: EventChannel::new(),
            pe_events: EventChannel::new(),
            pe_inbox: Mailbox::new(),
            prl_tx_inbox: Mailbox::new(),
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channels_have_empty_mailboxes() {
        let channels = Channels::new();
        assert_eq!(channels.pe_inbox.try_fetch(), None);
        assert_eq!(channels.prl_tx_inbox.try_fetch(), None);
    }

    #[test]
    fn new_channels_have_no_pending_events() {
        let channels = Channels::new();
        assert_eq!(channels.pe_events.try_wait_any(u32::MAX), None);
    }
}
