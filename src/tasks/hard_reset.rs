//! Hard-Reset coordinator: the one task both Protocol layers and the Policy
//! Engine wait on whenever a Hard Reset ordered signal is in play.
//!
//! A direct translation of `lib/src/hard_reset.c`'s seven-state machine.
//! The coordinator is the only task that clears [`PrlState`](crate::port::PrlState)
//! directly (`ResetLayer`); Protocol RX/TX each learn of the reset only
//! through their own `RESET` event bit, never by reading the counters
//! themselves.

use embedded_hal_async::delay::DelayNs;

use crate::constants::T_HARD_RESET_COMPLETE_MS;
use crate::phy::PhyDriver;
use crate::sync::{select::wait_any_timeout, SharedPort};

use super::channels::Channels;
use super::events::hard_reset::{DONE, HARD_RESET_RECEIVED, HARD_RESET_SENT, RESET};
use super::events::{pe, prl_rx, prl_tx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HardResetState {
    ResetLayer,
    IndicateHardReset,
    RequestHardReset,
    WaitPhy,
    HardResetRequested,
    WaitPe,
    Complete,
}

/// Run the Hard-Reset coordinator forever.
pub async fn run<P: PhyDriver, D: DelayNs>(
    phy: &mut P,
    timer: &mut D,
    port: &SharedPort,
    channels: &Channels,
) -> ! {
    let mut state = HardResetState::ResetLayer;
    loop {
        state = match state {
            HardResetState::ResetLayer => reset_layer(port, channels).await,
            HardResetState::IndicateHardReset => indicate_hard_reset(channels),
            HardResetState::RequestHardReset => request_hard_reset(phy).await,
            HardResetState::WaitPhy => wait_phy(timer, channels).await,
            HardResetState::HardResetRequested => hard_reset_requested(channels),
            HardResetState::WaitPe => wait_pe(channels).await,
            HardResetState::Complete => HardResetState::ResetLayer,
        };
    }
}

async fn reset_layer(port: &SharedPort, channels: &Channels) -> HardResetState {
    let bits = channels
        .hard_reset_events
        .wait_any(RESET | HARD_RESET_RECEIVED)
        .await;

    port.with(|p| p.prl.reset());
    channels.prl_rx_events.signal(prl_rx::RESET);
    channels.prl_tx_events.signal(prl_tx::RESET);

    if bits & RESET != 0 {
        #[cfg(feature = "defmt")]
        defmt::debug!("hard reset requested by policy engine");
        HardResetState::RequestHardReset
    } else {
        #[cfg(feature = "defmt")]
        defmt::debug!("hard reset received from source");
        HardResetState::IndicateHardReset
    }
}

fn indicate_hard_reset(channels: &Channels) -> HardResetState {
    channels.pe_events.signal(pe::RESET);
    HardResetState::WaitPe
}

async fn request_hard_reset<P: PhyDriver>(phy: &mut P) -> HardResetState {
    let _ = phy.send_hard_reset().await;
    HardResetState::WaitPhy
}

async fn wait_phy<D: DelayNs>(timer: &mut D, channels: &Channels) -> HardResetState {
    // Whether the PHY confirms HARD_RESET_SENT or this simply times out, the
    // coordinator moves on either way: the firmware's wait here is advisory
    // bookkeeping, not a condition for correctness (design notes §11.3).
    let _ = wait_any_timeout(
        &channels.hard_reset_events,
        timer,
        HARD_RESET_SENT,
        T_HARD_RESET_COMPLETE_MS,
    )
    .await;
    HardResetState::HardResetRequested
}

fn hard_reset_requested(channels: &Channels) -> HardResetState {
    channels.pe_events.signal(pe::HARD_SENT);
    HardResetState::WaitPe
}

async fn wait_pe(channels: &Channels) -> HardResetState {
    channels.hard_reset_events.wait_any(DONE).await;
    HardResetState::Complete
}
