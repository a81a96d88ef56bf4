//! INT_N dispatcher: turns PHY interrupt bits into signals on the other four
//! tasks' event channels.
//!
//! Grounded on `lib/src/int_n.c`'s `IntNThread`, which polls `LINE_INT_N`
//! every millisecond and, when the PHY has something to report, reads
//! `INTERRUPT`/`INTERRUPTA`/`INTERRUPTB`/`STATUS1` once and fans the bits out
//! to whichever thread(s) they concern — combining `I_RETRYFAIL`/`I_TXSENT`
//! into one `chEvtSignal` to Protocol TX, and `I_HARDRST`/`I_HARDSENT` into
//! one to the Hard-Reset coordinator, exactly as done here with
//! [`EventChannel::signal_many`]. Checking the `INT_N` line itself before
//! reading status is left to the [`PhyDriver`] implementation (it is free to
//! make `read_status` cheap when nothing is pending); this dispatcher only
//! owns the polling cadence and the fan-out.

use embedded_hal_async::delay::DelayNs;

use crate::constants::INT_N_POLL_INTERVAL_MS;
use crate::phy::PhyDriver;

use super::channels::Channels;
use super::events;

/// Read one round of PHY status and signal every task it concerns.
///
/// Returns the underlying bus error, if any, so the caller can decide
/// whether a single failed poll is worth logging or ignoring; [`run`]
/// ignores it and polls again after the usual interval.
pub async fn poll_once<P: PhyDriver>(
    phy: &mut P,
    channels: &Channels,
) -> Result<(), P::BusError> {
    let status = phy.read_status().await?;
    let interrupts = status.interrupts;

    if interrupts.i_gcrc_sent {
        channels.prl_rx_events.signal(events::prl_rx::GOOD_CRC_SENT);
    }

    let mut tx_mask = 0;
    if interrupts.i_retry_fail {
        tx_mask |= events::prl_tx::RETRY_FAIL;
    }
    if interrupts.i_tx_sent {
        tx_mask |= events::prl_tx::TX_SENT;
    }
    if tx_mask != 0 {
        channels.prl_tx_events.signal_many(tx_mask);
    }

    let mut hard_reset_mask = 0;
    if interrupts.i_hard_reset {
        hard_reset_mask |= events::hard_reset::HARD_RESET_RECEIVED;
    }
    if interrupts.i_hard_sent {
        hard_reset_mask |= events::hard_reset::HARD_RESET_SENT;
    }
    if hard_reset_mask != 0 {
        channels.hard_reset_events.signal_many(hard_reset_mask);
    }

    if interrupts.is_overtemp_event() {
        channels.pe_events.signal(events::pe::OVER_TEMP);
    }

    Ok(())
}

/// Poll the PHY forever at [`INT_N_POLL_INTERVAL_MS`], fanning out whatever
/// it reports. Bus errors from a single poll are not fatal to the
/// dispatcher: the next poll simply tries again.
pub async fn run<P: PhyDriver, D: DelayNs>(phy: &mut P, timer: &mut D, channels: &Channels) -> ! {
    loop {
        let _ = poll_once(phy, channels).await;
        timer.delay_ms(INT_N_POLL_INTERVAL_MS).await;
    }
}
