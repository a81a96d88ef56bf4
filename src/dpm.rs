//! The Device Policy Manager contract: the split between protocol logic and
//! board-specific power policy.
//!
//! Grounded on `lib/include/pdb_dpm.h`'s `struct pdb_dpm_callbacks`
//! function-pointer table. Each required field there is a required method
//! here; each optional (nullable) field is a default-implemented method
//! returning the firmware's documented "not supported"/no-op behaviour, per
//! the REDESIGN FLAGS guidance to replace a nullable-callback table with a
//! trait that has sensible defaults instead of runtime null checks.

use crate::message::{Header, MessageBuffer, RequestDataObject};
use crate::phy::TypeCCurrent;

/// Board- and application-specific USB-PD sink policy.
///
/// Implementations decide *what* power to request and *how* to react to a
/// granted contract; the Policy Engine (`tasks::policy_engine`) owns only
/// *when* to call them, matching the call sites documented against each
/// method below (carried over from `pdb_dpm.h`'s inline comments).
pub trait DevicePolicyManager {
    /// Inspect a received Source_Capabilities message and decide whether to
    /// request power from it.
    ///
    /// Called from `EvalCap`. `capabilities` is `None` when the Policy
    /// Engine wants the DPM to re-evaluate the capabilities it was given
    /// last time (e.g. after a GotoMin/min_power change) without a new
    /// message having arrived; the DPM must retain its own reference to the
    /// previous Source_Capabilities buffer across such calls. Returns
    /// `true` and fills `out_request` if a suitable power level was found.
    fn evaluate_capability(
        &mut self,
        capabilities: Option<&MessageBuffer>,
        header_template: Header,
    ) -> Option<RequestDataObject>;

    /// Fill in a complete Sink_Capabilities message (including header) for
    /// `GiveSinkCap`, responding to a Get_Sink_Cap request.
    fn get_sink_capability(&mut self, header_template: Header) -> MessageBuffer;

    /// The sink has transitioned to its default (lowest, always-available)
    /// power level. Called from `TransitionDefault`, e.g. after a hard
    /// reset, before protocol state resumes.
    fn transition_default(&mut self);

    /// The sink has accepted a request that reduces power (GotoMin or a
    /// Wait response while an explicit contract exists). Called from
    /// `TransitionSink` when the newly accepted request targets the same
    /// object position as the previous one (no voltage change expected).
    fn transition_standby(&mut self);

    /// The newly negotiated contract is in effect (PS_RDY received). Called
    /// from `TransitionSink` once, unless `min_power` was set (GotoMin
    /// already reduced power and there is nothing further to apply).
    fn transition_requested(&mut self);

    /// Whether this DPM supports GotoMin-initiated current reduction. The
    /// default `false` matches `pdb_dpm_callbacks.giveback_enabled` being
    /// absent: GotoMin is then always answered with `SendNotSupported`.
    fn giveback_enabled(&mut self) -> bool {
        false
    }

    /// Evaluate a Type-C Current advertisement sampled while in
    /// `SourceUnresponsive`. Returns `true` if the DPM considers it usable.
    /// The default declines to sample at all (PE stays in
    /// `SourceUnresponsive` indefinitely), matching an absent callback.
    fn evaluate_typec_current(&mut self, _current: TypeCCurrent) -> bool {
        false
    }

    /// Called once from `Startup`, before the first `Discovery` transition.
    /// The default is a no-op, matching an absent callback.
    fn pd_start(&mut self) {}

    /// The sink has been asked (GotoMin, giveback enabled) to reduce to its
    /// minimum current at the present voltage. Only called if
    /// [`Self::giveback_enabled`] returns `true`; the default is
    /// unreachable in that case and is a no-op otherwise.
    fn transition_min(&mut self) {}

    /// Two consecutive Type-C Current samples agreed during
    /// `SourceUnresponsive` and [`Self::evaluate_typec_current`] accepted
    /// them. The default is a no-op (stay in fallback rather than acting on
    /// a signal the DPM never opted into observing).
    fn transition_typec(&mut self) {}

    /// A Not_Supported control message was received in `Ready` (rev 3.0).
    /// The default is a no-op.
    fn not_supported_received(&mut self) {}
}
