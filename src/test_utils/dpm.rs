//! A scripted [`DevicePolicyManager`] for exercising `tasks::policy_engine`
//! without a real board-policy implementation.
//!
//! Every call is recorded so a test can assert the Policy Engine drove the
//! DPM through the expected sequence, mirroring how the teacher's
//! `MockMdioBus` logs every register write for later assertion.

use core::cell::RefCell;
use std::vec::Vec;

use crate::dpm::DevicePolicyManager;
use crate::message::{Header, MessageBuffer, RequestDataObject};
use crate::phy::TypeCCurrent;

/// Calls made into a [`ScriptedDpm`], in order, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DpmCall {
    EvaluateCapability,
    GetSinkCapability,
    TransitionDefault,
    TransitionStandby,
    TransitionRequested,
    TransitionMin,
    TransitionTypec,
    NotSupportedReceived,
}

/// A [`DevicePolicyManager`] driven entirely by values queued up-front.
#[derive(Default)]
pub struct ScriptedDpm {
    request: RefCell<Option<RequestDataObject>>,
    sink_capability: RefCell<MessageBuffer>,
    giveback_enabled: RefCell<bool>,
    typec_acceptable: RefCell<bool>,
    calls: RefCell<Vec<DpmCall>>,
}

impl ScriptedDpm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The request [`DevicePolicyManager::evaluate_capability`] will return
    /// on its next call.
    pub fn set_request(&self, request: Option<RequestDataObject>) {
        *self.request.borrow_mut() = request;
    }

    pub fn set_sink_capability(&self, message: MessageBuffer) {
        *self.sink_capability.borrow_mut() = message;
    }

    pub fn set_giveback_enabled(&self, enabled: bool) {
        *self.giveback_enabled.borrow_mut() = enabled;
    }

    pub fn set_typec_acceptable(&self, acceptable: bool) {
        *self.typec_acceptable.borrow_mut() = acceptable;
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DpmCall> {
        self.calls.borrow().clone()
    }
}

impl DevicePolicyManager for ScriptedDpm {
    fn evaluate_capability(
        &mut self,
        _capabilities: Option<&MessageBuffer>,
        _header_template: Header,
    ) -> Option<RequestDataObject> {
        self.calls.borrow_mut().push(DpmCall::EvaluateCapability);
        *self.request.borrow()
    }

    fn get_sink_capability(&mut self, _header_template: Header) -> MessageBuffer {
        self.calls.borrow_mut().push(DpmCall::GetSinkCapability);
        *self.sink_capability.borrow()
    }

    fn transition_default(&mut self) {
        self.calls.borrow_mut().push(DpmCall::TransitionDefault);
    }

    fn transition_standby(&mut self) {
        self.calls.borrow_mut().push(DpmCall::TransitionStandby);
    }

    fn transition_requested(&mut self) {
        self.calls.borrow_mut().push(DpmCall::TransitionRequested);
    }

    fn giveback_enabled(&mut self) -> bool {
        *self.giveback_enabled.borrow()
    }

    fn evaluate_typec_current(&mut self, _current: TypeCCurrent) -> bool {
        *self.typec_acceptable.borrow()
    }

    fn transition_min(&mut self) {
        self.calls.borrow_mut().push(DpmCall::TransitionMin);
    }

    fn transition_typec(&mut self) {
        self.calls.borrow_mut().push(DpmCall::TransitionTypec);
    }

    fn not_supported_received(&mut self) {
        self.calls.borrow_mut().push(DpmCall::NotSupportedReceived);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_capability_returns_configured_request() {
        let mut dpm = ScriptedDpm::new();
        let rdo = RequestDataObject::FixedVariable(crate::message::FixedVariableRdo::new(
            1, 1000, 1000, true, false,
        ));
        dpm.set_request(Some(rdo));
        let header = Header::control(
            crate::message::ControlMessageType::Ping,
            crate::message::SpecRevision::V2_0,
            crate::message::PowerRole::Sink,
            crate::message::DataRole::Ufp,
            0,
        );
        assert_eq!(dpm.evaluate_capability(None, header), Some(rdo));
        assert_eq!(dpm.calls(), std::vec![DpmCall::EvaluateCapability]);
    }
}
