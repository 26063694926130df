// ── Store actions ──
//
// One `Action` per phase of a dispatched operation. The dispatcher builds
// them from a `RequestDescriptor` and the classified response; the
// reducer is the only consumer.

use chrono::{DateTime, Utc};
use mdmconsole_api::{
    ActionTypes, Document, Failure, Operation, Phase, RequestDescriptor, ResourceKind,
};

/// Payload of one phase.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPhase {
    Request,
    /// 2xx response, classified. May still be an error document.
    Success(Document),
    Failure(Failure),
}

/// A phase of one operation against one resource kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ResourceKind,
    pub operation: Operation,
    pub phase: ActionPhase,
    /// When the terminal response was received. `None` for REQUEST.
    pub received_at: Option<DateTime<Utc>>,
}

impl Action {
    pub fn request(descriptor: &RequestDescriptor) -> Self {
        Self {
            kind: descriptor.kind,
            operation: descriptor.operation.clone(),
            phase: ActionPhase::Request,
            received_at: None,
        }
    }

    pub fn success(descriptor: &RequestDescriptor, document: Document) -> Self {
        Self::terminal(descriptor, ActionPhase::Success(document))
    }

    pub fn failure(descriptor: &RequestDescriptor, failure: Failure) -> Self {
        Self::terminal(descriptor, ActionPhase::Failure(failure))
    }

    /// The terminal action for a classified response.
    pub fn from_outcome(descriptor: &RequestDescriptor, outcome: Result<Document, Failure>) -> Self {
        match outcome {
            Ok(document) => Self::success(descriptor, document),
            Err(failure) => Self::failure(descriptor, failure),
        }
    }

    fn terminal(descriptor: &RequestDescriptor, phase: ActionPhase) -> Self {
        Self {
            kind: descriptor.kind,
            operation: descriptor.operation.clone(),
            phase,
            received_at: Some(Utc::now()),
        }
    }

    #[must_use]
    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = Some(at);
        self
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            ActionPhase::Request => Phase::Request,
            ActionPhase::Success(_) => Phase::Success,
            ActionPhase::Failure(_) => Phase::Failure,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.phase, ActionPhase::Request)
    }

    /// Identifier such as `devices/RPATCH_SUCCESS`.
    pub fn action_type(&self) -> String {
        ActionTypes::new(self.kind, &self.operation)
            .for_phase(self.phase())
            .to_owned()
    }
}
