//! Serializable event transcripts.
//!
//! An [`EventLog`] captures the event stream of one reasoning pass so it can
//! be stored as JSON and replayed into a fresh builder later.

use serde::{Deserialize, Serialize};

use super::PlanSink;
use crate::plan::{LinkKind, ResourceParameters};

/// One inbound event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlanEvent {
    BeginScope {
        link: LinkKind,
    },
    EndScope,
    ExposeText {
        text: String,
    },
    ExposeResource {
        label: String,
        value: String,
        #[serde(default, skip_serializing_if = "ResourceParameters::is_empty")]
        parameters: ResourceParameters,
    },
    SetLeafRepeatCount {
        count: u32,
    },
    SetScopeRepeatCount {
        count: u32,
    },
}

impl PlanEvent {
    /// Feed this event to `sink`.
    pub fn apply<S: PlanSink + ?Sized>(&self, sink: &mut S) {
        match self {
            PlanEvent::BeginScope { link } => sink.begin_scope(*link),
            PlanEvent::EndScope => sink.end_scope(),
            PlanEvent::ExposeText { text } => sink.expose_text(text),
            PlanEvent::ExposeResource {
                label,
                value,
                parameters,
            } => sink.expose_resource(label, value, parameters),
            PlanEvent::SetLeafRepeatCount { count } => sink.set_leaf_repeat_count(*count),
            PlanEvent::SetScopeRepeatCount { count } => sink.set_scope_repeat_count(*count),
        }
    }
}

/// Ordered record of events, itself a [`PlanSink`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<PlanEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PlanEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: PlanEvent) {
        self.events.push(event);
    }

    pub fn replay_into<S: PlanSink + ?Sized>(&self, sink: &mut S) {
        for event in &self.events {
            event.apply(sink);
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Vec<PlanEvent>> for EventLog {
    fn from(events: Vec<PlanEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<PlanEvent> for EventLog {
    fn from_iter<I: IntoIterator<Item = PlanEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl PlanSink for EventLog {
    fn begin_scope(&mut self, link: LinkKind) {
        self.push(PlanEvent::BeginScope { link });
    }

    fn end_scope(&mut self) {
        self.push(PlanEvent::EndScope);
    }

    fn expose_text(&mut self, text: &str) {
        self.push(PlanEvent::ExposeText {
            text: text.to_string(),
        });
    }

    fn expose_resource(&mut self, label: &str, value: &str, parameters: &ResourceParameters) {
        self.push(PlanEvent::ExposeResource {
            label: label.to_string(),
            value: value.to_string(),
            parameters: parameters.clone(),
        });
    }

    fn set_leaf_repeat_count(&mut self, count: u32) {
        self.push(PlanEvent::SetLeafRepeatCount { count });
    }

    fn set_scope_repeat_count(&mut self, count: u32) {
        self.push(PlanEvent::SetScopeRepeatCount { count });
    }
}
