//! Replaying a finished plan into executor callbacks.

use indexmap::IndexMap;

use super::{PlanVisitor, walk};
use crate::plan::{ExecutionNode, Leaf};

/// Resource parameters with one value per key.
pub type FlatParameters = IndexMap<String, String>;

/// Consumer that actually speaks text and triggers resources.
///
/// Callbacks arrive in traversal order. Parallel siblings may be dispatched
/// concurrently and background steps fired without waiting; that decision
/// belongs to the executor.
pub trait PlanExecutor {
    fn on_text_to_say(&mut self, text: &str);

    fn on_resource(&mut self, label: &str, value: &str, parameters: &FlatParameters);
}

/// Chooses the single value handed to the executor for a multi-valued
/// parameter. Returning `None` drops the key.
pub trait ParameterFlattening {
    fn flatten(&self, key: &str, values: &[String]) -> Option<String>;
}

/// Keeps the first value of each parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstValue;

impl ParameterFlattening for FirstValue {
    fn flatten(&self, _key: &str, values: &[String]) -> Option<String> {
        values.first().cloned()
    }
}

impl<F> ParameterFlattening for F
where
    F: Fn(&str, &[String]) -> Option<String>,
{
    fn flatten(&self, key: &str, values: &[String]) -> Option<String> {
        self(key, values)
    }
}

struct ReplayVisitor<'a, E: ?Sized, F: ?Sized> {
    executor: &'a mut E,
    flattening: &'a F,
}

impl<E, F> PlanVisitor for ReplayVisitor<'_, E, F>
where
    E: PlanExecutor + ?Sized,
    F: ParameterFlattening + ?Sized,
{
    type Output = ();

    fn leaf(&mut self, node: &ExecutionNode) {
        match &node.leaf {
            Some(Leaf::Text(text)) if !text.is_empty() => self.executor.on_text_to_say(text),
            Some(Leaf::Resource(call)) if !call.label.is_empty() => {
                let parameters: FlatParameters = call
                    .parameters
                    .iter()
                    .filter_map(|(key, values)| {
                        self.flattening
                            .flatten(key, values)
                            .map(|value| (key.clone(), value))
                    })
                    .collect();
                self.executor
                    .on_resource(&call.label, &call.value, &parameters);
            }
            _ => {}
        }
    }

    fn is_empty(&self, _output: &()) -> bool {
        true
    }

    fn append(&mut self, _output: (), _child: ()) {}
}

/// Replay `node` into `executor`, keeping the first value of each parameter.
pub fn replay<E: PlanExecutor + ?Sized>(node: &ExecutionNode, executor: &mut E) {
    replay_with(node, executor, &FirstValue);
}

/// Replay `node` into `executor` with a caller-chosen parameter flattening.
pub fn replay_with<E, F>(node: &ExecutionNode, executor: &mut E, flattening: &F)
where
    E: PlanExecutor + ?Sized,
    F: ParameterFlattening + ?Sized,
{
    let _span = tracing::debug_span!("plan.replay", leaves = node.leaf_count()).entered();
    let mut visitor = ReplayVisitor {
        executor,
        flattening,
    };
    walk(node, false, &mut visitor);
}

/// Executor that records every callback into a trace string, e.g.
/// `onTextToSay(Bonjour)onResource(mission, id, {distance=1})`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingExecutor {
    trace: String,
    calls: usize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn into_trace(self) -> String {
        self.trace
    }

    /// Number of callbacks received.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PlanExecutor for RecordingExecutor {
    fn on_text_to_say(&mut self, text: &str) {
        self.calls += 1;
        self.trace.push_str(&format!("onTextToSay({})", text));
    }

    fn on_resource(&mut self, label: &str, value: &str, parameters: &FlatParameters) {
        self.calls += 1;
        let parameters = parameters
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(", ");
        self.trace
            .push_str(&format!("onResource({}, {}, {{{}}})", label, value, parameters));
    }
}
