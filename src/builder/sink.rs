//! Inbound event interface driven by the reasoning engine.

use crate::plan::{LinkKind, ResourceParameters};

/// Receiver of the flat scope/leaf event stream emitted during one
/// reasoning pass.
///
/// Calls arrive in a nested begin/end pattern with leaf writes at arbitrary
/// points. Implementations must tolerate unbalanced streams.
pub trait PlanSink {
    fn begin_scope(&mut self, link: LinkKind);

    fn end_scope(&mut self);

    fn expose_text(&mut self, text: &str);

    fn expose_resource(&mut self, label: &str, value: &str, parameters: &ResourceParameters);

    /// Annotate the most recently written leaf.
    fn set_leaf_repeat_count(&mut self, count: u32);

    /// Annotate the current scope.
    fn set_scope_repeat_count(&mut self, count: u32);
}

impl<S: PlanSink + ?Sized> PlanSink for &mut S {
    fn begin_scope(&mut self, link: LinkKind) {
        (**self).begin_scope(link);
    }

    fn end_scope(&mut self) {
        (**self).end_scope();
    }

    fn expose_text(&mut self, text: &str) {
        (**self).expose_text(text);
    }

    fn expose_resource(&mut self, label: &str, value: &str, parameters: &ResourceParameters) {
        (**self).expose_resource(label, value, parameters);
    }

    fn set_leaf_repeat_count(&mut self, count: u32) {
        (**self).set_leaf_repeat_count(count);
    }

    fn set_scope_repeat_count(&mut self, count: u32) {
        (**self).set_scope_repeat_count(count);
    }
}
