//! Execution plan tree nodes.

use indexmap::IndexMap;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use super::ChildList;

/// Resource parameters: each key maps to one or more values, in insertion order.
pub type ResourceParameters = IndexMap<String, Vec<String>>;

fn default_repeat_count() -> u32 {
    1
}

fn is_default_repeat_count(count: &u32) -> bool {
    *count == 1
}

/// Repeat counts are at least 1; a stored 0 is rejected.
fn deserialize_repeat_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = u32::deserialize(deserializer)?;
    if count == 0 {
        return Err(de::Error::invalid_value(
            Unexpected::Unsigned(0),
            &"a repeat count of at least 1",
        ));
    }
    Ok(count)
}

/// A labeled resource invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCall {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: ResourceParameters,
}

impl ResourceCall {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            parameters: ResourceParameters::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: ResourceParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Append values under `key`, keeping the key's first insertion position.
    pub fn with_parameter<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.parameters
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

/// Leaf content carried by a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaf {
    /// Text to say
    Text(String),
    /// Resource to trigger
    Resource(ResourceCall),
}

impl Leaf {
    /// Empty text and empty labels count as no content.
    pub fn has_data(&self) -> bool {
        match self {
            Leaf::Text(text) => !text.is_empty(),
            Leaf::Resource(call) => !call.label.is_empty(),
        }
    }
}

/// One node of an execution plan.
///
/// A node may carry its own leaf step and, at the same time, sub-steps in any
/// of its three child lists. Children are owned exclusively by their parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<Leaf>,

    /// Multiplicity of the leaf step alone
    #[serde(
        default = "default_repeat_count",
        deserialize_with = "deserialize_repeat_count",
        skip_serializing_if = "is_default_repeat_count"
    )]
    pub resource_repeat_count: u32,

    /// Multiplicity of the whole subtree
    #[serde(
        default = "default_repeat_count",
        deserialize_with = "deserialize_repeat_count",
        skip_serializing_if = "is_default_repeat_count"
    )]
    pub scope_repeat_count: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequential: Vec<ExecutionNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parallel: Vec<ExecutionNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub background: Vec<ExecutionNode>,
}

impl Default for ExecutionNode {
    fn default() -> Self {
        Self {
            leaf: None,
            resource_repeat_count: default_repeat_count(),
            scope_repeat_count: default_repeat_count(),
            sequential: Vec::new(),
            parallel: Vec::new(),
            background: Vec::new(),
        }
    }
}

impl ExecutionNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            leaf: Some(Leaf::Text(text.into())),
            ..Self::default()
        }
    }

    pub fn from_resource(call: ResourceCall) -> Self {
        Self {
            leaf: Some(Leaf::Resource(call)),
            ..Self::default()
        }
    }

    pub fn with_sequential(mut self, child: ExecutionNode) -> Self {
        self.sequential.push(child);
        self
    }

    pub fn with_parallel(mut self, child: ExecutionNode) -> Self {
        self.parallel.push(child);
        self
    }

    pub fn with_background(mut self, child: ExecutionNode) -> Self {
        self.background.push(child);
        self
    }

    pub fn with_resource_repeat_count(mut self, count: u32) -> Self {
        self.resource_repeat_count = count;
        self
    }

    pub fn with_scope_repeat_count(mut self, count: u32) -> Self {
        self.scope_repeat_count = count;
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.leaf {
            Some(Leaf::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn resource(&self) -> Option<&ResourceCall> {
        match &self.leaf {
            Some(Leaf::Resource(call)) => Some(call),
            _ => None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.leaf = Some(Leaf::Text(text.into()));
    }

    pub fn set_resource(&mut self, call: ResourceCall) {
        self.leaf = Some(Leaf::Resource(call));
    }

    pub fn has_leaf_data(&self) -> bool {
        self.leaf.as_ref().is_some_and(Leaf::has_data)
    }

    pub fn has_children(&self) -> bool {
        !self.sequential.is_empty() || !self.parallel.is_empty() || !self.background.is_empty()
    }

    pub fn children(&self, list: ChildList) -> &[ExecutionNode] {
        match list {
            ChildList::Sequential => &self.sequential,
            ChildList::Parallel => &self.parallel,
            ChildList::Background => &self.background,
        }
    }

    pub fn children_mut(&mut self, list: ChildList) -> &mut Vec<ExecutionNode> {
        match list {
            ChildList::Sequential => &mut self.sequential,
            ChildList::Parallel => &mut self.parallel,
            ChildList::Background => &mut self.background,
        }
    }

    /// First non-empty list in background, parallel, sequential order.
    pub fn last_child_list(&self) -> Option<ChildList> {
        [
            ChildList::Background,
            ChildList::Parallel,
            ChildList::Sequential,
        ]
        .into_iter()
        .find(|list| !self.children(*list).is_empty())
    }

    /// Most recently attached node of this subtree.
    ///
    /// Follows the last element of the background, else parallel, else
    /// sequential children until a node without children is reached. Returns
    /// `self` when there are no children.
    pub fn last_descendant_mut(&mut self) -> &mut ExecutionNode {
        let mut node = self;
        while let Some(list) = node.last_child_list() {
            let children = node.children_mut(list);
            let last = children.len() - 1;
            node = &mut children[last];
        }
        node
    }

    /// Number of nodes carrying leaf data in this subtree.
    pub fn leaf_count(&self) -> usize {
        let own = usize::from(self.has_leaf_data());
        own + self
            .sequential
            .iter()
            .chain(&self.parallel)
            .chain(&self.background)
            .map(ExecutionNode::leaf_count)
            .sum::<usize>()
    }

    pub fn to_canonical_string(&self) -> String {
        crate::render::render_canonical(self)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl std::fmt::Display for ExecutionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}
