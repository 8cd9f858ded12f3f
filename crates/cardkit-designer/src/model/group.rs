use serde::{Deserialize, Serialize};

use super::LayerNode;

/// Children are positioned relative to the group's top-left corner and
/// drawn bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLayer {
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

impl GroupLayer {
    pub fn new(children: Vec<LayerNode>) -> Self {
        Self { children }
    }

    pub(crate) fn apply(&self, patch: &GroupPatch) -> Self {
        match &patch.children {
            Some(children) => Self {
                children: children.clone(),
            },
            None => self.clone(),
        }
    }
}

/// Group children are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub children: Option<Vec<LayerNode>>,
}
