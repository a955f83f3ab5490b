//! Arena storage for a parsed tree, addressed by `NodeId`.

use crate::node::{Node, NodeId, NodeKind};
use tc_common::Span;

#[derive(Default, Debug)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    /// Insert a node and return its id. `parent` is set explicitly by the
    /// caller (a test fixture or a real binder) rather than inferred, since
    /// children are pushed before the parent that owns them.
    pub fn push(&mut self, span: Span, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { span, parent, kind });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Walk from `id` up through `parent` links, inclusive of `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = Some(id);
        std::iter::from_fn(move || {
            let this = current?;
            current = self.parent_of(this);
            Some(this)
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
