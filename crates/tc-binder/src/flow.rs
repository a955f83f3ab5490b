//! Flow-graph reachability markers attached by the binder (spec.md C3).
//!
//! The checker never builds a control-flow graph itself; it only queries
//! flags the binder already attached to the nodes that matter (statement
//! boundaries, branch/loop joins). Mirrors the bitset idiom
//! `tsz-binder`'s `flow_flags` module uses for its own (much larger) flow
//! graph.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FlowFlags: u32 {
        /// The entry flow-node of a module or function.
        const START = 1 << 0;
        /// This flow-node, and everything dominated by it, cannot be
        /// reached at runtime (dead code after `return`/`raise`, or past
        /// an exhaustive `if`/`else` that both always exit).
        const UNREACHABLE = 1 << 1;
        const BRANCH_LABEL = 1 << 2;
        const LOOP_LABEL = 1 << 3;
        const ASSIGNMENT = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowNodeId(pub u32);

#[derive(Clone, Copy, Debug)]
pub struct FlowNode {
    pub flags: FlowFlags,
    pub antecedent: Option<FlowNodeId>,
}

#[derive(Default, Debug)]
pub struct FlowNodeArena {
    nodes: Vec<FlowNode>,
}

impl FlowNodeArena {
    pub fn new() -> Self {
        FlowNodeArena { nodes: Vec::new() }
    }

    pub fn push(&mut self, flags: FlowFlags, antecedent: Option<FlowNodeId>) -> FlowNodeId {
        let id = FlowNodeId(self.nodes.len() as u32);
        self.nodes.push(FlowNode { flags, antecedent });
        id
    }

    pub fn get(&self, id: FlowNodeId) -> Option<&FlowNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn is_unreachable(&self, id: FlowNodeId) -> bool {
        self.get(id).is_some_and(|n| n.flags.contains(FlowFlags::UNREACHABLE))
    }
}
