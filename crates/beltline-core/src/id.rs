use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a tool (belt, exit block, generator) in the simulation graph.
    pub struct ToolId;

    /// Identifies a connection port owned by a tool.
    pub struct PortId;

    /// Identifies a directed link joining an output port to an input port.
    pub struct LinkId;
}

/// Identifies a single generated box for the lifetime of the process.
/// Allocated from a monotonically increasing counter in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub u64);
