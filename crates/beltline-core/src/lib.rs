//! Beltline Core -- the simulation engine for a material-handling line.
//!
//! This crate models conveyor belts, exit points, and box-generating sources
//! as a graph of tools joined by directed links, and advances that graph in
//! discrete simulation ticks. A shared [`vars::VariableStore`] bridges the
//! simulation and externally synchronized controller tags.
//!
//! # Three-Phase Tick
//!
//! Each call to [`graph::SimulationGraph::tick`] runs:
//!
//! 1. **Advance** -- every tool updates once, in tool insertion order.
//! 2. **Propagate** -- every link moves at most one box across its hop, in
//!    link insertion order.
//! 3. **Publish** -- simulation-derived variables (consumed counts, sensor
//!    states, occupancy) are written to the variable store unconditionally.
//!
//! The advance-then-propagate split bounds every box to at most one
//! tool-to-tool hop per tick, so replaying the same edit history always
//! yields the same behavior.
//!
//! # Key Types
//!
//! - [`graph::SimulationGraph`] -- owns all tools, ports, and links in
//!   slotmap arenas; the only topology mutator.
//! - [`tool::Tool`] -- closed variant set: belt, exit block, box generator.
//! - [`link::Link`] -- directed hop from one output port to one input port,
//!   with a configurable transfer delay in ticks.
//! - [`vars::VariableStore`] -- concurrent name -> value table shared with
//!   the controller sync layer.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point for deterministic belt math.

pub mod fixed;
pub mod graph;
pub mod id;
pub mod item;
pub mod link;
pub mod port;
pub mod tool;
pub mod vars;
