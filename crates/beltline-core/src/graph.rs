//! The simulation graph: owns all tools, ports, and links and orchestrates
//! the tick pipeline.
//!
//! Tools, ports, and links live in slotmap arenas and refer to each other by
//! id, never by reference. Evaluation order per tick is insertion order of
//! tools, then insertion order of links -- a deliberate, documented tie-break
//! so replaying the same edit history yields the same behavior. Slot reuse
//! makes slotmap iteration order unsuitable for this, so the graph keeps
//! explicit order vectors.

use slotmap::SlotMap;

use crate::fixed::Ticks;
use crate::id::{LinkId, PortId, ToolId};
use crate::link::Link;
use crate::port::{Port, PortDirection};
use crate::tool::{
    Belt, BeltConfig, BoxGenerator, ExitBlock, ExitConfig, GeneratorConfig, TickContext, Tool,
};
use crate::vars::VariableStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Structural errors from topology-mutating operations. Always surfaced
/// synchronously to the caller; silent topology corruption would propagate
/// into physically meaningless states.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("tool not found: {0:?}")]
    ToolNotFound(ToolId),
    #[error("port not found: {0:?}")]
    PortNotFound(PortId),
    #[error("link not found: {0:?}")]
    LinkNotFound(LinkId),
    #[error("incompatible endpoints: {from:?} -> {to:?} (links run output -> input)")]
    IncompatibleEndpoints { from: PortId, to: PortId },
    #[error("port already linked: {0:?}")]
    PortAlreadyLinked(PortId),
}

// ---------------------------------------------------------------------------
// SimulationGraph
// ---------------------------------------------------------------------------

/// Owns the tool/port/link topology and advances it tick by tick.
///
/// The graph is the only topology mutator; the tick loop only calls
/// [`SimulationGraph::tick`]. There is no run/pause state machine -- pausing
/// is modeled externally by not invoking `tick`.
#[derive(Debug, Default)]
pub struct SimulationGraph {
    tools: SlotMap<ToolId, Tool>,
    ports: SlotMap<PortId, Port>,
    links: SlotMap<LinkId, Link>,
    /// Tick evaluation order: tool insertion order.
    tool_order: Vec<ToolId>,
    /// Propagate order: link insertion order.
    link_order: Vec<LinkId>,
    tick: Ticks,
    next_box: u64,
}

impl SimulationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Editing interface (the editor collaborator is the only caller)
    // -----------------------------------------------------------------------

    /// Add a conveyor belt with one input and one output port.
    pub fn add_belt(&mut self, cfg: BeltConfig) -> ToolId {
        self.add_tool_with_ports(|tool_id, ports| {
            let input = ports.insert(Port::new(tool_id, PortDirection::Input, (0.0, 0.0)));
            let output = ports.insert(Port::new(tool_id, PortDirection::Output, (0.0, 0.0)));
            Tool::Belt(Belt::new(cfg, input, output))
        })
    }

    /// Add an exit block with one input port.
    pub fn add_exit(&mut self, cfg: ExitConfig) -> ToolId {
        self.add_tool_with_ports(|tool_id, ports| {
            let input = ports.insert(Port::new(tool_id, PortDirection::Input, (0.0, 0.0)));
            Tool::Exit(ExitBlock::new(cfg, input))
        })
    }

    /// Add a box generator with one output port.
    pub fn add_generator(&mut self, cfg: GeneratorConfig) -> ToolId {
        self.add_tool_with_ports(|tool_id, ports| {
            let output = ports.insert(Port::new(tool_id, PortDirection::Output, (0.0, 0.0)));
            Tool::Generator(BoxGenerator::new(cfg, output))
        })
    }

    fn add_tool_with_ports(
        &mut self,
        build: impl FnOnce(ToolId, &mut SlotMap<PortId, Port>) -> Tool,
    ) -> ToolId {
        let ports = &mut self.ports;
        let tool_id = self.tools.insert_with_key(|id| build(id, ports));
        self.tool_order.push(tool_id);
        tool_id
    }

    /// Remove a tool, cascading removal of its ports and any links attached
    /// to them.
    pub fn remove_tool(&mut self, tool_id: ToolId) -> Result<(), TopologyError> {
        let tool = self
            .tools
            .get(tool_id)
            .ok_or(TopologyError::ToolNotFound(tool_id))?;
        let ports = tool.ports();

        for &port_id in &ports {
            if let Some(link_id) = self.ports.get(port_id).and_then(|p| p.link) {
                self.remove_link(link_id);
            }
        }
        for port_id in ports {
            self.ports.remove(port_id);
        }
        self.tools.remove(tool_id);
        self.tool_order.retain(|&id| id != tool_id);
        Ok(())
    }

    /// Join an output port to an input port with a zero-delay link.
    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<LinkId, TopologyError> {
        self.connect_with_delay(from, to, 0)
    }

    /// Join an output port to an input port with a transfer delay in ticks.
    pub fn connect_with_delay(
        &mut self,
        from: PortId,
        to: PortId,
        delay: Ticks,
    ) -> Result<LinkId, TopologyError> {
        let src = self
            .ports
            .get(from)
            .ok_or(TopologyError::PortNotFound(from))?;
        let dst = self.ports.get(to).ok_or(TopologyError::PortNotFound(to))?;

        if src.direction != PortDirection::Output || dst.direction != PortDirection::Input {
            return Err(TopologyError::IncompatibleEndpoints { from, to });
        }
        if src.link.is_some() {
            return Err(TopologyError::PortAlreadyLinked(from));
        }
        if dst.link.is_some() {
            return Err(TopologyError::PortAlreadyLinked(to));
        }

        let link_id = self.links.insert(Link::new(from, to, delay));
        self.link_order.push(link_id);
        if let Some(p) = self.ports.get_mut(from) {
            p.link = Some(link_id);
        }
        if let Some(p) = self.ports.get_mut(to) {
            p.link = Some(link_id);
        }
        Ok(link_id)
    }

    /// Remove a link, freeing both endpoint ports.
    pub fn disconnect(&mut self, link_id: LinkId) -> Result<(), TopologyError> {
        if !self.links.contains_key(link_id) {
            return Err(TopologyError::LinkNotFound(link_id));
        }
        self.remove_link(link_id);
        Ok(())
    }

    fn remove_link(&mut self, link_id: LinkId) {
        if let Some(link) = self.links.remove(link_id) {
            if link.boxes_in_flight() > 0 {
                log::debug!("removing link with a box still in flight; box is lost");
            }
            if let Some(p) = self.ports.get_mut(link.from) {
                p.link = None;
            }
            if let Some(p) = self.ports.get_mut(link.to) {
                p.link = None;
            }
        }
        self.link_order.retain(|&id| id != link_id);
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick.
    ///
    /// Phase 1 advances every tool in insertion order; phase 2 propagates
    /// every link once in insertion order; phase 3 publishes
    /// simulation-derived variables unconditionally. The phase split bounds
    /// every box to at most one tool-to-tool hop per tick.
    pub fn tick(&mut self, vars: &VariableStore) {
        let now = self.tick;

        for &tool_id in &self.tool_order {
            if let Some(tool) = self.tools.get_mut(tool_id) {
                let mut ctx = TickContext {
                    ports: &mut self.ports,
                    vars,
                    now,
                    next_box: &mut self.next_box,
                };
                tool.advance(&mut ctx);
            }
        }

        for &link_id in &self.link_order {
            if let Some(link) = self.links.get_mut(link_id) {
                link.propagate(&mut self.ports, now);
            }
        }

        for &tool_id in &self.tool_order {
            if let Some(tool) = self.tools.get(tool_id) {
                tool.publish(vars);
            }
        }

        self.tick += 1;
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Ticks executed so far.
    pub fn tick_count(&self) -> Ticks {
        self.tick
    }

    pub fn tool(&self, id: ToolId) -> Option<&Tool> {
        self.tools.get(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    pub fn tool_count(&self) -> usize {
        self.tool_order.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_order.len()
    }

    /// Total boxes produced by all generators.
    pub fn boxes_produced(&self) -> u64 {
        self.tools
            .values()
            .filter_map(|t| t.as_generator())
            .map(|g| g.produced())
            .sum()
    }

    /// Total boxes consumed by all exit blocks.
    pub fn boxes_consumed(&self) -> u64 {
        self.tools
            .values()
            .filter_map(|t| t.as_exit())
            .map(|e| e.consumed())
            .sum()
    }

    /// Boxes currently resident anywhere in the topology: on ports, inside
    /// belt buffers, and in flight on links. Together with the produced and
    /// consumed counters this gives the conservation identity
    /// `produced == consumed + resident`.
    pub fn resident_boxes(&self) -> u64 {
        let on_ports = self.ports.values().filter(|p| !p.is_empty()).count() as u64;
        let in_tools: u64 = self.tools.values().map(|t| t.boxes_held()).sum();
        let on_links: u64 = self.links.values().map(|l| l.boxes_in_flight()).sum();
        on_ports + in_tools + on_links
    }
}
