use crate::id::{LinkId, ToolId};
use crate::item::BoxItem;

/// Which way boxes flow through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Boxes arrive here from an upstream link.
    Input,
    /// Boxes are offered here for a downstream link to pick up.
    Output,
}

/// A typed connection point on a tool.
///
/// A port is directional, so the "at most one link as source, at most one as
/// destination" rule collapses to a single optional link slot. Occupancy is a
/// plain swap; the tool and link layers enforce the single-writer-per-tick
/// discipline.
#[derive(Debug, Clone)]
pub struct Port {
    /// The tool this port belongs to. Ports are never shared between tools.
    pub owner: ToolId,
    pub direction: PortDirection,
    /// Render-only offset; carried for the editor, unused by the simulation.
    pub position: (f32, f32),
    /// The one link attached to this port, if any.
    pub link: Option<LinkId>,
    occupant: Option<BoxItem>,
}

impl Port {
    pub fn new(owner: ToolId, direction: PortDirection, position: (f32, f32)) -> Self {
        Self {
            owner,
            direction,
            position,
            link: None,
            occupant: None,
        }
    }

    pub fn occupancy(&self) -> Option<&BoxItem> {
        self.occupant.as_ref()
    }

    pub fn set_occupancy(&mut self, item: Option<BoxItem>) {
        self.occupant = item;
    }

    /// Remove and return the current occupant.
    pub fn take(&mut self) -> Option<BoxItem> {
        self.occupant.take()
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BoxId;
    use slotmap::SlotMap;

    fn any_tool_id() -> ToolId {
        let mut tools: SlotMap<ToolId, ()> = SlotMap::with_key();
        tools.insert(())
    }

    #[test]
    fn occupancy_is_a_swap() {
        let mut port = Port::new(any_tool_id(), PortDirection::Input, (0.0, 0.0));
        assert!(port.is_empty());

        port.set_occupancy(Some(BoxItem::new(BoxId(7))));
        assert_eq!(port.occupancy().map(|b| b.id), Some(BoxId(7)));

        let taken = port.take();
        assert_eq!(taken.map(|b| b.id), Some(BoxId(7)));
        assert!(port.is_empty());
        assert!(port.take().is_none());
    }

    #[test]
    fn new_port_has_no_link() {
        let port = Port::new(any_tool_id(), PortDirection::Output, (1.0, 2.0));
        assert!(port.link.is_none());
        assert_eq!(port.direction, PortDirection::Output);
    }
}
