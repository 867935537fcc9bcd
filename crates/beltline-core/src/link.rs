use crate::fixed::Ticks;
use crate::id::PortId;
use crate::item::BoxItem;
use crate::port::Port;
use slotmap::SlotMap;

/// A box travelling across a link, due at `ready_at`.
#[derive(Debug, Clone)]
struct InFlight {
    item: BoxItem,
    ready_at: Ticks,
}

/// A directed edge joining one output port to one input port.
///
/// The link is the single hop between exactly one producing and one consuming
/// port: a box picked up from the source is held in flight until its delay
/// elapses and the destination is free, so it is never duplicated and never
/// dropped between offer and acceptance.
#[derive(Debug)]
pub struct Link {
    /// Source port. Always an output port; enforced at creation by the graph.
    pub from: PortId,
    /// Destination port. Always an input port.
    pub to: PortId,
    /// Transfer delay in ticks. Zero delivers within the same tick's
    /// propagate phase.
    pub delay: Ticks,
    in_flight: Option<InFlight>,
}

impl Link {
    pub fn new(from: PortId, to: PortId, delay: Ticks) -> Self {
        Self {
            from,
            to,
            delay,
            in_flight: None,
        }
    }

    /// Move at most one box across this hop.
    ///
    /// Delivers the in-flight box first if it is due and the destination is
    /// free. A new box is picked up from the source only while the
    /// destination is empty; under backpressure the box stays visible on the
    /// source port. With a zero delay the pickup delivers within the same
    /// call. If either endpoint port no longer exists the link is dead and
    /// is skipped; graph mutation should have cascaded its removal.
    pub fn propagate(&mut self, ports: &mut SlotMap<PortId, Port>, now: Ticks) {
        if !ports.contains_key(self.from) || !ports.contains_key(self.to) {
            log::debug!("skipping dead link (endpoint port removed)");
            return;
        }

        self.try_deliver(ports, now);

        let dst_free = ports.get(self.to).is_some_and(|p| p.is_empty());
        if self.in_flight.is_none() && dst_free {
            if let Some(src) = ports.get_mut(self.from) {
                if let Some(item) = src.take() {
                    self.in_flight = Some(InFlight {
                        item,
                        ready_at: now + self.delay,
                    });
                }
            }
            self.try_deliver(ports, now);
        }
    }

    /// Number of boxes currently held by this link (0 or 1).
    pub fn boxes_in_flight(&self) -> u64 {
        self.in_flight.is_some() as u64
    }

    fn try_deliver(&mut self, ports: &mut SlotMap<PortId, Port>, now: Ticks) {
        let due = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.ready_at <= now);
        if !due {
            return;
        }
        if let Some(dst) = ports.get_mut(self.to) {
            if dst.is_empty() {
                if let Some(flight) = self.in_flight.take() {
                    dst.set_occupancy(Some(flight.item));
                }
            }
        }
    }
}
