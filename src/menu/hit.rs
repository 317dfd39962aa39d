use crate::geometry::Point;
use crate::menu::HIT_PADDING;
use crate::menu::layout::PlacedNode;
use crate::menu::stack::NavigationStack;
use serde::Serialize;

/// Position of a placed node inside the navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub depth: usize,
    pub index: usize,
}

impl NodeRef {
    pub fn new(depth: usize, index: usize) -> Self {
        Self { depth, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    DeadZone,
    Node(NodeRef),
    Miss,
}

/// Maps pointer positions to nodes. The dead zone is always centered on the
/// root activation point, whatever the stack depth.
#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    pub root_center: Point,
    pub dead_zone_radius: f64,
}

impl HitTester {
    pub fn new(root_center: Point, dead_zone_radius: f64) -> Self {
        Self {
            root_center,
            dead_zone_radius,
        }
    }

    pub fn in_dead_zone(&self, pointer: Point) -> bool {
        pointer.distance(self.root_center) < self.dead_zone_radius
    }

    /// Scans the top level first, then the still-visible ancestors. First
    /// match wins; there is no outer cutoff.
    pub fn resolve(&self, pointer: Point, stack: &NavigationStack) -> Hit {
        if self.in_dead_zone(pointer) {
            return Hit::DeadZone;
        }

        stack
            .levels()
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, level)| {
                Self::first_hit(pointer, &level.placed).map(|index| NodeRef::new(depth, index))
            })
            .map_or(Hit::Miss, Hit::Node)
    }

    fn first_hit(pointer: Point, nodes: &[PlacedNode]) -> Option<usize> {
        nodes.iter().position(|n| n.contains(pointer, HIT_PADDING))
    }
}
