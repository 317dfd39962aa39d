use crate::config::Appearance;
use crate::geometry::{Point, Rect, Size};
use crate::menu::model::MenuNode;
use crate::menu::{
    CANVAS_PADDING, CHILD_DISTANCE, CHILD_SPAN_DEGREES, MAX_FIT_SCALE, MIN_FIT_SCALE,
    ROOT_SPREAD_INSET, START_ANGLE,
};
use std::sync::Arc;

/// A node with its computed position. Only lives as long as its level.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub node: Arc<MenuNode>,
    pub center: Point,
    pub radius: f64,
    /// Degrees, 0 = screen right, growing clockwise.
    pub angle: f64,
    pub expanded: bool,
}

impl PlacedNode {
    pub fn contains(&self, point: Point, padding: f64) -> bool {
        point.distance(self.center) <= self.radius + padding
    }
}

/// Pure placement of sibling sets. Holds only the appearance values and the
/// canvas size the positions depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    pub ui_scale: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub node_size: f64,
    pub canvas: Size,
}

impl LayoutEngine {
    pub fn new(appearance: &Appearance, canvas: Size) -> Self {
        Self {
            ui_scale: appearance.ui_scale,
            inner_radius: appearance.inner_radius,
            outer_radius: appearance.outer_radius,
            node_size: appearance.node_size,
            canvas,
        }
    }

    pub fn spread_radius(&self) -> f64 {
        ((self.outer_radius - ROOT_SPREAD_INSET) * self.ui_scale).max(0.0)
    }

    pub fn dead_zone_radius(&self) -> f64 {
        self.inner_radius * self.ui_scale
    }

    pub fn node_radius(&self) -> f64 {
        self.node_size * self.ui_scale / 2.0
    }

    pub fn child_distance(&self) -> f64 {
        CHILD_DISTANCE * self.ui_scale
    }

    /// Angle of root slot `index` out of `count`.
    pub fn root_angle(index: usize, count: usize) -> f64 {
        let step = 360.0 / count as f64;
        index as f64 * step + START_ANGLE
    }

    /// Fan of `count` angles centered on `parent_angle`.
    pub fn child_angles(count: usize, parent_angle: f64) -> Vec<f64> {
        let step = if count > 1 {
            CHILD_SPAN_DEGREES / (count - 1) as f64
        } else {
            0.0
        };
        let start = parent_angle - step * count.saturating_sub(1) as f64 / 2.0;
        (0..count).map(|i| start + i as f64 * step).collect()
    }

    pub fn place_root(&self, nodes: &[Arc<MenuNode>], center: Point) -> Vec<PlacedNode> {
        let spread = self.spread_radius();
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let angle = Self::root_angle(i, nodes.len());
                self.placed(node, center.polar_offset(angle, spread), angle)
            })
            .collect()
    }

    pub fn place_children(&self, nodes: &[Arc<MenuNode>], parent: &PlacedNode) -> Vec<PlacedNode> {
        let angles = Self::child_angles(nodes.len(), parent.angle);
        let distance = self.child_distance();

        let targets = angles
            .iter()
            .map(|&angle| parent.center.polar_offset(angle, distance));
        let scale = Rect::bounding(targets, self.node_radius())
            .map(|bounds| self.fit_scale(bounds.size()))
            .unwrap_or(MAX_FIT_SCALE);

        if scale < MAX_FIT_SCALE {
            log::debug!(
                "Compressing {} children of '{}' to scale {:.3}",
                nodes.len(),
                parent.node.id,
                scale
            );
        }

        nodes
            .iter()
            .zip(angles)
            .map(|(node, angle)| {
                self.placed(node, parent.center.polar_offset(angle, distance * scale), angle)
            })
            .collect()
    }

    /// Scale to apply to child distances so `required` fits the padded canvas.
    /// Always within `[MIN_FIT_SCALE, MAX_FIT_SCALE]`; an unknown canvas never shrinks.
    pub fn fit_scale(&self, required: Size) -> f64 {
        if self.canvas.is_empty() {
            return MAX_FIT_SCALE;
        }
        let available = self.canvas.shrink(CANVAS_PADDING);
        if required.width <= available.width && required.height <= available.height {
            return MAX_FIT_SCALE;
        }

        let ratio = |avail: f64, req: f64| {
            if req > 0.0 { avail / req } else { f64::INFINITY }
        };
        ratio(available.width, required.width)
            .min(ratio(available.height, required.height))
            .clamp(MIN_FIT_SCALE, MAX_FIT_SCALE)
    }

    fn placed(&self, node: &Arc<MenuNode>, center: Point, angle: f64) -> PlacedNode {
        PlacedNode {
            node: Arc::clone(node),
            center,
            radius: self.node_radius(),
            angle,
            expanded: false,
        }
    }
}
