use crate::config::ActionKind;
use crate::geometry::{Point, Size};
use crate::menu::{NodeId, NodeRef, PlacedNode};
use serde::Serialize;
use std::path::PathBuf;
use strum::Display as StrumDisplay;

/// Inputs delivered to the engine loop by the socket server, the config
/// watcher and the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Open at the given point, or at the cursor when none is given.
    Show(Option<Point>),
    Shown,
    Hide,
    CursorMove(Point),
    Click,
    Back,
    ConfigReload,
    UiScale(f64),
    Radii { inner: f64, outer: f64 },
    CenterText(String),
    Canvas(Size),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Hidden,
    /// Show animation running; input is already accepted.
    Showing,
    Visible,
}

/// Immutable view of a placed node for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub depth: usize,
    pub index: usize,
    pub id: NodeId,
    pub label: String,
    pub icon: Option<PathBuf>,
    pub color: String,
    pub action: ActionKind,
    pub has_children: bool,
    pub center: Point,
    pub radius: f64,
    pub angle: f64,
    pub expanded: bool,
}

impl NodeSnapshot {
    pub fn new(at: NodeRef, placed: &PlacedNode) -> Self {
        let node = &placed.node;
        Self {
            depth: at.depth,
            index: at.index,
            id: node.id.clone(),
            label: node.label.clone(),
            icon: node.icon.clone(),
            color: node.color_hex(),
            action: node.action,
            has_children: node.is_branch(),
            center: placed.center,
            radius: placed.radius,
            angle: placed.angle,
            expanded: placed.expanded,
        }
    }
}

/// Observable engine output. `NodesChanged` always carries the full level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    VisibilityChanged {
        visibility: Visibility,
    },
    RingChanged {
        center: Point,
        dead_zone_radius: f64,
        ui_scale: f64,
        particles_enabled: bool,
    },
    NodesChanged {
        depth: usize,
        nodes: Vec<NodeSnapshot>,
    },
    HoverChanged {
        node: Option<NodeSnapshot>,
    },
    DwellProgress {
        depth: usize,
        index: usize,
        id: NodeId,
        fraction: f64,
    },
    LevelPushed {
        depth: usize,
        display_name: String,
    },
    LevelPopped {
        depth: usize,
        display_name: String,
    },
    CenterLabelChanged {
        text: String,
    },
}
