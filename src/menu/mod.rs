pub mod dispatch;
pub mod dwell;
pub mod hit;
pub mod layout;
pub mod model;
pub mod stack;

pub use dispatch::{Dispatch, Executor};
pub use dwell::{DwellPoll, DwellScheduler};
pub use hit::{Hit, HitTester, NodeRef};
pub use layout::{LayoutEngine, PlacedNode};
pub use model::{MenuModel, MenuNode, NodeId};
pub use stack::{NavigationLevel, NavigationStack, Popped};

pub const ROOT_SPREAD_INSET: f64 = 30.0; // root ring sits this far inside outer_radius
pub const CHILD_SPAN_DEGREES: f64 = 120.0; // submenu fan width
pub const CHILD_DISTANCE: f64 = 140.0; // submenu distance from the parent node
pub const CANVAS_PADDING: f64 = 0.15; // per axis, for scale-to-fit
pub const MIN_FIT_SCALE: f64 = 0.3;
pub const MAX_FIT_SCALE: f64 = 1.0;
pub const HIT_PADDING: f64 = 8.0; // px around each node, not scaled
pub const START_ANGLE: f64 = -90.0; // index 0 at 12 o'clock
