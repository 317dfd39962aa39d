use crate::config::ActionKind;
use crate::menu::layout::PlacedNode;

/// Backend that carries out leaf actions. Implementations must not block on
/// the launched program; failures are theirs to surface.
pub trait Executor {
    type Error: std::error::Error;

    fn execute(&mut self, action: ActionKind, path: &str) -> Result<(), Self::Error>;
}

/// What activating a node means for the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Branch whose children are not shown yet.
    Expand,
    /// Branch that is already expanded; nothing to do.
    Ignore,
    /// Leaf with a usable action. The menu hides afterwards.
    Execute { action: ActionKind, path: String },
    /// Leaf without an action: hide only.
    Dismiss,
}

impl Dispatch {
    pub fn resolve(placed: &PlacedNode) -> Self {
        let node = &placed.node;
        match (node.is_branch(), placed.expanded) {
            (true, false) => Self::Expand,
            (true, true) => Self::Ignore,
            (false, _) if node.has_action() => Self::Execute {
                action: node.action,
                path: node.path.clone(),
            },
            (false, _) => Self::Dismiss,
        }
    }
}

/// Forwards an action to the executor. The outcome is only logged; the menu
/// tears down either way.
pub fn execute<E: Executor>(executor: &mut E, action: ActionKind, path: &str) {
    log::debug!("Executing {} '{}'", action, path);
    if let Err(e) = executor.execute(action, path) {
        log::warn!("Action {} '{}' failed: {}", action, path, e);
    }
}
