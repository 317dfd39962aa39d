use crate::geometry::Point;
use crate::menu::hit::NodeRef;
use crate::menu::layout::{LayoutEngine, PlacedNode};
use crate::menu::model::MenuNode;
use std::sync::Arc;

/// One depth of the menu: a sibling set sharing an origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationLevel {
    pub items: Vec<Arc<MenuNode>>,
    /// None only for the root level.
    pub origin: Option<Point>,
    /// Index of the expanded node in the level below.
    pub parent: Option<usize>,
    pub display_name: String,
    pub placed: Vec<PlacedNode>,
}

impl NavigationLevel {
    pub fn root(
        items: Vec<Arc<MenuNode>>,
        display_name: impl Into<String>,
        center: Point,
        layout: &LayoutEngine,
    ) -> Self {
        let placed = layout.place_root(&items, center);
        Self {
            items,
            origin: None,
            parent: None,
            display_name: display_name.into(),
            placed,
        }
    }

    fn child(parent_index: usize, parent: &PlacedNode, layout: &LayoutEngine) -> Self {
        let items = parent.node.children.clone();
        let placed = layout.place_children(&items, parent);
        Self {
            items,
            origin: Some(parent.center),
            parent: Some(parent_index),
            display_name: parent.node.label.clone(),
            placed,
        }
    }
}

#[derive(Debug)]
pub enum Popped {
    Level(NavigationLevel),
    /// Only the root was left; the caller hides the menu.
    Exhausted,
}

/// Root level at the bottom, interactive level on top. Empty only while the
/// menu is hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationStack {
    levels: Vec<NavigationLevel>,
}

impl NavigationStack {
    pub fn seed(&mut self, root: NavigationLevel) {
        self.levels.clear();
        self.levels.push(root);
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[NavigationLevel] {
        &self.levels
    }

    pub fn top(&self) -> Option<&NavigationLevel> {
        self.levels.last()
    }

    pub fn root_mut(&mut self) -> Option<&mut NavigationLevel> {
        self.levels.first_mut()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.top().map(|l| l.display_name.as_str())
    }

    pub fn get(&self, at: NodeRef) -> Option<&PlacedNode> {
        self.levels.get(at.depth)?.placed.get(at.index)
    }

    /// Expands the node at `index` of the top level. Refused for leaves and
    /// for nodes that are already expanded.
    pub fn push(&mut self, index: usize, layout: &LayoutEngine) -> Option<&NavigationLevel> {
        let top = self.levels.last_mut()?;
        let parent = top.placed.get_mut(index)?;
        if parent.expanded || !parent.node.is_branch() {
            return None;
        }
        parent.expanded = true;

        let level = NavigationLevel::child(index, parent, layout);
        self.levels.push(level);
        self.levels.last()
    }

    pub fn pop(&mut self) -> Popped {
        if self.levels.len() <= 1 {
            return Popped::Exhausted;
        }
        let Some(level) = self.levels.pop() else {
            return Popped::Exhausted;
        };

        if let Some(index) = level.parent
            && let Some(parent) = self
                .levels
                .last_mut()
                .and_then(|below| below.placed.get_mut(index))
        {
            parent.expanded = false;
        }
        Popped::Level(level)
    }

    /// Recomputes every level's positions from `root_center` upward, keeping
    /// the expanded chain intact. Levels are processed bottom-up so each
    /// child level sees its parent's final position.
    pub fn relayout(&mut self, layout: &LayoutEngine, root_center: Point) {
        for depth in 0..self.levels.len() {
            let parent = depth.checked_sub(1).and_then(|below| {
                self.levels[depth]
                    .parent
                    .and_then(|index| self.levels[below].placed.get(index))
                    .cloned()
            });
            let expanded_child = self.levels.get(depth + 1).and_then(|above| above.parent);

            let level = &mut self.levels[depth];
            level.placed = match &parent {
                Some(parent) => {
                    level.origin = Some(parent.center);
                    layout.place_children(&level.items, parent)
                }
                None => layout.place_root(&level.items, root_center),
            };
            if let Some(index) = expanded_child
                && let Some(node) = level.placed.get_mut(index)
            {
                node.expanded = true;
            }
        }
    }
}
