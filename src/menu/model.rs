use crate::config::{ActionKind, Config, NodeConfig};
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_NODE_COLOR: Srgb<u8> = Srgb::new(0x2e, 0x33, 0x40);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct NodeId(String);

crate::impl_string_newtype!(NodeId);

#[derive(Debug, Clone, PartialEq)]
pub struct MenuNode {
    pub id: NodeId,
    pub label: String,
    pub icon: Option<PathBuf>,
    pub color: Srgb<u8>,
    pub action: ActionKind,
    pub path: String,
    pub children: Vec<Arc<MenuNode>>,
}

impl MenuNode {
    pub fn leaf(id: &str, label: &str, action: ActionKind, path: &str) -> Self {
        Self {
            id: NodeId::new(id),
            label: label.to_string(),
            icon: None,
            color: DEFAULT_NODE_COLOR,
            action,
            path: path.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(id: &str, label: &str, children: Vec<MenuNode>) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
            ..Self::leaf(id, label, ActionKind::None, "")
        }
    }

    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaves without a usable action run nothing but still close the menu.
    pub fn has_action(&self) -> bool {
        self.action != ActionKind::None && !self.path.trim().is_empty()
    }

    pub fn color_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.color.red, self.color.green, self.color.blue
        )
    }

    fn from_config(
        cfg: &NodeConfig,
        fallback_id: String,
        resolve_icon: &dyn Fn(&str) -> Option<PathBuf>,
    ) -> Self {
        let id = cfg
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(NodeId::new)
            .unwrap_or_else(|| NodeId::new(fallback_id.clone()));

        let children = cfg
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                Arc::new(Self::from_config(
                    child,
                    format!("{}.{}", fallback_id, i),
                    resolve_icon,
                ))
            })
            .collect();

        Self {
            label: cfg.label.clone(),
            icon: cfg.icon.as_deref().and_then(resolve_icon),
            color: parse_color(cfg.color.as_deref(), &id),
            action: cfg.action,
            path: cfg.path.clone(),
            children,
            id,
        }
    }
}

fn parse_color(raw: Option<&str>, id: &NodeId) -> Srgb<u8> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_NODE_COLOR;
    };
    raw.parse::<Srgb<u8>>().unwrap_or_else(|e| {
        log::warn!("Node '{}' has invalid color '{}': {}", id, raw, e);
        DEFAULT_NODE_COLOR
    })
}

/// The command tree. Read-only for the lifetime of a menu session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuModel {
    roots: Vec<Arc<MenuNode>>,
}

impl MenuModel {
    pub fn new(roots: Vec<MenuNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_config(config: &Config, resolve_icon: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let roots = config
            .items
            .iter()
            .enumerate()
            .map(|(i, cfg)| Arc::new(MenuNode::from_config(cfg, i.to_string(), &resolve_icon)))
            .collect();
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<MenuNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: &str) -> Option<&Arc<MenuNode>> {
        fn walk<'a>(nodes: &'a [Arc<MenuNode>], id: &str) -> Option<&'a Arc<MenuNode>> {
            nodes.iter().find_map(|n| {
                if n.id.as_str() == id {
                    Some(n)
                } else {
                    walk(&n.children, id)
                }
            })
        }
        walk(&self.roots, id)
    }
}
