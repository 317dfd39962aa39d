use derive_more::{AsRef, Deref, Display, From, Into};
use freedesktop_icons::lookup;
use std::path::{Path, PathBuf};

pub const ICON_LOOKUP_SIZE: u16 = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct IconName(String);

crate::impl_string_newtype!(IconName);

/// Resolves a theme icon name, or passes through an absolute path that exists.
pub fn find_icon_path(icon_name: &IconName) -> Option<PathBuf> {
    let name = icon_name.trim();
    if name.is_empty() {
        return None;
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    let found = lookup(name)
        .with_size(ICON_LOOKUP_SIZE)
        .with_scale(1)
        .with_cache()
        .find();
    if found.is_none() {
        log::debug!("No icon found for '{}'", name);
    }
    found
}
