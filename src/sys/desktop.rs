//! XDG desktop entry lookup used to resolve `launch` actions.

use crate::sys::wm::{ShellCommand, WindowClass};
use freedesktop_entry_parser::parse_entry;
use fs_err as fs;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopApp {
    pub name: String,
    pub class: WindowClass,
    pub exec: ShellCommand,
}

static ENTRIES: OnceLock<RwLock<Vec<DesktopApp>>> = OnceLock::new();

/// Rescans the application directories. Called on config reload so newly
/// installed applications resolve without a restart.
pub fn refresh_cache() {
    let apps = scan_entries();
    log::debug!("Indexed {} desktop entries", apps.len());
    let lock = ENTRIES.get_or_init(|| RwLock::new(Vec::new()));
    *lock.write() = apps;
}

fn desktop_directories() -> Vec<PathBuf> {
    let xdg = xdg::BaseDirectories::new();
    let mut dirs = Vec::new();

    if let Some(home) = xdg.get_data_home() {
        dirs.push(home.join("applications"));
    }
    dirs.extend(
        xdg.get_data_dirs()
            .into_iter()
            .map(|p| p.join("applications")),
    );
    dirs
}

/// Files earlier in the search path shadow same-named files later on.
fn collect_desktop_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut entries = HashMap::new();

    for dir in dirs.iter().rev() {
        let Ok(read_dir) = fs::read_dir(dir) else {
            continue;
        };
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("desktop")
                && let Some(id) = path.file_name().and_then(|s| s.to_str())
            {
                entries.insert(id.to_string(), path);
            }
        }
    }
    entries.into_values().collect()
}

fn scan_entries() -> Vec<DesktopApp> {
    collect_desktop_files(&desktop_directories())
        .into_iter()
        .filter_map(|path| parse_desktop_file(&path))
        .collect()
}

pub fn parse_desktop_file(path: &Path) -> Option<DesktopApp> {
    let entry = parse_entry(path).ok()?;
    let section = entry.section("Desktop Entry")?;

    if section.attr("Type").first()? != "Application" {
        return None;
    }
    if section
        .attr("NoDisplay")
        .first()
        .is_some_and(|v| v == "true")
    {
        return None;
    }

    let name = section.attr("Name").first()?.to_string();
    let exec = strip_field_codes(section.attr("Exec").first()?);

    let id = path.file_name()?.to_str()?;
    let class = section
        .attr("StartupWMClass")
        .first()
        .cloned()
        .unwrap_or_else(|| id.trim_end_matches(".desktop").to_string());

    Some(DesktopApp {
        name,
        class: WindowClass::new(class),
        exec: ShellCommand::new(exec),
    })
}

/// Drops `%f`, `%U` and friends; launches never pass files.
fn strip_field_codes(exec: &str) -> String {
    shell_words::split(exec)
        .map(|args| {
            let clean: Vec<_> = args
                .into_iter()
                .filter(|arg| !arg.starts_with('%'))
                .collect();
            shell_words::join(clean)
        })
        .unwrap_or_else(|_| exec.to_string())
}

pub fn find_entry(query: &str) -> Option<DesktopApp> {
    let lock = ENTRIES.get_or_init(|| RwLock::new(scan_entries()));
    find_entry_in_list(query, &lock.read())
}

/// Case-insensitive match on the display name or the window class.
pub fn find_entry_in_list(query: &str, entries: &[DesktopApp]) -> Option<DesktopApp> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .find(|app| app.name.to_lowercase() == query || app.class.to_lowercase() == query)
        .cloned()
}
