use crate::geometry::{Point, Size};
use derive_more::{AsRef, Deref, Display, From, Into};
use hyprland::data::{Clients, CursorPosition, Monitor, Monitors};
use hyprland::dispatch::{Dispatch, DispatchType, WindowIdentifier};
use hyprland::error::HyprError;
use hyprland::prelude::*;
use hyprland::shared::Address;
use serde::{Deserialize, Serialize};
use std::process::{Child, Command, Stdio};
use std::thread;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct WindowClass(String);

crate::impl_string_newtype!(WindowClass);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct ShellCommand(String);

crate::impl_string_newtype!(ShellCommand);

#[derive(Debug, Error)]
pub enum RunOrRaiseError {
    #[error(transparent)]
    Hypr(#[from] HyprError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where to open the menu: the cursor relative to the focused monitor, and
/// that monitor's logical size as the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub cursor: Point,
    pub canvas: Size,
}

fn logical_size(monitor: &Monitor) -> Size {
    let scale = if monitor.scale > 0.0 {
        monitor.scale as f64
    } else {
        1.0
    };
    Size::new(monitor.width as f64 / scale, monitor.height as f64 / scale)
}

pub fn anchor_on_active_monitor() -> Option<Anchor> {
    let cursor = CursorPosition::get().ok()?;
    let focused = Monitors::get().ok()?.into_iter().find(|m| m.focused)?;

    let x = cursor.x as f64 - focused.x as f64;
    let y = cursor.y as f64 - focused.y as f64;

    Some(Anchor {
        cursor: Point::new(x, y),
        canvas: logical_size(&focused),
    })
}

pub fn focus_window(address: &Address) -> Result<(), HyprError> {
    Dispatch::call(DispatchType::FocusWindow(WindowIdentifier::Address(
        address.clone(),
    )))
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
enum MatchScore {
    NoMatch,
    Fuzzy,
    Component,
    Exact,
}

fn match_score(window_class: &str, target: &str) -> MatchScore {
    let class = window_class.to_ascii_lowercase();
    match class {
        ref s if s == target => MatchScore::Exact,
        ref s if s.split('.').any(|p| p == target) => MatchScore::Component,
        ref s if !s.is_empty() && (s.contains(target) || target.contains(s.as_str())) => {
            MatchScore::Fuzzy
        }
        _ => MatchScore::NoMatch,
    }
}

/// Spawns `command` through `sh -c`, detached and without stdio.
pub fn spawn_shell(command: &ShellCommand) -> std::io::Result<()> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    reap(child);
    Ok(())
}

/// Waits for `child` on its own thread so the daemon never collects zombies.
pub fn reap(mut child: Child) {
    let pid = child.id();
    let waiter = thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => log::debug!("Child {} exited with {}", pid, status),
            Err(e) => log::warn!("Failed to wait for child {}: {}", pid, e),
        });
    if let Err(e) = waiter {
        log::warn!("Cannot reap child {}: {}", pid, e);
    }
}

/// Focuses the best matching window of `class`, or runs `exec` when there is
/// none. Without a reachable Hyprland instance the command is just run.
pub fn run_or_raise(class: &WindowClass, exec: &ShellCommand) -> Result<(), RunOrRaiseError> {
    let target = class.to_ascii_lowercase();

    let clients = match Clients::get() {
        Ok(clients) => clients,
        Err(e) => {
            log::debug!("Hyprland unavailable ({}), spawning '{}'", e, exec);
            spawn_shell(exec)?;
            return Ok(());
        }
    };

    clients
        .into_iter()
        .map(|c| (match_score(&c.class, &target), c))
        .filter(|(score, _)| *score > MatchScore::NoMatch)
        .max_by_key(|(score, _)| *score)
        .map_or_else(
            || spawn_shell(exec).map_err(RunOrRaiseError::from),
            |(_, client)| {
                log::debug!("Raising '{}' for {}", client.class, class);
                focus_window(&client.address).map_err(RunOrRaiseError::from)
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_score_ordering() {
        assert_eq!(match_score("firefox", "firefox"), MatchScore::Exact);
        assert_eq!(match_score("Firefox", "firefox"), MatchScore::Exact);
        assert_eq!(
            match_score("org.gnome.Nautilus", "nautilus"),
            MatchScore::Component
        );
        assert_eq!(match_score("firefox-esr", "firefox"), MatchScore::Fuzzy);
        assert_eq!(match_score("foot", "firefox"), MatchScore::NoMatch);
        assert_eq!(match_score("", "firefox"), MatchScore::NoMatch);
        assert!(MatchScore::Exact > MatchScore::Component);
    }

    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        fs_err::read_dir("/proc")
            .unwrap()
            .flatten()
            .filter_map(|entry| fs_err::read_to_string(entry.path().join("stat")).ok())
            .filter(|stat| {
                // fields after the parenthesised command name: state, ppid, ...
                let rest = stat.rsplit_once(')').map_or("", |(_, rest)| rest);
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(me.as_str())
            })
            .count()
    }

    #[test]
    fn test_spawned_children_are_reaped() {
        for _ in 0..3 {
            spawn_shell(&ShellCommand::new("true")).unwrap();
        }

        // other tests spawn too, so wait until everything has been collected
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while zombie_children() > 0 && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(zombie_children(), 0);
    }
}
