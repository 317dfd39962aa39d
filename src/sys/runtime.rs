use crate::config::{self, Config};
use crate::engine::Engine;
use crate::events::AppEvent;
use crate::geometry::Point;
use crate::menu::{Executor, MenuModel};
use crate::sys::icon::{self, IconName};
use crate::sys::{desktop, wm};
use async_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tokio::runtime::Runtime;
use tokio::sync::broadcast;

/// Builds the menu tree, resolving icon names against the icon theme.
pub fn build_model(config: &Config) -> MenuModel {
    MenuModel::from_config(config, |name| icon::find_icon_path(&IconName::new(name)))
}

/// Socket server and config watcher, on their own thread and runtime.
pub fn start_background_services(
    socket_path: PathBuf,
    config_path: PathBuf,
    tx: Sender<AppEvent>,
    events: broadcast::Sender<String>,
) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(socket_path, tx, events).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    config::run_async_watcher(config_path, tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

/// Drives the engine until every sender of `rx` is gone. Ticks while a dwell
/// is running and publishes engine events as JSON lines on `events`.
pub fn run_engine<E: Executor>(
    mut engine: Engine<E>,
    config_path: &Path,
    rx: Receiver<AppEvent>,
    events: broadcast::Sender<String>,
) -> std::io::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    rt.block_on(async {
        loop {
            let received = match engine.next_wakeup(Instant::now()) {
                Some(at) => tokio::select! {
                    event = rx.recv() => Some(event),
                    _ = tokio::time::sleep_until(at.into()) => None,
                },
                None => Some(rx.recv().await),
            };

            let now = Instant::now();
            match received {
                Some(Ok(event)) => handle_event(&mut engine, event, now, config_path),
                Some(Err(_)) => break,
                None => engine.tick(now),
            }
            publish(&mut engine, &events);
        }
    });

    log::info!("Event channel closed, stopping");
    Ok(())
}

fn handle_event<E: Executor>(
    engine: &mut Engine<E>,
    event: AppEvent,
    now: Instant,
    config_path: &Path,
) {
    match event {
        AppEvent::Show(Some(point)) => engine.activate(point),
        AppEvent::Show(None) => {
            let point = match wm::anchor_on_active_monitor() {
                Some(anchor) => {
                    engine.set_canvas(anchor.canvas);
                    anchor.cursor
                }
                None => {
                    log::warn!("Cursor position unavailable, opening at the canvas center");
                    let canvas = engine.canvas();
                    Point::new(canvas.width / 2.0, canvas.height / 2.0)
                }
            };
            engine.activate(point);
        }
        AppEvent::Shown => engine.shown(),
        AppEvent::Hide => engine.hide(),
        AppEvent::CursorMove(point) => engine.pointer_moved(point, now),
        AppEvent::Click => engine.click(),
        AppEvent::Back => engine.cancel(),
        AppEvent::ConfigReload => {
            if let Some(config) = reload_config(config_path) {
                desktop::refresh_cache();
                let model = build_model(&config);
                engine.reload_configuration(model, config.appearance);
            }
        }
        AppEvent::UiScale(scale) => engine.update_ui_scale(scale),
        AppEvent::Radii { inner, outer } => engine.update_radii(inner, outer),
        AppEvent::CenterText(text) => engine.update_center_text(text),
        AppEvent::Canvas(size) => engine.set_canvas(size),
    }
}

/// A broken file keeps the current menu; a deleted one falls back to setup.
fn reload_config(path: &Path) -> Option<Config> {
    if !path.exists() {
        log::info!("Config removed, switching to the setup menu");
        return Some(Config::setup());
    }
    match config::load_config(path) {
        Ok(config) => {
            log::info!("Reloaded {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::error!("Failed to reload {}: {}", path.display(), e);
            None
        }
    }
}

fn publish<E: Executor>(engine: &mut Engine<E>, events: &broadcast::Sender<String>) {
    for event in engine.drain_events() {
        match serde_json::to_string(&event) {
            // no watchers is not an error
            Ok(line) => {
                let _ = events.send(line);
            }
            Err(e) => log::warn!("Failed to encode {:?}: {}", event, e),
        }
    }
}
