use crate::config::{self, ActionKind, SETUP_COMMAND};
use crate::menu::Executor;
use crate::sys::desktop;
use crate::sys::wm::{self, RunOrRaiseError, ShellCommand, WindowClass};
use directories::BaseDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

const OPENER: &str = "xdg-open";
const CLIPBOARD: &str = "wl-copy";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Launch(#[from] RunOrRaiseError),
    #[error("Folder does not exist: {}", .0.display())]
    MissingFolder(PathBuf),
    #[error("Cannot split command line: {0}")]
    BadCommandLine(#[from] shell_words::ParseError),
    #[error("Empty command line")]
    EmptyCommandLine,
    #[error("wl-copy did not accept input")]
    Clipboard,
}

/// Runs actions on the local desktop. Every child is detached with null
/// stdio and reaped on a helper thread; nothing blocks on it.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    config_path: PathBuf,
}

impl SystemExecutor {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    fn launch(&self, query: &str) -> Result<(), ExecError> {
        let (class, exec) = match desktop::find_entry(query) {
            Some(app) => (app.class, app.exec),
            None => {
                log::debug!("No desktop entry for '{}', running it as a command", query);
                (WindowClass::new(query), ShellCommand::new(query))
            }
        };
        wm::run_or_raise(&class, &exec)?;
        Ok(())
    }

    fn open_folder(&self, path: &str) -> Result<(), ExecError> {
        let folder = expand_home(path);
        if !folder.is_dir() {
            return Err(ExecError::MissingFolder(folder));
        }
        spawn_detached(Command::new(OPENER).arg(&folder))
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), ExecError> {
        let mut child = Command::new(CLIPBOARD)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // stdin is closed before reaping; wl-copy waits for EOF
        let written = child
            .stdin
            .take()
            .ok_or(ExecError::Clipboard)
            .and_then(|mut stdin| Ok(stdin.write_all(text.as_bytes())?));
        wm::reap(child);
        written
    }

    fn run_custom(&self, line: &str) -> Result<(), ExecError> {
        if line == SETUP_COMMAND {
            let path = config::write_default_config(&self.config_path)?;
            log::info!("Wrote default config to {}", path.display());
            return spawn_detached(Command::new(OPENER).arg(&path));
        }

        let words = shell_words::split(line)?;
        let (program, args) = words.split_first().ok_or(ExecError::EmptyCommandLine)?;
        spawn_detached(Command::new(expand_home(program)).args(args))
    }
}

impl Executor for SystemExecutor {
    type Error = ExecError;

    /// Clipboard text is copied as given; every other kind is trimmed.
    fn execute(&mut self, action: ActionKind, path: &str) -> Result<(), ExecError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        match action {
            ActionKind::Launch => self.launch(trimmed),
            ActionKind::Url => spawn_detached(Command::new(OPENER).arg(trimmed)),
            ActionKind::Folder => self.open_folder(trimmed),
            ActionKind::Command => Ok(wm::spawn_shell(&ShellCommand::new(trimmed))?),
            ActionKind::Clipboard => self.copy_to_clipboard(path),
            ActionKind::Custom => self.run_custom(trimmed),
            ActionKind::None => Ok(()),
        }
    }
}

fn spawn_detached(command: &mut Command) -> Result<(), ExecError> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    wm::reap(child);
    Ok(())
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = || BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    match path.strip_prefix('~') {
        Some("") => home().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') => home()
            .map(|h| h.join(rest.trim_start_matches('/')))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => Path::new(path).to_path_buf(),
    }
}
