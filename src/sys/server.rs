use crate::events::AppEvent;
use crate::sys::protocol::Request;
use async_channel::Sender;
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::broadcast::{self, error::RecvError};

const SOCKET_NAME: &str = "corona.sock";
const FALLBACK_SOCKET_PATH: &str = "/tmp/corona.sock";

pub fn default_socket_path() -> PathBuf {
    BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(|dir| dir.join(SOCKET_NAME)))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SOCKET_PATH))
}

fn bind(path: &Path) -> std::io::Result<UnixListener> {
    // a previous daemon may have left its socket behind
    if fs_err::metadata(path).is_ok() {
        let _ = fs_err::remove_file(path);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    UnixListener::bind(path)
}

/// Accepts clients on `path`. Each line becomes an [`AppEvent`] on `tx`; a
/// `watch` line turns the connection into a JSON-lines feed of `events`.
pub async fn run_server(path: PathBuf, tx: Sender<AppEvent>, events: broadcast::Sender<String>) {
    let listener = match bind(&path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    let (reader, writer) = stream.into_split();
                    handle_client(reader, writer, tx, events).await;
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_client<R, W>(
    reader: R,
    writer: W,
    tx: Sender<AppEvent>,
    events: broadcast::Sender<String>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Request>() {
            Ok(Request::Event(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Request::Watch) => {
                forward_events(writer, events.subscribe()).await;
                return;
            }
            Err(e) => log::warn!("Ignoring '{}': {}", line.trim(), e),
        }
    }
}

async fn forward_events<W: AsyncWrite + Unpin>(mut writer: W, mut rx: broadcast::Receiver<String>) {
    loop {
        let line = match rx.recv().await {
            Ok(line) => line,
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Watcher fell behind, {} events dropped", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        let sent = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        };
        if sent.await.is_err() {
            log::debug!("Watcher disconnected");
            break;
        }
    }
}
