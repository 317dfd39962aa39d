use clap::{Parser, Subcommand};
use corona::events::AppEvent;
use corona::geometry::{Point, Size};
use corona::sys::protocol::Request;
use corona::sys::server;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "coronactl", version, about = "Control a running corona daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Daemon socket (defaults to $XDG_RUNTIME_DIR/corona.sock)
    #[arg(short, long, global = true)]
    socket: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open the menu, at the cursor unless a position is given
    #[command(allow_negative_numbers = true)]
    Show {
        #[arg(requires = "y")]
        x: Option<f64>,
        y: Option<f64>,
    },
    /// Report that the show animation finished
    Shown,
    /// Close the menu
    Hide,
    /// Move the pointer, in canvas coordinates
    #[command(allow_negative_numbers = true)]
    Move { x: f64, y: f64 },
    /// Select the hovered node
    Click,
    /// Go back one level, closing the menu at the root
    Back,
    /// Reload the configuration file
    Reload,
    /// Change the UI scale
    Scale { scale: f64 },
    /// Change the dead zone and ring radii
    Radii { inner: f64, outer: f64 },
    /// Change the root label
    CenterText { text: Vec<String> },
    /// Set the canvas size used for scale-to-fit
    Canvas { width: f64, height: f64 },
    /// Print engine events as JSON lines
    Watch,
}

impl Commands {
    fn into_request(self) -> Request {
        let event = match self {
            Self::Watch => return Request::Watch,
            Self::Show { x: Some(x), y: Some(y) } => AppEvent::Show(Some(Point::new(x, y))),
            Self::Show { .. } => AppEvent::Show(None),
            Self::Shown => AppEvent::Shown,
            Self::Hide => AppEvent::Hide,
            Self::Move { x, y } => AppEvent::CursorMove(Point::new(x, y)),
            Self::Click => AppEvent::Click,
            Self::Back => AppEvent::Back,
            Self::Reload => AppEvent::ConfigReload,
            Self::Scale { scale } => AppEvent::UiScale(scale),
            Self::Radii { inner, outer } => AppEvent::Radii { inner, outer },
            Self::CenterText { text } => AppEvent::CenterText(text.join(" ")),
            Self::Canvas { width, height } => AppEvent::Canvas(Size::new(width, height)),
        };
        Request::Event(event)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let socket = cli.socket.unwrap_or_else(server::default_socket_path);

    let request = cli.command.into_request();
    let mut stream = connect(&socket)?;
    log::debug!("Sending '{}'", request);
    writeln!(stream, "{}", request)?;

    if request == Request::Watch {
        watch(stream)?;
    }
    Ok(())
}

fn connect(socket: &Path) -> anyhow::Result<UnixStream> {
    UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to corona daemon at {}: {}. Is corona running?",
            socket.display(),
            e
        )
    })
}

fn watch(stream: UnixStream) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in BufReader::new(stream).lines() {
        writeln!(out, "{}", line?)?;
        out.flush()?;
    }
    Ok(())
}
