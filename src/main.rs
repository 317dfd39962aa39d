use clap::Parser;
use corona::config;
use corona::engine::Engine;
use corona::sys::exec::SystemExecutor;
use corona::sys::{runtime, server};
use std::path::PathBuf;
use tokio::sync::broadcast;

const WATCH_BACKLOG: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "corona", version, about = "Pie menu daemon", long_about = None)]
struct Args {
    /// Config file to load and watch instead of the XDG default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unix socket to listen on
    #[arg(short, long)]
    socket: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => config::get_config_path()?,
    };
    let socket_path = args.socket.unwrap_or_else(server::default_socket_path);

    let config = config::load_or_setup(&config_path);
    let model = runtime::build_model(&config);
    log::info!(
        "Loaded {} top-level items from {}",
        model.roots().len(),
        config_path.display()
    );

    let executor = SystemExecutor::new(config_path.clone());
    let engine = Engine::new(model, config.appearance, executor);

    let (tx, rx) = async_channel::bounded(32);
    let (events_tx, _) = broadcast::channel(WATCH_BACKLOG);

    runtime::start_background_services(socket_path, config_path.clone(), tx, events_tx.clone());
    runtime::run_engine(engine, &config_path, rx, events_tx)?;
    Ok(())
}
