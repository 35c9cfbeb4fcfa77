//! qtwm
//!
//! A small floating/tiling X11 window manager: borders with focus colors,
//! cascade placement of new windows, modifier + button move and resize,
//! and a grid layout recomputed whenever the set of windows changes.

mod config;
mod shared;
mod wm;
mod x11_async;

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wm::WindowManager;
use wm::display::{DisplayServer, X11Display};
use wm::events::WmEvent;
use x11_async::X11EventStream;

const USAGE: &str = "\
Usage: qtwm [OPTIONS]

Options:
  -c, --config <PATH>  Read configuration from PATH instead of ~/.config/qtwm/config.toml
  -h, --help           Print this help and exit
  -V, --version        Print the version and exit";

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "-V" | "--version" => return Ok(Invocation::Version),
            "-c" | "--config" => {
                let Some(path) = args.next() else {
                    bail!("{} requires a path", arg);
                };
                config = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => config = Some(PathBuf::from(path)),
                _ => bail!("Unknown argument: {}\n\n{}", other, USAGE),
            },
        }
    }

    Ok(Invocation::Run { config })
}

/// Process X events until the connection drops
async fn run(wm: &mut WindowManager<X11Display>, stream: &X11EventStream) -> Result<()> {
    let root = wm.display().root();

    loop {
        let batch = stream.drain()?;
        if batch.is_empty() {
            stream.wait_readable().await;
            continue;
        }

        for event in &batch {
            if let Some(event) = WmEvent::from_x11(event, root) {
                wm.handle_event(event);
            }
        }

        // Once per batch: a burst of creates or destroys costs one layout
        wm.retile_if_needed();
        wm.flush().context("Failed to flush X11 requests")?;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "qtwm=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = match parse_args(std::env::args().skip(1))? {
        Invocation::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Invocation::Version => {
            println!("qtwm {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Invocation::Run { config } => config,
    };

    info!("Starting qtwm {}", env!("CARGO_PKG_VERSION"));

    let config = match config_path {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load().context("Failed to load configuration")?,
    };

    let display = X11Display::connect()?;
    let stream = X11EventStream::new(display.connection())
        .context("Failed to initialize X11 event stream")?;

    let mut wm = WindowManager::new(display, &config);
    wm.start().context("Failed to initialize window manager")?;
    info!("Managing {} windows", wm.registry().len());

    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        result = run(&mut wm, &stream) => {
            if let Err(e) = result {
                error!("Exiting: {:#}", e);
                return Err(e);
            }
        }
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
    }

    // Leave the server without a dangling drag grab
    if let Err(e) = wm.display().ungrab_pointer().and_then(|()| wm.flush()) {
        error!("Cleanup failed: {}", e);
    }

    Ok(())
}
