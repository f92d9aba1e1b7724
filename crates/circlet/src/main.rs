use circlet::app::App;
use circlet::config;
use circlet::menu::HostFrame;
use circlet::sys::command::Command;
use circlet::sys::runtime;
use circlet::sys::server::SOCKET_PATH;
use circlet_motion::Rect;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "circlet", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the menu daemon (the default).
    Run {
        /// Width of the host's safe area
        #[arg(long, default_value_t = 390.0)]
        width: f64,
        /// Height of the host's safe area
        #[arg(long, default_value_t = 844.0)]
        height: f64,
    },
    /// Send one command to a running daemon, e.g. `swipe left` or `tap 2`.
    Send {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Write the default configuration file if there is none yet.
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run {
        width: 390.0,
        height: 844.0,
    }) {
        Commands::Run { width, height } => run(width, height),
        Commands::Send { command } => send_command(&command.join(" ")),
        Commands::Init => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run(width: f64, height: f64) -> anyhow::Result<()> {
    let config = config::load_or_default();
    let host = HostFrame::new(Rect::new(0.0, 0.0, width, height));
    let mut app = App::new(&config, host)?;

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(tx);
    log::info!("circlet running, control socket at {}", SOCKET_PATH);

    while let Ok(event) = rx.recv_blocking() {
        app.update(event);
    }
    anyhow::bail!("Background services stopped")
}

fn send_command(line: &str) -> anyhow::Result<()> {
    let command: Command = line.parse()?;

    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to circlet daemon at {}: {}. Is circlet running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", command)?;
    Ok(())
}
