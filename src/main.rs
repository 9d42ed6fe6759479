//! Binary entrypoint for the textquest CLI.
//!
//! Commands:
//! - `start [--bind <addr>]` - run the HTTP game server
//! - `init` - write a starter `config.toml` and create the save directory
//! - `status` - print configuration and save summary
//! - `saves` - list saved games, newest first
//!
//! See the library crate docs for module-level details: `textquest::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use textquest::config::Config;
use textquest::server::GameServer;
use textquest::storage::SaveStore;

#[derive(Parser)]
#[command(name = "textquest")]
#[command(about = "A text adventure game served over HTTP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the game server
    Start {
        /// Address to listen on, overriding `[server] bind`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write a default configuration file
    Init,
    /// Show configuration and save statistics
    Status,
    /// List saved games
    Saves,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { bind } => {
            let mut config = Config::load(&cli.config).await?;
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.server.socket_addr()?;
            }
            init_logging(Some(&config), cli.verbose);
            info!("Starting textquest v{}", env!("CARGO_PKG_VERSION"));
            let server = GameServer::new(config).await?;
            server.run().await?;
        }
        Commands::Init => {
            init_logging(None, cli.verbose);
            info!("Initializing new textquest configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let cfg = Config::default();
            SaveStore::new(&cfg.storage.save_dir, cfg.storage.max_save_bytes).await?;
            info!("Save directory ready at {}", cfg.storage.save_dir);
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let server = GameServer::new(config).await?;
            server.show_status().await?;
        }
        Commands::Saves => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let store =
                SaveStore::new(&config.storage.save_dir, config.storage.max_save_bytes).await?;
            let saves = store.list().await?;
            if saves.is_empty() {
                println!("No saved games in {}", store.dir().display());
            }
            for save in saves {
                println!(
                    "{}  {}  {:<20} level {:<3} {}",
                    save.id,
                    save.saved_at.format("%Y-%m-%d %H:%M:%S"),
                    save.player_name,
                    save.level,
                    save.location
                );
            }
        }
    }

    Ok(())
}

fn init_logging(config: Option<&Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
