//! logfeed - Entry Point

use clap::Parser;
use logfeed::console::Console;
use logfeed::state::{FileStore, MemoryStore, PreferenceStore};
use logfeed::stream::HttpTransport;
use logfeed::view::ColorConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// logfeed - live log console for a device dashboard
#[derive(Parser, Debug)]
#[command(name = "logfeed")]
#[command(version)]
#[command(about = "Tail a dashboard's live log feed in the terminal")]
pub struct Args {
    /// Dashboard base URL (e.g. http://bjorn.local:8000)
    pub url: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start streaming immediately, without asking the dashboard
    #[arg(long, conflicts_with = "no_autostart")]
    pub autostart: bool,

    /// Do not start streaming on launch, without asking the dashboard
    #[arg(long)]
    pub no_autostart: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Console font size to apply and remember (8-24)
    #[arg(long, value_parser = clap::value_parser!(i32).range(8..=24))]
    pub font_size: Option<i32>,
}

impl Args {
    /// Autostart override from the flags; `None` defers to config and dashboard.
    pub fn autostart_override(&self) -> Option<bool> {
        match (self.autostart, self.no_autostart) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = logfeed::config::loader::load_config_with_precedence(args.config.clone())?;
        let merged = logfeed::config::loader::merge_config(config_file);
        let with_env = logfeed::config::loader::apply_env_overrides(merged);
        logfeed::config::loader::apply_cli_overrides(
            with_env,
            args.url.clone(),
            args.autostart_override(),
        )
    };

    logfeed::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let transport = HttpTransport::new(&config.base_url)?;
    let settings = config.console_settings();
    let colors = ColorConfig::from_env_and_args(args.no_color);

    match config.preferences_path.clone().or_else(FileStore::default_path) {
        Some(path) => {
            let console = Console::new(transport, FileStore::new(path), settings);
            run(console, &args, config.autostart, colors)
        }
        None => {
            warn!("No data directory, font size will not persist");
            let console = Console::new(transport, MemoryStore::new(), settings);
            run(console, &args, config.autostart, colors)
        }
    }
}

fn run<S: PreferenceStore>(
    mut console: Console<HttpTransport, S>,
    args: &Args,
    autostart: Option<bool>,
    colors: ColorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(px) = args.font_size {
        console.set_font(px);
    }
    console.init_autostart(autostart, Instant::now());

    logfeed::view::run_console(console, colors)?;
    Ok(())
}
