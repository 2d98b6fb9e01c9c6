use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod controller;
mod domain;
mod entities;
mod inputter;
mod model;
mod store;
mod table;
mod ui;

use controller::Controller;
use domain::{OpsConfig, OpsError, Role};
use model::{Model, Status};
use store::Store;
use ui::UI;

#[derive(Parser, Debug)]
#[command(version, about = "A tui based business operations console")]
struct Cli {
    /// Directory holding the per entity JSON record files
    #[arg(default_value = "tests/fixtures")]
    data_dir: String,

    /// Role to run the console as
    #[arg(long, value_enum, default_value_t = Role::Admin)]
    role: Role,

    /// Write logs to this file (logging is off without it)
    #[arg(long)]
    log_file: Option<String>,

    /// Log verbosity, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// Logging goes to a file, the terminal belongs to the UI.
fn init_logging(cli: &Cli) -> Result<(), OpsError> {
    let Some(log_file) = &cli.log_file else {
        return Ok(());
    };
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file = Arc::new(File::create(log_file)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
        Ok(()) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), OpsError> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    info!("Starting opsview as {}", cli.role.as_str());

    let config = OpsConfig::default().data_dir(cli.data_dir);
    let store = Store::load(&config.data_dir)?;
    let mut model = Model::init(store, &config, cli.role)?;
    let controller = Controller::new(&config);
    let mut ui = UI::new();

    let mut terminal = ratatui::init();
    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}
