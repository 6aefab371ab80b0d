//! Gridline Console - a terminal admin console over the grid engine.
//!
//! Loads a dataset of records from JSON, reads commands from stdin and prints
//! the current page after each one. Type `help` for the command list.

mod command;
mod config;
mod error;
mod render;
mod session;

use crate::command::Command;
use crate::config::Config;
use crate::error::ConsoleError;
use crate::session::{Flow, Session};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing on stderr so stdout stays the table
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridline_console=info,gridline_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(ConsoleError::from)?;

    let mut session = Session::load(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", session.show())?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let result = line
            .parse::<Command>()
            .and_then(|command| session.execute(command));

        match result {
            Ok(Flow::Continue(output)) => write!(out, "{}", output)?,
            Ok(Flow::Quit) => break,
            Err(e) => {
                tracing::debug!(error = %e, line = %line, "command failed");
                writeln!(out, "error: {}", e)?;
            }
        }
        out.flush()?;
    }

    tracing::info!(
        records = session.records().len(),
        selected = session.grid().selected().len(),
        "session ended"
    );
    Ok(())
}
