use std::io;

mod cli;
use cli::{parse_cli_mode, run_agenda_mode, run_stats_mode, CliMode};
mod tui;
use tui::{check_or_setup_auth, run_tui};

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("Usage: techcal [--agenda [YYYY/MM/DD]] [--stats] [--sample]");
            return Ok(());
        }
    };

    match cli_mode {
        CliMode::AgendaDate(date) => run_agenda_mode(date).await,
        CliMode::Stats => {
            if let Err(e) = check_or_setup_auth().await {
                eprintln!("Authentication error: {}", e);
                tracing::error!("Authentication failed: {}", e);
                return Ok(());
            }
            run_stats_mode().await
        }
        CliMode::Default { sample } => {
            if !sample {
                if let Err(e) = check_or_setup_auth().await {
                    eprintln!("Authentication error: {}", e);
                    tracing::error!("Authentication failed: {}", e);
                    return Ok(());
                }
            }
            run_tui(sample).await
        }
    }
}

fn setup_logging() {
    let log_dir = dirs::config_dir()
        .map(|d| d.join("techcal"))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "techcal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("techcal started");
}
