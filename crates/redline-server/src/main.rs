//! Redline — PII redaction server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use redline_core::{RedactionConfig, RedlineConfig};
use redline_ingest::{FileType, OutputFormat};
use redline_server::{build_router, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("REDLINE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

/// Redact one file with default settings, write the redacted document to
/// the exports directory and print the outcome as JSON.
async fn redact_file(path: &Path) -> anyhow::Result<()> {
    let config = RedlineConfig::from_env(resolve_data_dir())?;
    let exports = config.data_paths.exports.clone();
    let state = AppState::new(config)?;

    let text = redline_ingest::extract(path)?;
    let outcome = state
        .redactor()
        .redact(&text, &RedactionConfig::default())
        .await?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = match FileType::from_extension(ext) {
        FileType::Pdf => OutputFormat::Pdf,
        _ => OutputFormat::Text,
    };
    let written = redline_ingest::render(&outcome.redacted, &exports, format)?;
    info!("Redacted document written to {}", written.display());

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "redact" => {
                if args.len() < 3 {
                    eprintln!("Usage: redline redact <file>");
                    std::process::exit(1);
                }
                return redact_file(Path::new(&args[2])).await;
            }
            "--help" | "-h" | "help" => {
                println!("Redline — PII detection and redaction server");
                println!();
                println!("Usage: redline [command]");
                println!();
                println!("Commands:");
                println!("  (none)                   Start the server");
                println!("  redact <file>            Redact a text or PDF file, write the redacted copy");
                println!("                           to the exports directory, print the result as JSON");
                println!("  help                     Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT                     HTTP port (default 8000)");
                println!("  REDLINE_DATA_DIR         Data directory (default ./data)");
                println!("  REDLINE_REQUIRE_ORACLE   Refuse to start without a judge provider");
                println!("  OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY, GEMINI_API_KEY");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'redline help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();

    info!("Data directory: {}", data_dir.display());

    let config = RedlineConfig::from_env(&data_dir)?;
    let port = config.port;

    // Build application state
    let state = Arc::new(AppState::new(config)?);

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Redline server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
