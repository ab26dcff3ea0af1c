use anyhow::Context;
use clap::{Parser, Subcommand};
use inkwell_kernel::settings::{DatabaseBackend, Settings};

/// Inkwell posts service
#[derive(Debug, Parser)]
#[command(name = "inkwell", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
        /// Keep posts in memory instead of MongoDB
        #[arg(long)]
        memory: bool,
    },
    /// Check that the configured database is reachable
    Ping,
    /// Print the merged OpenAPI document as JSON
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Inkwell settings")?;
    inkwell_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { port, memory } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if memory {
                settings.database.backend = DatabaseBackend::Memory;
            }
            inkwell_app::bootstrap::run(&settings, inkwell_http::shutdown_signal()).await
        }
        Command::Ping => {
            inkwell_app::bootstrap::ping(&settings).await?;
            println!("database reachable");
            Ok(())
        }
        Command::Openapi => {
            let registry = inkwell_app::bootstrap::memory_registry();
            let spec = inkwell_http::router::merged_openapi(&registry);
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(())
        }
    }
}
