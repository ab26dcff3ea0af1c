use anyhow::Context;
use inkwell_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Inkwell settings")?;
    inkwell_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        db = %inkwell_db::redact_uri(&settings.database.uri),
        "inkwell-app bootstrap starting"
    );

    inkwell_app::bootstrap::run(&settings, inkwell_http::shutdown_signal()).await
}
