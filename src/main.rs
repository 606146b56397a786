use anyhow::Context;
use libris_app::App;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        snapshot = ?settings.storage.snapshot_path,
        "libris-app bootstrap starting"
    );

    let app = App::bootstrap(settings).await?;

    tracing::info!(modules = app.registry().len(), "libris-app bootstrap complete");
    app.run().await
}
