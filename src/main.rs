use anyhow::Context;

use bookswap_app::{modules, AppState};
use bookswap_kernel::settings::Settings;
use bookswap_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load BOOKSWAP settings")?;
    bookswap_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        "bookswap-app bootstrap starting"
    );

    let state = AppState::from_settings(&settings);
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, state);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookswap-app bootstrap complete");

    bookswap_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await?;

    Ok(())
}
