use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the process-wide tracing subscriber and panic/error report
/// hooks. Call once at startup, before anything logs.
pub fn init_tracing() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
