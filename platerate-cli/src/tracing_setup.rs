//! Logging setup for the platerate binary
//!
//! Console logging via `tracing-subscriber`, with optional OTLP span export
//! when built with the `telemetry` feature.
//!
//! Usage:
//!   platerate --debug serve                     # Debug logging to console
//!   platerate --otel serve                      # Also export spans over OTLP
//!   RUST_LOG=platerate_server=trace platerate   # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (overrides the defaults below)
//!   OTEL_EXPORTER_OTLP_ENDPOINT       # OTLP endpoint (default: http://localhost:4317)
//!   OTEL_SERVICE_NAME                 # Service name (default: platerate)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,sqlx=warn";
const DEBUG_FILTER: &str = "debug,sqlx=info,hyper=info";

/// Tracing configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Lower the default level to debug (RUST_LOG still wins)
    pub debug: bool,
    /// Export spans to an OTLP collector
    pub otel: bool,
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    let fallback = if config.debug { DEBUG_FILTER } else { DEFAULT_FILTER };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Console-only subscriber
fn init_console(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Console subscriber plus OTLP span export
#[cfg(feature = "telemetry")]
fn init_with_otel(config: &TracingConfig) -> Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());
    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "platerate".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer("platerate");
    // Keep the provider alive globally; dropping it stops export
    let _ = opentelemetry::global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(config.debug)
                .compact(),
        )
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|err| anyhow!(err))?;

    tracing::info!(endpoint = %endpoint, service = %service_name, "OTLP export enabled");
    Ok(())
}

/// Flush pending spans before exit
#[cfg(feature = "telemetry")]
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown() {}

/// Install the global subscriber.
pub fn init(config: &TracingConfig) -> Result<()> {
    #[cfg(feature = "telemetry")]
    if config.otel {
        return init_with_otel(config);
    }

    #[cfg(not(feature = "telemetry"))]
    if config.otel {
        eprintln!("warning: --otel ignored, built without the `telemetry` feature");
    }

    init_console(config)
}
