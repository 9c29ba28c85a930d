//! OpenTelemetry and `tracing` bootstrap
//!
//! The client library itself only emits `tracing` events and, when asked,
//! OpenTelemetry metrics. Installing a subscriber and exporters is the
//! host application's decision; [`init_observability`] is a ready-made way
//! to do it.
//!
//! ```rust,no_run
//! use filmtied_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("catalog-importer")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("filmtied_client=debug,info");
//!
//!     filmtied_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... use the client ...
//!
//!     filmtied_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log filter directives

use opentelemetry::{global, KeyValue};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Metric export interval
const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Observability configuration
///
/// Defaults: service name `"filmtied"`, the crate version, the OTLP
/// endpoint from `OTEL_EXPORTER_OTLP_ENDPOINT` (or `http://localhost:4317`),
/// all pillars enabled, and the log level from `RUST_LOG` (or `"info"`).
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to spans and metrics
    pub service_name: String,
    /// Service version attached to spans and metrics
    pub service_version: String,
    /// OTLP gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Export spans to the collector
    pub enable_traces: bool,
    /// Export metrics to the collector
    pub enable_metrics: bool,
    /// Emit structured JSON logs
    pub enable_logs: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "filmtied".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Default configuration under a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Install the global tracer provider, meter provider and `tracing` subscriber
///
/// Call once at startup. A second call fails because the global subscriber
/// is already set.
///
/// # Errors
///
/// Fails if an exporter cannot be built, the log filter is invalid, or a
/// global subscriber is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), BoxError> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "OpenTelemetry initialized"
    );

    Ok(())
}

fn init_tracer(config: &ObservabilityConfig) -> Result<opentelemetry_sdk::trace::Tracer, BoxError> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The subscriber layer needs the tracer before the provider goes global
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

fn init_metrics(config: &ObservabilityConfig) -> Result<(), BoxError> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(METRICS_EXPORT_INTERVAL)
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), BoxError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });
    let telemetry_layer = tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t));

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush telemetry before exit
///
/// SDK providers flush when dropped; this only marks the shutdown in the logs.
pub fn shutdown_observability() {
    tracing::info!("Shutting down OpenTelemetry");
}
