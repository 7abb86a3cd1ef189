use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

/// Builds the `tracing` subscriber used by the service and its tests.
///
/// Layers, from the outside in:
/// - an `EnvFilter` reading `RUST_LOG`, or `fallback_env_filter` when it is not set
/// - `JsonStorageLayer`, which stores span fields so children spans inherit them (the request id for ex)
/// - a bunyan formatting layer writing one JSON record per event into `sink`
///
/// # Arguments
/// - `name`: name of the app, written in every record
/// - `fallback_env_filter`: filter directive used if `RUST_LOG` is not set
/// - `sink`: where the records are written (`std::io::stdout`, or `std::io::sink` to silence tests)
pub fn get_tracing_subscriber<Sink>(
    name: String,
    fallback_env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_env_filter));

    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Sets `subscriber` as the global default and redirects `log` records to it.
///
/// Must only be called once per process.
pub fn init_tracing_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
