use clap::Parser;
use sparkui::{common::DEFAULT_NAMESPACE_NAME, Configuration, ResourceKey};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CommandArgs {
    #[arg(long)]
    with_config_file: String,
    /// Name of the SparkApplication whose UI should be exposed
    #[arg(long)]
    application: String,
    #[arg(long, default_value = DEFAULT_NAMESPACE_NAME)]
    namespace: String,
}

fn init_tracing_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", "sparkui.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);
    let file_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_FILE_LOG").unwrap_or_else(|_| "debug".to_owned()));
    let console_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()));

    let console_layer = fmt::layer()
        .event_format(fmt::format().compact())
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_appender)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(file_filter);

    Registry::default().with(console_layer).with(file_layer).init();
    guard
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> sparkui::Result<()> {
    let args = CommandArgs::parse();
    let configuration: Configuration = serde_yaml::from_str(&std::fs::read_to_string(args.with_config_file)?)?;
    let _guard = init_tracing_logging();

    configuration.validate()?;
    let key = ResourceKey::namespaced(&args.application, &args.namespace);
    match sparkui::expose(&configuration, &key).await {
        Ok(Some(exposure)) => {
            info!(
                "Spark UI for {key} available at {} ingress {}",
                exposure.web_ui_address().unwrap_or_default(),
                exposure.ingress.as_ref().map(|i| i.url.to_string()).unwrap_or_default()
            );
            Ok(())
        },
        Ok(None) => Ok(()),
        Err(e) => {
            warn!("Could not expose Spark UI for {key}: {e}");
            Err(e)
        },
    }
}
