use rollcall_app::app::api::routes;
use rollcall_app::config::ConfigHandler;
use rollcall_app::store_handler::StoreHandler;
use rollcall_core::config::load_config;
use rollcall_service::store::{AttendanceStore, FileKeyValueStore, StoreOptions};
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Rollcall attendance server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = AttendanceStore::load(
        Box::new(FileKeyValueStore::new(config.storage.data_dir.clone())),
        StoreOptions::from_settings(&config),
    );

    tracing::info!(
        occurrences = store.len(),
        data_dir = %config.storage.data_dir.display(),
        "Attendance store loaded"
    );

    let bind_addr = config.server.bind_address();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(StoreHandler::new(store))
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
