use {
    std::sync::Arc,
    tokio::sync::{watch, RwLock},
    txflow::{
        config::Config,
        pipeline::{PipelineConfig, PlaybackPipeline},
        poller::{run_poller, PollerConfig},
        source::{demo::DemoSource, http::HttpSource, TransactionSource},
        state::DashboardState,
        ui,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Logs go to stderr so they stay out of the alternate screen
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };
    builder.target(env_logger::Target::Stderr).init();

    log::info!("🚀 Starting txflow...");
    log::info!("📊 Configuration:");
    if config.demo {
        log::info!("   ├─ Source: demo (synthetic feed)");
    } else {
        log::info!("   ├─ Source: {}", config.api_url);
    }
    log::info!("   ├─ Poll interval: {}ms", config.poll_interval.as_millis());
    log::info!("   ├─ Batch limit: {}", config.batch_limit);
    log::info!("   └─ Request timeout: {}ms", config.request_timeout.as_millis());

    let source: Arc<dyn TransactionSource> = if config.demo {
        Arc::new(DemoSource::default())
    } else {
        Arc::new(HttpSource::new(&config.api_url, config.request_timeout)?)
    };

    let pipeline = PlaybackPipeline::new(PipelineConfig::default());
    let state = Arc::new(RwLock::new(DashboardState::new()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller_handle = tokio::spawn(run_poller(
        source,
        pipeline.clone(),
        state.clone(),
        PollerConfig::from(&config),
        shutdown_rx.clone(),
    ));

    let ui_pipeline = pipeline.clone();
    let ui_state = state.clone();
    let mut ui_handle = tokio::spawn(async move {
        if let Err(e) = ui::run_ui(ui_pipeline, ui_state, shutdown_rx).await {
            log::error!("UI error: {}", e);
        }
    });

    let ui_exited = tokio::select! {
        _ = &mut ui_handle => {
            log::info!("UI exited");
            true
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl+C");
            false
        }
    };

    // Stop fetching first so nothing new is ingested, then freeze playback
    shutdown_tx.send_replace(true);
    pipeline.stop();

    // The UI still owns the terminal; let it leave raw mode before exiting
    if !ui_exited {
        if let Err(e) = ui_handle.await {
            log::error!("❌ UI task failed: {}", e);
        }
    }
    if let Err(e) = poller_handle.await {
        log::error!("❌ Poller task failed: {}", e);
    }

    let state = state.read().await;
    log::info!(
        "✅ Shutdown complete ({} pages, {} queued, {} rejected)",
        state.pages_fetched(),
        state.queued_total(),
        state.rejected_total()
    );
    Ok(())
}
