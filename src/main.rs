use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use lectern::api::ApiClient;
use lectern::audio::AudioController;
use lectern::config::AppConfig;
use lectern::ingest::{EventIngestor, WorkloadStore};
use lectern::search::{maybe_trigger_segmentation, SearchOrchestrator};
use lectern::session::{Action, EventBus, SessionStore, UiEvent};
use lectern::video::VideoController;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    tracing::info!("Lectern booting...");

    let mut config = AppConfig::load();
    if let Ok(url) = std::env::var("LECTERN_BASE_URL") {
        config.base_url = url;
    }

    let api = Arc::new(ApiClient::new(&config.base_url));
    let store = Arc::new(SessionStore::new());
    let bus = EventBus::new();
    let workloads = Arc::new(WorkloadStore::new());

    store.dispatch(Action::SetProjectLocation(config.project_location.clone()));
    store.dispatch(Action::SetFrontCamera(config.front_camera.clone()));
    store.dispatch(Action::SetBackCamera(config.back_camera.clone()));
    store.dispatch(Action::SetBoardCamera(config.board_camera.clone()));

    if !api.ping().await {
        tracing::warn!("backend at {} not responding to health checks", api.base_url());
    }

    let video = Arc::new(VideoController::new(
        Arc::clone(&store),
        Arc::clone(&api),
        bus.clone(),
    ));
    let mut audio = AudioController::new(
        Arc::clone(&store),
        Arc::clone(&api),
        bus.clone(),
        Arc::clone(&video),
    );
    let ingestor = EventIngestor::new(
        Arc::clone(&store),
        Arc::clone(&workloads),
        Arc::clone(&api),
        bus.clone(),
    );
    let search = SearchOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&api),
        bus.clone(),
        Box::new(|| tracing::info!("switching view to back camera")),
    );

    // Surface bus traffic on the console while headless.
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                UiEvent::StatusNotice { message } => tracing::warn!("notice: {}", message),
                UiEvent::TimelineHighlight { start_time, end_time, topic } => {
                    tracing::info!("highlight {:.1}s-{:.1}s: {}", start_time, end_time, topic);
                }
                UiEvent::SeekRequest { time } => tracing::info!("seek to {:.1}s", time),
                UiEvent::MonitoringUpdate { kind, .. } => {
                    tracing::debug!("monitoring frame: {:?}", kind);
                }
            }
        }
    });

    audio.bootstrap().await;

    if audio.toggle_recording().await.is_ok() {
        if let Some(session_id) = store.session_id() {
            ingestor.connect(&session_id).await;
        }
        tracing::info!("recording; press Ctrl+C to stop");
    } else {
        tracing::error!("could not start a session; running idle");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down after {}s", audio.elapsed_secs());

    if store.snapshot().is_recording {
        if let Err(e) = audio.toggle_recording().await {
            tracing::error!("stop failed: {}", e);
        }
    }
    ingestor.disconnect().await;
    workloads.stop_all();
    maybe_trigger_segmentation(&store, &api).await;

    if let Ok(query) = std::env::var("LECTERN_SEARCH") {
        search.perform_search(&query).await;
    }

    Ok(())
}
