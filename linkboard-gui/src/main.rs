mod app;

use std::sync::Arc;
use std::time::Duration;

use eframe::{egui, NativeOptions};
use linkboard_core::{shared_registry, ApiClient, AppConfig, Controller, Session};
use reqwest::{redirect, ClientBuilder, Url};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{AppInit, BoardApp};

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let runtime = Arc::new(Runtime::new().expect("failed to initialise Tokio runtime"));
    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .timeout(Duration::from_secs(config.api.request_timeout_seconds))
        .user_agent("Linkboard/0.1")
        .build()
        .expect("failed to build HTTP client");
    let base = Url::parse(&config.api.base_url).expect("invalid api.base_url in config");

    let registry = shared_registry(Vec::new());
    let session = Session::new(ApiClient::new(client, base), registry);
    let (event_tx, event_rx) = mpsc::channel(64);
    let controller = Controller::new(session.clone(), event_tx);

    let window = [config.ui.window_width, config.ui.window_height];
    let init = AppInit {
        runtime,
        session,
        controller,
        events: event_rx,
        config,
    };

    eframe::run_native(
        "Linkboard",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(window)
                .with_min_inner_size([600.0, 480.0]),
            ..Default::default()
        },
        Box::new(move |_cc| Box::new(BoardApp::new(init))),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
