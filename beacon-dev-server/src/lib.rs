use anyhow::Result;
use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use beacon_core::{HeadTag, Plugin};
use log::{debug, error, info, warn};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{
    net::SocketAddr,
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Configuration for the live development server
#[derive(Debug, Clone)]
pub struct LiveServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Root directory to serve and watch
    pub root: PathBuf,
    /// Auto-open browser
    pub open: bool,
    /// Patterns to ignore when watching
    pub ignore: Vec<String>,
}

impl Default for LiveServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("."),
            open: false,
            ignore: vec![],
        }
    }
}

impl LiveServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// A live-reload static file server
pub struct LiveServer {
    config: LiveServerConfig,
}

impl LiveServer {
    /// Create a new live server with the given configuration
    pub fn new(config: LiveServerConfig) -> Self {
        Self { config }
    }

    /// Run the live server
    pub async fn run(self) -> Result<()> {
        if !self.config.root.exists() {
            return Err(anyhow::anyhow!(
                "Root directory does not exist: {}",
                self.config.root.display()
            ));
        }

        let addr = self.config.addr()?;
        let (reload_tx, _) = broadcast::channel::<String>(100);

        let state = AppState {
            reload_tx: reload_tx.clone(),
        };

        let watch_path = self.config.root.clone();
        let ignore_patterns = self.config.ignore.clone();
        tokio::spawn(async move {
            if let Err(e) = start_file_watcher(watch_path, reload_tx, ignore_patterns).await {
                error!("File watcher error: {}", e);
            }
        });

        let app = Router::new()
            .route(LIVERELOAD_PATH, get(websocket_handler))
            .fallback_service(ServeDir::new(&self.config.root))
            .with_state(state);

        info!("Serving at http://{}", addr);
        info!("Watching: {}", self.config.root.display());
        info!("Live reload enabled at ws://{}{}", addr, LIVERELOAD_PATH);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    reload_tx: broadcast::Sender<String>,
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket_connection(socket, state.reload_tx))
}

async fn websocket_connection(mut socket: WebSocket, reload_tx: broadcast::Sender<String>) {
    let mut rx = reload_tx.subscribe();

    if socket
        .send(Message::Text("connected".to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(reload_msg) => {
                        if socket.send(Message::Text(reload_msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            msg = socket.recv() => {
                if msg.is_none() {
                    break;
                }
            }
        }
    }
}

fn is_ignored(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}

async fn start_file_watcher(
    watch_path: PathBuf,
    reload_tx: broadcast::Sender<String>,
    ignore_patterns: Vec<String>,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    if !is_ignored(&event.path.to_string_lossy(), &ignore_patterns) {
                        let _ = tx.blocking_send(event.path);
                    }
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&watch_path, RecursiveMode::Recursive)?;

    debug!("File watcher started for: {}", watch_path.display());

    // At most one reload per second; rewrites from re-injection arrive in bursts
    let mut last_reload = Instant::now();
    while let Some(path) = rx.recv().await {
        debug!("File changed: {}", path.display());

        let now = Instant::now();
        if now.duration_since(last_reload) > Duration::from_millis(1000) {
            let _ = reload_tx.send("reload".to_string());
            last_reload = now;
            info!("Sent reload signal");
        } else {
            debug!("Skipping reload (too soon)");
        }
    }

    Ok(())
}

/// Contributes the live reload client to every page while serving.
#[derive(Debug, Clone)]
pub struct LiveReload {
    host: String,
    port: u16,
}

impl LiveReload {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn socket_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, LIVERELOAD_PATH)
    }
}

impl Plugin for LiveReload {
    fn name(&self) -> &str {
        "live-reload"
    }

    fn head_tags(&self) -> Vec<HeadTag> {
        let script = format!(
            r#"
(function() {{
    const socket = new WebSocket('{}');
    socket.onmessage = function(event) {{
        if (event.data === 'reload') {{
            location.reload();
        }}
    }};
    socket.onclose = function() {{
        console.log('Live reload disconnected');
    }};
}})();
"#,
            self.socket_url()
        );

        vec![HeadTag::new("script").inner_html(script)]
    }
}
