use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wsfl_api::AppState;
use wsfl_db::DatabaseProbe;
use wsfl_metrics::MetricsService;
use wsfl_models::Config;

/// A server running inside the test process on an ephemeral loopback port.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// Triggers graceful shutdown and waits for the server task to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await??;
        Ok(())
    }
}

pub async fn spawn_server(config: Config, probe: Arc<dyn DatabaseProbe>) -> Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let state = AppState::new(config, probe, Arc::new(MetricsService::new()?));
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(wsfl_api::serve(listener, state.clone(), async move {
        let _ = rx.await;
    }));

    Ok(TestServer {
        base_url: format!("http://{addr}"),
        state,
        shutdown: Some(tx),
        handle,
    })
}
