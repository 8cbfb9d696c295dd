use crate::helpers::{free_port, poll_until};
use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// A `wsfl-server` process started from its built binary.
#[derive(Debug)]
pub struct TestDaemon {
    pub base_url: String,
    process: Child,
}

impl TestDaemon {
    pub async fn kill(&mut self) -> Result<()> {
        self.process.kill().await?;
        Ok(())
    }
}

/// Starts the server binary with `PORT` set to a free port plus `envs`, and
/// waits until it answers on `/`. Inherited `GUNICORN_*`, `DB_URL`, `BIND` and
/// `PORT` values are cleared first.
pub async fn spawn_daemon(binary: &Path, envs: &[(&str, &str)]) -> Result<TestDaemon> {
    let port = free_port()?;

    let mut cmd = Command::new(binary);
    for key in [
        "PORT",
        "BIND",
        "DB_URL",
        "GUNICORN_WORKERS",
        "GUNICORN_THREADS",
        "GUNICORN_TIMEOUT",
        "WSFL_CONFIG",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("PORT", port.to_string());
    cmd.env("BIND", "127.0.0.1");
    cmd.envs(envs.iter().copied());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(true);

    let process = cmd.spawn()?;
    let base_url = format!("http://127.0.0.1:{port}");

    let client = reqwest::Client::new();
    let probe_url = base_url.clone();
    poll_until("server to accept connections", Duration::from_secs(15), || {
        let client = client.clone();
        let url = probe_url.clone();
        async move { Ok(client.get(&url).send().await.is_ok()) }
    })
    .await?;

    Ok(TestDaemon { base_url, process })
}

/// Runs the binary to completion and returns its captured output.
pub async fn run_to_exit(binary: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<std::process::Output> {
    let mut cmd = Command::new(binary);
    cmd.env_remove("DB_URL");
    cmd.env_remove("WSFL_CONFIG");
    cmd.args(args);
    cmd.envs(envs.iter().copied());
    cmd.stdin(Stdio::null());

    let output = tokio::time::timeout(Duration::from_secs(30), cmd.output()).await??;
    Ok(output)
}
