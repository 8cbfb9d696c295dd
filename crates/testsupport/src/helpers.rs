use anyhow::Result;
use std::net::TcpListener;
use std::time::Duration;

/// Asks the OS for a free loopback port. The port is released before
/// returning, so a racing process could still grab it.
pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Poll until a condition is met or timeout
pub async fn poll_until<F, Fut>(
    description: &str,
    timeout_duration: Duration,
    mut condition: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<bool>>,
{
    let start = std::time::Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= timeout_duration {
            anyhow::bail!("Timeout waiting for: {}", description);
        }

        if condition().await? {
            return Ok(());
        }

        tokio::time::sleep(poll_interval).await;
    }
}
