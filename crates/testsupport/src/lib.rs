pub mod daemon;
pub mod helpers;
pub mod http_client;
pub mod metrics;
pub mod probes;
pub mod server;

pub use daemon::*;
pub use helpers::*;
pub use http_client::*;
pub use metrics::*;
pub use probes::*;
pub use server::*;
