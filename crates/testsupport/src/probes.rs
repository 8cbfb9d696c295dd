use async_trait::async_trait;
use wsfl_db::DatabaseProbe;
use wsfl_models::ServiceError;

/// Probe with a fixed answer, for exercising `/healthz` without a database.
pub struct StaticProbe {
    failure: Option<String>,
}

impl StaticProbe {
    pub fn up() -> Self {
        Self { failure: None }
    }

    pub fn down(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
        }
    }
}

#[async_trait]
impl DatabaseProbe for StaticProbe {
    async fn ping(&self) -> Result<(), ServiceError> {
        match &self.failure {
            None => Ok(()),
            Some(reason) => Err(ServiceError::DatabaseUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    fn backend(&self) -> &str {
        "static"
    }
}
