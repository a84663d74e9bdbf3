//! Process-wide, lazily constructed tuple store client
//!
//! The handle is passed explicitly to everything that needs the client, so
//! tests can hand in a fake. Construction runs at most once: a missing
//! configuration or a client that cannot be built settles the handle into the
//! unavailable state for the rest of the process. Only a configuration error
//! (values present but unusable) leaves the handle unset, so the next access
//! reports it again instead of silently degrading.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    client::TupleStoreClient,
    config::{FgaConfig, DEFAULT_TIMEOUT_MS},
    error::{FgaError, Result},
    openfga::OpenFgaClient,
};

pub type SharedClient = Arc<dyn TupleStoreClient>;

enum Source {
    Config(FgaConfig),
    Ready,
}

/// Memoized access to the tuple store client
pub struct FgaClientHandle {
    source: Source,
    timeout: Duration,
    cell: OnceCell<Option<SharedClient>>,
}

impl FgaClientHandle {
    /// Handle that builds an [`OpenFgaClient`] from `config` on first use
    pub fn from_config(config: FgaConfig) -> Self {
        Self {
            timeout: config.timeout(),
            source: Source::Config(config),
            cell: OnceCell::new(),
        }
    }

    /// Handle around an already constructed client
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            source: Source::Ready,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cell: OnceCell::new_with(Some(Some(client))),
        }
    }

    /// Handle that never has a client
    pub fn unavailable() -> Self {
        Self {
            source: Source::Ready,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cell: OnceCell::new_with(Some(None)),
        }
    }

    /// Override the deadline applied to remote decisions
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deadline applied to every remote decision
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The client, `None` when the process runs without one.
    ///
    /// Concurrent first callers wait for a single construction.
    pub async fn get(&self) -> Result<Option<SharedClient>> {
        let client = self
            .cell
            .get_or_try_init(|| async { self.construct() })
            .await?;
        Ok(client.clone())
    }

    fn construct(&self) -> Result<Option<SharedClient>> {
        let config = match &self.source {
            Source::Config(config) => config,
            // cells of ready handles are initialized up front
            Source::Ready => return Ok(None),
        };

        let Some(settings) = config.settings()? else {
            info!("OpenFGA credentials not configured, using fallback authorization");
            return Ok(None);
        };

        match OpenFgaClient::new(settings) {
            Ok(client) => Ok(Some(Arc::new(client) as SharedClient)),
            Err(FgaError::Configuration(message)) => Err(FgaError::Configuration(message)),
            Err(e) => {
                warn!(error = %e, "Failed to create OpenFGA client, using fallback authorization");
                Ok(None)
            }
        }
    }
}
