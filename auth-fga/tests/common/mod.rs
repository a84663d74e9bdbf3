//! Scripted tuple store used by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_fga::*;
use parking_lot::Mutex;

/// How the fake answers `check`
#[derive(Clone, Copy)]
pub enum CheckBehavior {
    Answer(bool),
    Network,
    Remote(u16),
    Hang(Duration),
    Internal,
}

pub struct ScriptedClient {
    behavior: CheckBehavior,
    pub check_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub checked: Mutex<Vec<Tuple>>,
    pub written: Mutex<Vec<Tuple>>,
    pub deleted: Mutex<Vec<Tuple>>,
    duplicates: HashSet<Tuple>,
    failing: HashSet<Tuple>,
}

impl ScriptedClient {
    pub fn new(behavior: CheckBehavior) -> Self {
        Self {
            behavior,
            check_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            checked: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            duplicates: HashSet::new(),
            failing: HashSet::new(),
        }
    }

    /// Writing `tuple` reports that it already exists
    pub fn with_duplicate(mut self, tuple: Tuple) -> Self {
        self.duplicates.insert(tuple);
        self
    }

    /// Writing or deleting `tuple` fails with a server error
    pub fn with_failure(mut self, tuple: Tuple) -> Self {
        self.failing.insert(tuple);
        self
    }

    pub fn checks(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn server_error() -> FgaError {
        FgaError::Remote {
            status: 500,
            code: "internal_error".to_string(),
            message: "injected".to_string(),
        }
    }
}

#[async_trait]
impl TupleStoreClient for ScriptedClient {
    async fn check(&self, tuple: &Tuple) -> Result<bool> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.checked.lock().push(tuple.clone());
        match self.behavior {
            CheckBehavior::Answer(allowed) => Ok(allowed),
            CheckBehavior::Network => Err(FgaError::Network("connection refused".to_string())),
            CheckBehavior::Remote(status) => Err(FgaError::Remote {
                status,
                code: "error".to_string(),
                message: "injected".to_string(),
            }),
            CheckBehavior::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Ok(false)
            }
            CheckBehavior::Internal => Err(FgaError::Internal(anyhow::anyhow!("injected"))),
        }
    }

    async fn write_tuple(&self, tuple: &Tuple) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.written.lock().push(tuple.clone());
        if self.duplicates.contains(tuple) {
            return Err(FgaError::TupleAlreadyExists(tuple.to_string()));
        }
        if self.failing.contains(tuple) {
            return Err(Self::server_error());
        }
        Ok(())
    }

    async fn delete_tuple(&self, tuple: &Tuple) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().push(tuple.clone());
        if self.failing.contains(tuple) {
            return Err(Self::server_error());
        }
        Ok(())
    }

    async fn read_authorization_models(&self) -> Result<Vec<String>> {
        Ok(vec!["01SCRIPTED".to_string()])
    }
}

pub fn service_with(client: Arc<ScriptedClient>) -> AuthorizationService {
    AuthorizationService::new(Arc::new(FgaClientHandle::with_client(client)))
}

pub fn lifecycle_with(client: Arc<ScriptedClient>) -> TupleLifecycleManager {
    TupleLifecycleManager::new(Arc::new(FgaClientHandle::with_client(client)))
}
