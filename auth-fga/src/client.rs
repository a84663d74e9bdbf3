use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{error::FgaError, models::Tuple};

/// Interface to the external relationship-tuple service
#[async_trait]
pub trait TupleStoreClient: Send + Sync {
    /// Ask whether `tuple.subject` has `tuple.relation` on `tuple.object`
    async fn check(&self, tuple: &Tuple) -> Result<bool, FgaError>;

    /// Write a single tuple.
    ///
    /// A duplicate must be reported as [`FgaError::TupleAlreadyExists`].
    async fn write_tuple(&self, tuple: &Tuple) -> Result<(), FgaError>;

    /// Delete a single tuple.
    ///
    /// An absent tuple must be reported as [`FgaError::TupleNotFound`].
    async fn delete_tuple(&self, tuple: &Tuple) -> Result<(), FgaError>;

    /// List authorization model ids of the store
    async fn read_authorization_models(&self) -> Result<Vec<String>, FgaError>;

    /// Write each tuple independently, in order.
    ///
    /// Never aborts: a failed tuple is counted and the next one is attempted.
    async fn write_tuples(&self, tuples: &[Tuple]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for tuple in tuples {
            let outcome = match self.write_tuple(tuple).await {
                Ok(()) => TupleOutcome::Written,
                Err(FgaError::TupleAlreadyExists(_)) => {
                    debug!(tuple = %tuple, "Tuple already exists");
                    TupleOutcome::AlreadyExists
                }
                Err(e) => {
                    warn!(
                        tuple = %tuple,
                        error = %e,
                        error_kind = e.kind(),
                        "Failed to write tuple"
                    );
                    TupleOutcome::Failed
                }
            };
            summary.record(tuple.clone(), outcome);
        }
        summary
    }

    /// Delete each tuple independently, in order. Missing tuples are tolerated.
    async fn delete_tuples(&self, tuples: &[Tuple]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for tuple in tuples {
            let outcome = match self.delete_tuple(tuple).await {
                Ok(()) => TupleOutcome::Deleted,
                Err(FgaError::TupleNotFound(_)) => {
                    debug!(tuple = %tuple, "Tuple to delete was already absent");
                    TupleOutcome::Missing
                }
                Err(e) => {
                    warn!(
                        tuple = %tuple,
                        error = %e,
                        error_kind = e.kind(),
                        "Failed to delete tuple"
                    );
                    TupleOutcome::Failed
                }
            };
            summary.record(tuple.clone(), outcome);
        }
        summary
    }

    /// Lightweight reachability check used for startup diagnostics
    async fn probe_connectivity(&self) -> bool {
        match self.read_authorization_models().await {
            Ok(models) => {
                debug!(models = models.len(), "Authorization service reachable");
                true
            }
            Err(e) => {
                warn!(error = %e, "Authorization service connectivity probe failed");
                false
            }
        }
    }
}

/// Outcome of a single tuple in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleOutcome {
    Written,
    AlreadyExists,
    Deleted,
    Missing,
    Failed,
}

/// Per-tuple outcomes of a best-effort batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub outcomes: Vec<(Tuple, TupleOutcome)>,
}

impl BatchSummary {
    fn record(&mut self, tuple: Tuple, outcome: TupleOutcome) {
        self.outcomes.push((tuple, outcome));
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn count(&self, outcome: TupleOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// Tuples that were written or deleted by this batch
    pub fn succeeded(&self) -> usize {
        self.count(TupleOutcome::Written) + self.count(TupleOutcome::Deleted)
    }

    /// Tuples that needed no change (duplicate write, absent delete)
    pub fn skipped(&self) -> usize {
        self.count(TupleOutcome::AlreadyExists) + self.count(TupleOutcome::Missing)
    }

    pub fn failed(&self) -> usize {
        self.count(TupleOutcome::Failed)
    }
}
