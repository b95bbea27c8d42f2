use std::sync::Arc;
use std::time::Duration;

use relay_api::{Notifier, Record, RecordStore};

use crate::error::IngestError;
use crate::notify::notify_all;

/// Persist ⇔ the motion timestamp differs from the last stored one.
///
/// Only `movement_detected` is compared. An empty store has no prior
/// reading, so the first record is always persisted.
pub fn should_persist(candidate: &Record, last: Option<&Record>) -> bool {
    match last {
        Some(last) => last.movement_detected() != candidate.movement_detected(),
        None => true,
    }
}

/// Result of one ingest decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Saved and handed to the notifier.
    Persisted,
    /// Same motion timestamp as the last stored record.
    Duplicate,
    /// `movement_detected` is a configured sentinel value.
    Ignored,
}

/// Deduplicate → save → notify, then throttle.
pub struct Ingestor {
    store: Arc<dyn RecordStore>,
    notifier: Option<Arc<dyn Notifier>>,
    dry_run: bool,
    throttle: Duration,
    ignore_movement: Vec<String>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn RecordStore>, throttle: Duration) -> Self {
        Self {
            store,
            notifier: None,
            dry_run: false,
            throttle,
            ignore_movement: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, dry_run: bool) -> Self {
        self.notifier = Some(notifier);
        self.dry_run = dry_run;
        self
    }

    /// Sentinel `movement_detected` values that are never persisted.
    pub fn ignoring(mut self, values: Vec<String>) -> Self {
        self.ignore_movement = values;
        self
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Run the ingest decision for one freshly parsed record.
    ///
    /// Always waits `throttle` before returning, whatever the outcome,
    /// errors included. Notifier failures never surface here.
    pub async fn ingest(&self, record: Record) -> Result<Outcome, IngestError> {
        let result = self.decide(&record).await;
        tokio::time::sleep(self.throttle).await;
        result
    }

    async fn decide(&self, record: &Record) -> Result<Outcome, IngestError> {
        if self
            .ignore_movement
            .iter()
            .any(|v| v == record.movement_detected())
        {
            tracing::debug!(movement = %record.movement_detected(), "sentinel reading ignored");
            return Ok(Outcome::Ignored);
        }

        let last = self
            .store
            .latest()
            .await
            .map_err(IngestError::StoreUnavailable)?;

        if !should_persist(record, last.as_ref()) {
            tracing::debug!(movement = %record.movement_detected(), "duplicate reading");
            return Ok(Outcome::Duplicate);
        }

        self.store
            .save(record)
            .await
            .map_err(IngestError::StoreUnavailable)?;
        tracing::info!(
            location = %record.location(),
            machine = %record.machine_name(),
            movement = %record.movement_detected(),
            "reading persisted"
        );

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notify_all(notifier.as_ref(), record, self.dry_run).await {
                tracing::warn!(error = %e, "notification skipped");
            }
        }

        Ok(Outcome::Persisted)
    }
}
