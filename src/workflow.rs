//! Reverse-prompt generation over a collection of uploaded images.
//!
//! Each record moves `Idle -> Loading -> Succeeded | Failed` and may be retried
//! from either end state. The record collection lives behind one lock that is
//! never held across an oracle call, so single generations for different
//! records can overlap with each other and with a running batch.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PromptsmithError;
use crate::ingest::{ingest_files_with_report, CandidateFile, IngestReport};
use crate::model::{EncodedImage, PromptRecord, RecordView};
use crate::oracle::SharedOracle;

/// What a single generation attempt ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Succeeded,
    Failed(String),
    /// A request for this record is already outstanding; nothing was sent
    AlreadyLoading,
    /// Only returned inside a batch, for records that left `Idle` after the batch started
    NotIdle,
    NotFound,
    /// The record was removed while its request was in flight; the result was dropped
    Discarded,
}

/// Totals for one `generate_all` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub discarded: usize,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed + self.discarded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Any,
    IdleOnly,
}

#[derive(Default)]
struct RecordStore {
    order: Vec<Uuid>,
    records: HashMap<Uuid, PromptRecord>,
    // Ticket of the request each loading record is waiting on.
    in_flight: HashMap<Uuid, u64>,
    next_ticket: u64,
}

impl RecordStore {
    fn insert(&mut self, image: EncodedImage) -> bool {
        if self.records.contains_key(&image.id) {
            return false;
        }
        self.order.push(image.id);
        self.records.insert(image.id, PromptRecord::new(image));
        true
    }

    fn remove(&mut self, id: Uuid) -> bool {
        self.in_flight.remove(&id);
        if self.records.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        true
    }

    fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.order.clear();
        self.records.clear();
        self.in_flight.clear();
        removed
    }

    fn ordered(&self) -> impl Iterator<Item = &PromptRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    fn issue_ticket(&mut self, id: Uuid) -> u64 {
        self.next_ticket += 1;
        self.in_flight.insert(id, self.next_ticket);
        self.next_ticket
    }

    /// The record to write a result into, if `ticket` is still the one it waits on
    fn claim(&mut self, id: Uuid, ticket: u64) -> Option<&mut PromptRecord> {
        if self.in_flight.get(&id) != Some(&ticket) {
            return None;
        }
        self.in_flight.remove(&id);
        self.records.get_mut(&id)
    }
}

/// Clears the batch flag when a batch ends, however it ends.
struct BatchGuard<'a>(&'a AtomicBool);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the prompt records and drives the oracle for them.
///
/// Cloning is cheap and every clone shares the same records.
#[derive(Clone)]
pub struct ReversePromptWorkflow {
    oracle: SharedOracle,
    store: Arc<Mutex<RecordStore>>,
    batch_running: Arc<AtomicBool>,
}

impl ReversePromptWorkflow {
    pub fn new(oracle: SharedOracle) -> Self {
        Self {
            oracle,
            store: Arc::new(Mutex::new(RecordStore::default())),
            batch_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Append images as new `Idle` records, skipping ids already present.
    ///
    /// Returns how many were added.
    pub async fn add_images(&self, images: impl IntoIterator<Item = EncodedImage>) -> usize {
        let mut store = self.store.lock().await;
        let mut added = 0;
        for image in images {
            if store.insert(image) {
                added += 1;
            }
        }
        debug!(added, total = store.records.len(), "added images");
        added
    }

    /// Ingest candidate files and add every accepted image
    pub async fn ingest(&self, files: impl IntoIterator<Item = CandidateFile>) -> IngestReport {
        let report = ingest_files_with_report(files).await;
        self.add_images(report.images.iter().cloned()).await;
        report
    }

    /// Generate (or regenerate) the prompt for one record.
    ///
    /// A call for a record that is already loading sends nothing. Once sent,
    /// the request settles the record even if this future is dropped. Must be
    /// called from within a Tokio runtime.
    pub async fn generate(&self, id: Uuid) -> GenerationOutcome {
        self.run(id, Admission::Any).await
    }

    async fn run(&self, id: Uuid, admission: Admission) -> GenerationOutcome {
        let (ticket, base64, mime_type) = {
            let mut store = self.store.lock().await;
            let Some(record) = store.records.get_mut(&id) else {
                return GenerationOutcome::NotFound;
            };
            if record.is_loading() {
                debug!(%id, "generation already in flight");
                return GenerationOutcome::AlreadyLoading;
            }
            if admission == Admission::IdleOnly && !record.is_idle() {
                return GenerationOutcome::NotIdle;
            }

            record.start_loading();
            let base64 = record.image().base64.clone();
            let mime_type = record.image().mime_type.clone();
            (store.issue_ticket(id), base64, mime_type)
        };

        // The request runs in its own task so it still settles the record
        // when the caller stops waiting for it.
        let workflow = self.clone();
        let request =
            tokio::spawn(async move { workflow.complete(id, ticket, base64, mime_type).await });

        match request.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("generation task ended: {}", e);
                warn!(%id, error = %message, "reverse prompt task did not complete");
                let mut store = self.store.lock().await;
                match store.claim(id, ticket) {
                    Some(record) => {
                        record.fail(message.clone());
                        GenerationOutcome::Failed(message)
                    }
                    None => GenerationOutcome::Discarded,
                }
            }
        }
    }

    async fn complete(
        &self,
        id: Uuid,
        ticket: u64,
        base64: String,
        mime_type: String,
    ) -> GenerationOutcome {
        debug!(%id, %mime_type, "requesting reverse prompt");
        let result = self.oracle.describe_image(&base64, &mime_type).await;

        let mut store = self.store.lock().await;
        let Some(record) = store.claim(id, ticket) else {
            debug!(%id, "record removed while loading, dropping result");
            return GenerationOutcome::Discarded;
        };

        match result {
            Ok(prompt) => {
                record.succeed(prompt);
                GenerationOutcome::Succeeded
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%id, error = %message, "reverse prompt generation failed");
                record.fail(message.clone());
                GenerationOutcome::Failed(message)
            }
        }
    }

    /// Generate prompts for every record that is `Idle` when the batch starts.
    ///
    /// Records are processed one at a time in collection order, so at most one
    /// batch request is outstanding. Failures are recorded per record and do
    /// not stop the batch. Fails with `BatchInProgress` if a batch is running.
    pub async fn generate_all(&self) -> Result<BatchReport, PromptsmithError> {
        if self
            .batch_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PromptsmithError::BatchInProgress);
        }
        let _guard = BatchGuard(&self.batch_running);

        let mut queue: VecDeque<Uuid> = {
            let store = self.store.lock().await;
            store
                .ordered()
                .filter(|record| record.is_idle())
                .map(PromptRecord::id)
                .collect()
        };
        info!(queued = queue.len(), "starting batch generation");

        let mut report = BatchReport::default();
        while let Some(id) = queue.pop_front() {
            match self.run(id, Admission::IdleOnly).await {
                GenerationOutcome::Succeeded => report.succeeded += 1,
                GenerationOutcome::Failed(_) => report.failed += 1,
                GenerationOutcome::Discarded => report.discarded += 1,
                GenerationOutcome::AlreadyLoading
                | GenerationOutcome::NotIdle
                | GenerationOutcome::NotFound => report.skipped += 1,
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            discarded = report.discarded,
            "batch generation finished"
        );
        Ok(report)
    }

    /// Remove a record in any state. An outstanding request for it still
    /// completes, but its result is dropped.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.store.lock().await.remove(id);
        if removed {
            debug!(%id, "removed record");
        }
        removed
    }

    /// Remove every record; returns how many there were
    pub async fn clear_all(&self) -> usize {
        let removed = self.store.lock().await.clear();
        debug!(removed, "cleared all records");
        removed
    }

    /// Ordered snapshot of all records
    pub async fn records(&self) -> Vec<PromptRecord> {
        self.store.lock().await.ordered().cloned().collect()
    }

    /// Ordered snapshot in the shape the view renders
    pub async fn views(&self) -> Vec<RecordView> {
        self.store
            .lock()
            .await
            .ordered()
            .map(PromptRecord::to_view)
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<PromptRecord> {
        self.store.lock().await.records.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch_running.load(Ordering::SeqCst)
    }

    /// True if some record still has neither prompt nor error
    pub async fn has_idle(&self) -> bool {
        self.store.lock().await.ordered().any(PromptRecord::is_idle)
    }

    pub async fn any_loading(&self) -> bool {
        self.store.lock().await.ordered().any(PromptRecord::is_loading)
    }

    /// Whether a view should offer the batch trigger right now
    pub async fn can_generate_all(&self) -> bool {
        !self.is_batch_running() && !self.any_loading().await && self.has_idle().await
    }
}
