use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use gcn_core::document::Document;
use gcn_core::error::Result;
use gcn_core::inference::InferenceService;
use gcn_core::record::LandTitleRecord;
use gcn_core::report::{BatchReport, DocumentFailure};
use gcn_core::schema::{FieldSchema, FIELD_SCHEMA};

use crate::invoker::Invoker;
use crate::normalize::normalize;
use crate::remote::RemoteHandle;
use crate::request::build_request;

/// One unit of batch progress, emitted after each document finishes either way.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub source_name: &'a str,
    pub succeeded: bool,
}

impl Progress<'_> {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn document_finished(&self, progress: Progress<'_>);
}

impl<F> ProgressReporter for F
where
    F: Fn(Progress<'_>) + Send + Sync,
{
    fn document_finished(&self, progress: Progress<'_>) {
        self(progress)
    }
}

pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn document_finished(&self, _progress: Progress<'_>) {}
}

/// Reports progress through the log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn document_finished(&self, progress: Progress<'_>) {
        info!(
            completed = progress.completed,
            total = progress.total,
            source = %progress.source_name,
            succeeded = progress.succeeded,
            "Batch progress"
        );
    }
}

/// Drives certificates through upload, request, invoke, normalize and release.
pub struct ExtractionPipeline {
    service: Arc<dyn InferenceService>,
    invoker: Invoker,
    schema: &'static FieldSchema,
}

impl ExtractionPipeline {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self {
            invoker: Invoker::new(service.clone()),
            service,
            schema: &FIELD_SCHEMA,
        }
    }

    pub fn model(&self) -> &str {
        self.service.model()
    }

    /// Runs one document through the pipeline.
    ///
    /// Once the upload succeeds the remote copy is released exactly once, after the
    /// remaining stages have finished, whatever their outcome.
    pub async fn extract(&self, document: &Document) -> Result<LandTitleRecord> {
        let kind = document.kind()?;

        info!(
            source = %document.name(),
            bytes = document.len(),
            "Starting extraction for document"
        );

        let handle = RemoteHandle::acquire(self.service.clone(), document, kind).await?;
        let outcome = self.run_stages(&handle, document).await;
        handle.release().await;

        if outcome.is_ok() {
            info!(source = %document.name(), "Extraction complete");
        }
        outcome
    }

    async fn run_stages(&self, handle: &RemoteHandle, document: &Document) -> Result<LandTitleRecord> {
        let request = build_request(self.schema, handle.reference());
        let raw = self.invoker.invoke(&request, document.name()).await?;
        normalize(&raw, document.name())
    }

    /// Processes documents one at a time in input order. A failed document is recorded
    /// and skipped; it never stops the rest of the batch.
    pub async fn extract_batch(
        &self,
        documents: &[Document],
        progress: &dyn ProgressReporter,
    ) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let total = documents.len();
        info!(%batch_id, count = total, model = %self.model(), "Starting batch extraction");

        let mut report = BatchReport::default();

        for (i, document) in documents.iter().enumerate() {
            let succeeded = match self.extract(document).await {
                Ok(record) => {
                    report.records.push(record);
                    true
                }
                Err(e) => {
                    error!(
                        %batch_id,
                        document_index = i,
                        source = %document.name(),
                        kind = e.kind().as_str(),
                        error = %e,
                        "Extraction failed for document in batch"
                    );
                    report.failures.push(DocumentFailure::new(document.name(), &e));
                    false
                }
            };

            progress.document_finished(Progress {
                completed: i + 1,
                total,
                source_name: document.name(),
                succeeded,
            });
        }

        if report.failures.is_empty() {
            info!(%batch_id, count = report.records.len(), "Batch extraction completed successfully");
        } else {
            warn!(
                %batch_id,
                succeeded = report.records.len(),
                failed = report.failures.len(),
                "Batch extraction completed with partial failures"
            );
        }

        report
    }
}
