use std::sync::Arc;

use tracing::{error, info, warn};

use gcn_core::document::{Document, DocumentKind};
use gcn_core::error::Result;
use gcn_core::inference::{InferenceService, RemoteReference};

/// Scoped ownership of one uploaded document.
///
/// Created by [`RemoteHandle::acquire`] and consumed by [`RemoteHandle::release`], so a
/// reference can be deleted at most once. A handle dropped while still armed (a panic or a
/// cancelled future between acquire and release) schedules the delete on the current Tokio
/// runtime instead.
pub struct RemoteHandle {
    service: Arc<dyn InferenceService>,
    reference: RemoteReference,
    source_name: String,
    armed: bool,
}

impl RemoteHandle {
    pub async fn acquire(
        service: Arc<dyn InferenceService>,
        document: &Document,
        kind: DocumentKind,
    ) -> Result<Self> {
        let reference = service.upload(document, kind.mime_type()).await?;

        info!(
            source = %document.name(),
            remote = %reference.name,
            "Uploaded document to inference service"
        );

        Ok(Self {
            service,
            reference,
            source_name: document.name().to_string(),
            armed: true,
        })
    }

    pub fn reference(&self) -> &RemoteReference {
        &self.reference
    }

    /// Deletes the remote copy. A failed delete is logged and otherwise ignored so it
    /// never replaces the outcome of the extraction itself.
    ///
    /// The handle stays armed until the delete completes, so a release cancelled
    /// mid-flight falls back to the deferred delete in `Drop`.
    pub async fn release(mut self) {
        let outcome = self.service.delete(&self.reference).await;
        self.armed = false;
        match outcome {
            Ok(()) => info!(
                source = %self.source_name,
                remote = %self.reference.name,
                "Deleted document from inference service"
            ),
            Err(e) => warn!(
                source = %self.source_name,
                remote = %self.reference.name,
                error = %e,
                "Failed to delete document from inference service"
            ),
        }
    }
}

impl Drop for RemoteHandle {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let service = self.service.clone();
        let reference = self.reference.clone();
        let source = std::mem::take(&mut self.source_name);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!(
                    source = %source,
                    remote = %reference.name,
                    "Remote handle dropped without release, scheduling delete"
                );
                runtime.spawn(async move {
                    if let Err(e) = service.delete(&reference).await {
                        warn!(
                            source = %source,
                            remote = %reference.name,
                            error = %e,
                            "Deferred delete failed"
                        );
                    }
                });
            }
            Err(_) => error!(
                source = %source,
                remote = %reference.name,
                "Remote handle dropped outside a runtime, remote file not deleted"
            ),
        }
    }
}
