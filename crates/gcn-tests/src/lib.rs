//! In-memory stand-in for the remote inference service, used by the integration suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use gcn_core::document::Document;
use gcn_core::error::{GcnError, Result};
use gcn_core::inference::{ExtractionRequest, InferenceService, RemoteReference};

/// What the fake service does for a given document name.
#[derive(Debug, Clone)]
pub enum Script {
    /// Upload succeeds and generate returns this text.
    Respond(String),
    /// Upload succeeds, generate fails with an API error.
    GenerateFails,
    /// Upload itself fails.
    UploadFails,
    /// Generate returns this text, but deleting the upload fails.
    DeleteFails(String),
}

#[derive(Default)]
pub struct FakeInferenceService {
    scripts: HashMap<String, Script>,
    next_id: AtomicUsize,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
    generates: AtomicUsize,
    live: Mutex<Vec<RemoteReference>>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<ExtractionRequest>>,
    delete_delay: Option<Duration>,
}

impl FakeInferenceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, script: Script) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    /// Every delete waits this long before it takes effect.
    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    /// Successful uploads.
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Delete calls, successful or not.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn generates(&self) -> usize {
        self.generates.load(Ordering::SeqCst)
    }

    /// References uploaded and not yet deleted.
    pub fn live_references(&self) -> Vec<RemoteReference> {
        self.live.lock().unwrap().clone()
    }

    /// Ordered log of calls, e.g. `upload:a.pdf`, `generate:files/0`, `delete:files/0`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn script_for(&self, reference: &RemoteReference) -> Option<&Script> {
        // the fake encodes the document name in the URI
        let name = reference.uri.strip_prefix("fake://")?;
        self.scripts.get(name)
    }

    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl InferenceService for FakeInferenceService {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn upload(&self, document: &Document, mime_type: &str) -> Result<RemoteReference> {
        self.log(format!("upload:{}", document.name()));

        if let Some(Script::UploadFails) = self.scripts.get(document.name()) {
            return Err(GcnError::Api {
                status: Some(400),
                message: format!("upload of {} rejected", document.name()),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let reference = RemoteReference {
            name: format!("files/{id}"),
            uri: format!("fake://{}", document.name()),
            mime_type: mime_type.to_string(),
        };
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().push(reference.clone());
        Ok(reference)
    }

    async fn generate(&self, request: &ExtractionRequest) -> Result<String> {
        self.log(format!("generate:{}", request.file.name));
        self.generates.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match self.script_for(&request.file) {
            Some(Script::Respond(text)) | Some(Script::DeleteFails(text)) => Ok(text.clone()),
            Some(Script::GenerateFails) => Err(GcnError::Api {
                status: Some(429),
                message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
            }),
            Some(Script::UploadFails) | None => Err(GcnError::Internal(format!(
                "no script for {}",
                request.file.uri
            ))),
        }
    }

    async fn delete(&self, reference: &RemoteReference) -> Result<()> {
        if let Some(delay) = self.delete_delay {
            tokio::time::sleep(delay).await;
        }
        self.log(format!("delete:{}", reference.name));
        self.deletes.fetch_add(1, Ordering::SeqCst);

        let mut live = self.live.lock().unwrap();
        let Some(pos) = live.iter().position(|r| r == reference) else {
            return Err(GcnError::api(format!("{} does not exist", reference.name)));
        };
        live.remove(pos);
        drop(live);

        if let Some(Script::DeleteFails(_)) = self.script_for(reference) {
            return Err(GcnError::api("delete rejected"));
        }
        Ok(())
    }
}

/// A well-formed model answer for a certificate owned by `owner`.
pub fn certificate_json(owner: &str, parcel: &str, total: f64, residential: f64) -> String {
    serde_json::json!({
        "Chủ sử dụng": owner,
        "Thửa đất số": parcel,
        "Tờ bản đồ": "14",
        "Diện tích tổng (m²)": total,
        "Đất ở (m²)": residential,
        "Đất trồng cây lâu năm (m²)": total - residential,
        "Đất rừng SX / Lúa (m²)": 0,
        "Số vào sổ": "CH00789",
        "Số phát hành (Seri)": "BX 112233",
        "Ngày kí": "20/11/2018",
        "Xã/Thị trấn": "Xã Phước Hưng"
    })
    .to_string()
}
