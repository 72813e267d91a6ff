use std::sync::Arc;

use gcn_extraction::ExtractionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
}
