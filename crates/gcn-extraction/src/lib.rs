mod gemini;
pub mod invoker;
pub mod normalize;
pub mod pipeline;
pub mod remote;
pub mod request;

pub use gemini::GeminiClient;
pub use invoker::Invoker;
pub use normalize::normalize;
pub use pipeline::{ExtractionPipeline, LogProgress, NoProgress, Progress, ProgressReporter};
pub use remote::RemoteHandle;
pub use request::build_request;
