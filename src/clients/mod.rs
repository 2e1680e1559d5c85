pub mod gemini;
pub mod resilient;
pub mod traits;

pub use gemini::GeminiBackend;
pub use resilient::{ResilientClient, RetryPolicy};
pub use traits::{GenerationBackend, GenerationError, GenerationRequest};
