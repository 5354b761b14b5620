pub mod gemini_api;
pub mod retry;
pub mod supported_models;
pub mod transport;

pub use gemini_api::{
    Content, GeminiTransport, GenerateContentRequest, GenerationConfig, NO_RESPONSE_PLACEHOLDER,
    Part,
};
pub use retry::{Attempt, RetryPolicy};
pub use transport::{GenerationTransport, TransportError};
