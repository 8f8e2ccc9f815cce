pub mod chat;
pub mod traits;

pub use chat::ChatCompletionsClient;
pub use traits::{ChatMessage, CompletionRequest, CompletionService};
