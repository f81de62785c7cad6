//! Built-in sink implementations: `text`, `json`, and `callback`.
//!
//! Each module pairs a long-lived `*WriterConfig` (owns the destination and,
//! for the pooled sinks, the buffer pool) with a short-lived `*Writer` bound
//! to one in-flight message.

pub mod callback;
pub mod json;
pub mod text;

pub use callback::{CallbackRecord, CallbackWriterConfig};
pub use json::JsonWriterConfig;
pub use text::TextWriterConfig;
