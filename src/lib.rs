//! # signalstack: allocation-minimal structured logging core
//!
//! A leveled, structured logging core built around three ideas:
//!
//! - Levels are small signed integers, not a fixed enum, so a caller can
//!   register levels between or outside the conventional six anchors.
//! - Every `.log()` call runs through a fluent [`message::Message`] builder
//!   that writes straight to each sink's [`writer::Writer`]. Nothing is
//!   collected into an intermediate map unless the caller explicitly asks
//!   for that via [`logger::Logger::with`].
//! - A disabled level costs one filter check and nothing else: an inactive
//!   message simply carries an empty writer list, so every fluent method
//!   degenerates to a no-op loop over nothing rather than needing a
//!   separate sentinel type.
//!
//! ## Architecture
//!
//! - [`level`]: `Level`, `Levels`, `LevelFilter`
//! - [`ctx`]: the explicit context-carrier (`Ctx`) standing in for Go's
//!   ambient `context.Context`
//! - [`config`]: `Config`, `ConfigSource`, `DerivedConfig`, `MultiWriterConfig`
//! - [`logger`]: `Logger`, the per-process/per-component facade
//! - [`message`]: the fluent per-emission builder
//! - [`attr`]: the `Value`/`Attr` attribute vocabulary
//! - [`writer`]: the `WriterConfig`/`Writer` sink interface
//! - [`sinks`]: the built-in `text`, `json`, and `callback` sinks
//! - [`pool`]: the generic object pool backing the pooled sinks
//! - [`color`]/[`format`]: text-sink rendering knobs
//! - [`diag`]: the process-level error hook and self-observability channel
//! - [`error`]: construction/validation error taxonomy
//! - [`env`]: environment-variable configuration helpers

pub mod attr;
pub mod color;
pub mod config;
pub mod ctx;
pub mod diag;
pub mod env;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod message;
pub mod pool;
pub mod sinks;
pub mod writer;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;

pub use attr::{Attr, Value};
pub use color::{AnsiColorizer, ColorKind, Colorizer, LevelColor, NoColor};
pub use config::{Config, ConfigSource, DerivedConfig, MultiWriterConfig, StaticConfig};
pub use ctx::Ctx;
pub use error::{LogError, Result};
pub use format::{Format, PrefixJoin};
pub use level::{Level, LevelFilter, Levels};
pub use logger::Logger;
pub use message::Message;
pub use sinks::{CallbackRecord, CallbackWriterConfig, JsonWriterConfig, TextWriterConfig};
pub use writer::{Writer, WriterConfig};
