//! Crate error taxonomy.
//!
//! Two error channels exist in this crate and they are deliberately not
//! unified:
//!
//! - **Construction/validation failures** (this module) are surfaced to the
//!   caller as a `Result`.
//! - **Sink I/O and serialization failures** are best-effort and routed
//!   through [`crate::diag`]'s error hook instead. Turning them into a
//!   `Result` would force every `.log()` call to check a return value,
//!   defeating the hot-path guarantees this crate exists for.

use std::fmt;

/// Errors raised while building or validating a [`crate::config::Config`],
/// [`crate::level::Levels`], or a sink.
#[derive(Debug)]
pub enum LogError {
    /// A level name did not match any known anchor or registered alias.
    InvalidLevel(String),
    /// A `LevelFilter` was malformed (e.g. an empty `Join`).
    InvalidFilter(String),
    /// A `Config` was built with no sinks at all.
    NilSink,
    /// A `Config` was built with a null/empty `Levels` table.
    NilLevels,
    /// A pool's internal mutex was poisoned by a panicking holder.
    PoisonedPool(&'static str),
    /// The writer protocol was violated (value without a preceding key,
    /// double commit, commit without begin, …).
    BuilderMisuse(&'static str),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLevel(name) => write!(f, "invalid log level name: '{name}'"),
            LogError::InvalidFilter(reason) => write!(f, "invalid level filter: {reason}"),
            LogError::NilSink => write!(f, "config requires at least one writer config"),
            LogError::NilLevels => write!(f, "config requires a non-empty levels table"),
            LogError::PoisonedPool(name) => write!(f, "pool '{name}' mutex was poisoned"),
            LogError::BuilderMisuse(reason) => write!(f, "writer protocol violation: {reason}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Convenience alias for this crate's fallible constructors.
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_human_readable() {
        assert!(LogError::InvalidLevel("wat".into())
            .to_string()
            .contains("wat"));
        assert_eq!(LogError::NilSink.to_string(), "config requires at least one writer config");
    }
}
