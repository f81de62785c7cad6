//! Internal diagnostics: the process-level error hook and an opt-in
//! self-observability channel for the crate's own faults.
//!
//! A structured logging crate can't log its own failures through its own
//! `Logger` without risking recursion (a sink failing while trying to
//! report that a sink failed). Instead, internal events are drained off a
//! channel by a background thread onto stderr (or a caller-supplied sink),
//! entirely independent of any `Config`/`Logger` the caller has built.

use crossbeam_channel::{Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A sink-level failure: I/O error or a caught serialization panic.
#[derive(Debug, Clone)]
pub struct SinkError {
    pub sink_kind: &'static str,
    pub message: String,
}

type ErrorHook = Arc<dyn Fn(&SinkError) + Send + Sync>;

static ERROR_HOOK: Lazy<RwLock<Option<ErrorHook>>> = Lazy::new(|| RwLock::new(None));

/// Install a process-level hook invoked once per sink failure. Last writer
/// wins. This is not on the hot path.
pub fn set_error_hook(hook: impl Fn(&SinkError) + Send + Sync + 'static) {
    *ERROR_HOOK.write() = Some(Arc::new(hook));
}

pub fn clear_error_hook() {
    *ERROR_HOOK.write() = None;
}

/// Route a sink failure to the installed hook, reading it exactly once to
/// avoid a torn read across a concurrent `set_error_hook`.
pub fn report_sink_error(sink_kind: &'static str, message: impl Into<String>) {
    let hook = ERROR_HOOK.read().clone();
    if let Some(hook) = hook {
        hook(&SinkError {
            sink_kind,
            message: message.into(),
        });
    }
}

/// Count of `Message`s dropped without a matching `.log()` call. A
/// detectable leak, not a recovered one. Debug-only: release builds never
/// pay for it.
static UNCOMMITTED_MESSAGES: AtomicUsize = AtomicUsize::new(0);

pub fn note_uncommitted_message() {
    if cfg!(debug_assertions) {
        UNCOMMITTED_MESSAGES.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn uncommitted_message_count() -> usize {
    UNCOMMITTED_MESSAGES.load(Ordering::Relaxed)
}

#[cfg(any(test, feature = "test-util"))]
pub fn reset_uncommitted_message_count() {
    UNCOMMITTED_MESSAGES.store(0, Ordering::Relaxed);
}

/// Internal event level for the self-observability channel below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct InternalEvent {
    pub level: InternalLevel,
    pub operation: &'static str,
    pub message: String,
}

static INTERNAL_DIAG_ENABLED: AtomicBool = AtomicBool::new(false);

struct InternalDiag {
    sender: Sender<InternalEvent>,
}

static INTERNAL_DIAG: Lazy<InternalDiag> = Lazy::new(|| {
    let (sender, receiver): (Sender<InternalEvent>, Receiver<InternalEvent>) =
        crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        for event in receiver.iter() {
            eprintln!(
                "[signalstack] [{:?}] [{}] {}",
                event.level, event.operation, event.message
            );
        }
    });
    InternalDiag { sender }
});

/// Turn on the self-observability channel. Off by default; most callers
/// never need it.
pub fn enable_internal_diagnostics() {
    INTERNAL_DIAG_ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable_internal_diagnostics() {
    INTERNAL_DIAG_ENABLED.store(false, Ordering::Relaxed);
}

/// Emit an internal event if diagnostics are enabled. A full channel (or a
/// disconnected receiver thread) silently drops the event. This channel is
/// for human troubleshooting, not a delivery guarantee.
pub fn emit_internal(level: InternalLevel, operation: &'static str, message: impl Into<String>) {
    if !INTERNAL_DIAG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let _ = INTERNAL_DIAG.sender.send(InternalEvent {
        level,
        operation,
        message: message.into(),
    });
}
