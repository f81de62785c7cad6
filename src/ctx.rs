//! Request-scoped context carrier.
//!
//! Rust has no ambient `context.Context` the way Go does, so this crate
//! threads an explicit, cheaply-cloneable [`Ctx`] handle through every call
//! that needs one. A `Ctx` is an immutable singly-linked chain: each `with_*`
//! call returns a new handle wrapping the old one, so multiple derived
//! contexts can share a common ancestor without cloning its contents.

use std::sync::Arc;

use crate::logger::Logger;

enum Node {
    NoLog(&'static str),
    Logger(Logger),
}

struct Link {
    parent: Ctx,
    node: Node,
}

/// An opaque, cheaply-cloneable context handle.
///
/// Two things can be attached to a `Ctx`: a per-sink-kind "no logging"
/// marker (consulted by `WriterConfig::writer_for_new_message`, never by
/// `LevelFilter`) and a carried [`Logger`], so a callee that only has the
/// context can still retrieve the right logger.
#[derive(Clone, Default)]
pub struct Ctx {
    link: Option<Arc<Link>>,
}

impl Ctx {
    /// The root context: no opt-outs, no carried logger.
    pub fn new() -> Self {
        Ctx { link: None }
    }

    /// Return a derived context that vetoes emission to `sink_kind`.
    pub fn with_no_log(&self, sink_kind: &'static str) -> Ctx {
        Ctx {
            link: Some(Arc::new(Link {
                parent: self.clone(),
                node: Node::NoLog(sink_kind),
            })),
        }
    }

    /// True if this context, or any ancestor, opted `sink_kind` out.
    pub fn is_logging_disabled(&self, sink_kind: &str) -> bool {
        let mut cur = self;
        loop {
            match &cur.link {
                None => return false,
                Some(link) => {
                    if let Node::NoLog(k) = &link.node {
                        if *k == sink_kind {
                            return true;
                        }
                    }
                    cur = &link.parent;
                }
            }
        }
    }

    /// Attach a [`Logger`] to this context so it can be retrieved later
    /// from a callee that only has the context.
    pub fn with_logger(&self, logger: Logger) -> Ctx {
        Ctx {
            link: Some(Arc::new(Link {
                parent: self.clone(),
                node: Node::Logger(logger),
            })),
        }
    }

    /// Retrieve the nearest carried [`Logger`], if any.
    pub fn logger(&self) -> Option<&Logger> {
        let mut cur = self;
        loop {
            match &cur.link {
                None => return None,
                Some(link) => {
                    if let Node::Logger(l) = &link.node {
                        return Some(l);
                    }
                    cur = &link.parent;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::level::Levels;

    #[test]
    fn fresh_context_has_no_opt_outs() {
        let ctx = Ctx::new();
        assert!(!ctx.is_logging_disabled("file"));
    }

    #[test]
    fn opt_out_is_scoped_to_sink_kind() {
        let ctx = Ctx::new().with_no_log("file");
        assert!(ctx.is_logging_disabled("file"));
        assert!(!ctx.is_logging_disabled("json"));
    }

    #[test]
    fn opt_out_is_inherited_by_children() {
        let parent = Ctx::new().with_no_log("file");
        let child = parent.with_no_log("json");
        assert!(child.is_logging_disabled("file"));
        assert!(child.is_logging_disabled("json"));
    }

    #[test]
    fn logger_round_trips_through_context() {
        let cfg = Arc::new(Config::new(Arc::new(Levels::new()), crate::level::LevelFilter::all(), vec![]));
        let logger = Logger::new(cfg);
        let ctx = Ctx::new().with_logger(logger.clone());
        assert!(ctx.logger().is_some());
    }
}
