//! End-to-end check that `LevelFilter` actually gates whether a message
//! reaches a sink, using the built-in JSON sink as the observable side
//! effect. Filtering happens once, before any writer is consulted.

use std::sync::{Arc, Mutex};

use signalstack::{Config, Ctx, JsonWriterConfig, LevelFilter, Levels, Logger};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn logger_with(filter: LevelFilter, dest: SharedBuf) -> Logger {
    let levels = Arc::new(Levels::new());
    let writer = Arc::new(JsonWriterConfig::new(dest));
    let cfg = Arc::new(Config::new(levels, filter, vec![writer]));
    Logger::new(cfg)
}

#[test]
fn messages_below_the_threshold_never_reach_the_sink() {
    let dest = SharedBuf::default();
    let logger = logger_with(LevelFilter::filter_out_below(0), dest.clone());
    let ctx = Ctx::new();

    logger.debug(&ctx, "too quiet").log();
    assert!(dest.0.lock().unwrap().is_empty());

    logger.info(&ctx, "just right").log();
    assert!(!dest.0.lock().unwrap().is_empty());
}

#[test]
fn is_active_matches_whether_a_message_carries_writers() {
    let dest = SharedBuf::default();
    let logger = logger_with(LevelFilter::none(), dest);
    let ctx = Ctx::new();
    assert!(!logger.is_active(&ctx, 0));
    let msg = logger.info(&ctx, "nope");
    assert!(!msg.is_active());
    msg.log();
}

#[test]
fn with_level_filter_tightens_without_touching_the_parent_logger() {
    let dest = SharedBuf::default();
    let parent = logger_with(LevelFilter::all(), dest.clone());
    let quiet = parent.with_level_filter(LevelFilter::filter_out_below(8));
    let ctx = Ctx::new();

    quiet.warn(&ctx, "filtered by child").log();
    assert!(dest.0.lock().unwrap().is_empty());

    parent.warn(&ctx, "not filtered by parent").log();
    assert!(!dest.0.lock().unwrap().is_empty());
}

#[test]
fn custom_level_table_still_filters_correctly() {
    let dest = SharedBuf::default();
    let levels = Arc::new(Levels::with_custom(-10, -5, 0, 5, 10, 15, [(2, "NOTICE".to_string())]));
    let writer = Arc::new(JsonWriterConfig::new(dest.clone()));
    let cfg = Arc::new(Config::new(levels.clone(), LevelFilter::filter_out_below(5), vec![writer]));
    let logger = Logger::new(cfg);
    let ctx = Ctx::new();

    logger.new_message(&ctx, 2, "notice-level text").log();
    assert!(dest.0.lock().unwrap().is_empty());

    logger.new_message(&ctx, levels.warn(), "warn-level text").log();
    assert!(!dest.0.lock().unwrap().is_empty());
}

#[test]
fn join_filter_is_an_intersection_across_the_full_pipeline() {
    let dest = SharedBuf::default();
    let levels = Arc::new(Levels::new());
    let writer = Arc::new(JsonWriterConfig::new(dest.clone()));
    let band = LevelFilter::join([
        LevelFilter::filter_out_below(-4),
        LevelFilter::filter_out_above(4),
    ]);
    let cfg = Arc::new(Config::new(levels, band, vec![writer]));
    let logger = Logger::new(cfg);
    let ctx = Ctx::new();

    logger.trace(&ctx, "below band").log();
    assert!(dest.0.lock().unwrap().is_empty());

    logger.info(&ctx, "inside band").log();
    assert!(!dest.0.lock().unwrap().is_empty());

    dest.0.lock().unwrap().clear();
    logger.fatal(&ctx, "above band").log();
    assert!(dest.0.lock().unwrap().is_empty());
}

