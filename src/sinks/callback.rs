//! The callback sink: hands each committed message to an
//! application-supplied closure as a structured record, rather than
//! serializing it to bytes.
//!
//! Deliberately not pooled. The whole point of this sink is to let the
//! caller own the message's lifetime (forward it to a test harness, a
//! metrics counter, another in-process logger), so recycling its
//! intermediate `Vec`s back into a crate-owned pool would just add
//! bookkeeping with no payoff.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::attr::{Attr, Value};
use crate::ctx::Ctx;
use crate::level::Level;
use crate::writer::{Writer, WriterConfig};

/// One fully-assembled message, handed to the callback on commit.
#[derive(Debug, Clone)]
pub struct CallbackRecord {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub level_name: String,
    pub prefix: String,
    pub text: String,
    pub attrs: Vec<Attr>,
}

pub struct CallbackWriterConfig {
    callback: Arc<dyn Fn(&CallbackRecord) + Send + Sync>,
    min_level: Option<Level>,
}

impl CallbackWriterConfig {
    pub fn new(callback: impl Fn(&CallbackRecord) + Send + Sync + 'static) -> Self {
        CallbackWriterConfig {
            callback: Arc::new(callback),
            min_level: None,
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }
}

impl WriterConfig for CallbackWriterConfig {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>> {
        if ctx.is_logging_disabled(self.sink_kind()) {
            return None;
        }
        if let Some(min) = self.min_level {
            if level < min {
                return None;
            }
        }
        Some(Box::new(CallbackWriter {
            callback: self.callback.clone(),
            record: None,
            pending_key: None,
            current_slice: None,
        }))
    }

    fn flush_underlying(&self) {}

    fn sink_kind(&self) -> &'static str {
        "callback"
    }
}

struct CallbackWriter {
    callback: Arc<dyn Fn(&CallbackRecord) + Send + Sync>,
    record: Option<CallbackRecord>,
    pending_key: Option<String>,
    current_slice: Option<(String, Vec<Value>)>,
}

impl CallbackWriter {
    fn push_value(&mut self, value: Value) {
        if let Some((_, values)) = &mut self.current_slice {
            values.push(value);
            return;
        }
        let key = self.pending_key.take().unwrap_or_default();
        if let Some(record) = &mut self.record {
            record.attrs.push(Attr::Scalar {
                key: key.into(),
                value,
            });
        }
    }
}

impl Writer for CallbackWriter {
    fn begin_message(&mut self, ts: DateTime<Utc>, level: Level, level_name: &str, prefix: &str, text: &str) {
        self.record = Some(CallbackRecord {
            ts,
            level,
            level_name: level_name.to_string(),
            prefix: prefix.to_string(),
            text: text.to_string(),
            attrs: Vec::new(),
        });
    }

    fn commit_message(self: Box<Self>) {
        if let Some(record) = self.record {
            (self.callback)(&record);
        }
    }

    fn write_key(&mut self, key: &str) {
        self.pending_key = Some(key.to_string());
    }

    fn write_slice_key(&mut self, key: &str) {
        self.current_slice = Some((key.to_string(), Vec::new()));
    }

    fn write_slice_end(&mut self) {
        if let Some((key, values)) = self.current_slice.take() {
            if let Some(record) = &mut self.record {
                record.attrs.push(Attr::Slice {
                    key: key.into(),
                    values: values.into(),
                });
            }
        }
    }

    fn write_nil(&mut self) {
        self.push_value(Value::Nil);
    }

    fn write_bool(&mut self, v: bool) {
        self.push_value(Value::Bool(v));
    }

    fn write_int(&mut self, v: i64) {
        self.push_value(Value::Int(v));
    }

    fn write_uint(&mut self, v: u64) {
        self.push_value(Value::Uint(v));
    }

    fn write_float(&mut self, v: f64) {
        self.push_value(Value::Float(v));
    }

    fn write_string(&mut self, v: &str) {
        self.push_value(Value::Str(v.into()));
    }

    fn write_time(&mut self, v: DateTime<Utc>) {
        self.push_value(Value::Time(v));
    }

    fn write_duration(&mut self, v: Duration) {
        self.push_value(Value::Duration(v));
    }

    fn write_error(&mut self, v: &str) {
        self.push_value(Value::Error(v.into()));
    }

    fn write_uuid(&mut self, v: uuid::Uuid) {
        self.push_value(Value::Uuid(v));
    }

    fn write_json(&mut self, v: &[u8]) {
        self.push_value(Value::Json(v.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc as StdArc, Mutex as StdMutex};

    #[test]
    fn callback_receives_the_assembled_record() {
        let captured: StdArc<StdMutex<Option<CallbackRecord>>> = StdArc::new(StdMutex::new(None));
        let captured2 = captured.clone();
        let config = CallbackWriterConfig::new(move |record: &CallbackRecord| {
            *captured2.lock().unwrap() = Some(record.clone());
        });
        let ctx = Ctx::new();
        let mut writer = config.writer_for_new_message(&ctx, 0).expect("active");
        writer.begin_message(Utc::now(), 0, "INFO", "svc", "hit");
        writer.write_key("n");
        writer.write_int(5);
        writer.commit_message();
        let record = captured.lock().unwrap().clone().expect("callback ran");
        assert_eq!(record.text, "hit");
        assert_eq!(record.attrs.len(), 1);
    }
}
