//! Testing utilities to work with logs.

use adscout_settings::DirectiveWrapper;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    io::Write,
    ops::Deref,
    sync::{Arc, Mutex, Once},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

lazy_static! {
    /// Every JSON log line written by the test process.
    ///
    /// The server under test handles requests on its own worker threads, which
    /// don't inherit a test's thread-local subscriber. Logs are therefore
    /// collected by one process-wide subscriber, and each [`LogWatcher`] reads
    /// the lines written after it was created.
    static ref PROCESS_LOGS: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
}

/// Guards installing the process-wide subscriber.
static INSTALL_SUBSCRIBER: Once = Once::new();

/// Helper to collect events emitted by Tracing and later make assertions about
/// the collected events.
///
/// Tests run concurrently and share one log stream, so assertions should look
/// for something unique to the test, such as its query text.
pub struct LogWatcher {
    /// Offset into [`PROCESS_LOGS`] of the first byte not yet parsed.
    read_to: usize,

    /// Events parsed so far. Only complete lines are parsed, so a partial
    /// write is left in place until the rest of it arrives.
    events: Vec<TracingJsonEvent>,
}

impl LogWatcher {
    /// Make sure the process-wide subscriber is installed, and start watching
    /// the logs written from now on.
    ///
    /// `levels` only has an effect the first time a watcher is made.
    ///
    /// # Panics
    /// If another global subscriber was already installed.
    pub fn install(levels: &DirectiveWrapper) -> Self {
        INSTALL_SUBSCRIBER.call_once(|| {
            let env_filter: EnvFilter = levels.into();
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(|| LogWatcherWriter {
                            buf: PROCESS_LOGS.clone(),
                        }),
                )
                .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());
            tracing::subscriber::set_global_default(subscriber)
                .expect("Could not install the test log subscriber");
        });

        let read_to = PROCESS_LOGS.lock().expect("mutex was poisoned").len();
        Self {
            read_to,
            events: Vec::new(),
        }
    }

    /// Iterate over the events collected so far by this log watcher.
    pub fn events(&mut self) -> std::slice::Iter<TracingJsonEvent> {
        self.convert_events();
        self.events.iter()
    }

    /// Test if any event this logger received matches `predicate`.
    #[must_use = "LogWatcher::has does not make assertions alone, you probably want to wrap it in assert!()"]
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().any(predicate)
    }

    /// Parse every complete line written since the last call into
    /// [`TracingJsonEvent`] instances stored in `self.events`.
    fn convert_events(&mut self) {
        let buf = PROCESS_LOGS.lock().expect("mutex was poisoned");
        let unread = &buf[self.read_to..];

        // Only look up to the last newline, leaving any partial line in place.
        let complete_len = match unread.iter().rposition(|byte| *byte == b'\n') {
            Some(idx) => idx + 1,
            None => return,
        };

        let log_text = std::str::from_utf8(&unread[..complete_len]).expect("bad utf8");
        for line in log_text.lines().filter(|line| !line.trim().is_empty()) {
            let message: TracingJsonEvent = serde_json::from_str(line)
                .unwrap_or_else(|_| panic!("Bad JSON in log line: {}", line));
            self.events.push(message);
        }

        self.read_to += complete_len;
        // and the mutex unlocks when it drops at the end of the function.
    }
}

/// A helper that collects log events emitted from Tracing.
///
/// This is needed because Tracing consumes its subscribers. The data is
/// written to the process-wide buffer that [`LogWatcher`]s read from.
#[derive(Clone)]
pub struct LogWatcherWriter {
    /// The handle to the shared buffer.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWatcherWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        buf.extend(new_bytes.iter());
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A deserialization of [`tracing_subscriber::fmt::format::Json`]'s output format.
#[derive(Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// The key-value fields logged on the event, usually including `message`.
    pub fields: HashMap<String, Value>,
    /// The level the event was emitted at.
    #[serde(with = "serde_with::rust::display_fromstr")]
    pub level: Level,
    /// The target of the event.
    pub target: String,
    /// The time the event was emitted.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Test if the field named `field_name` is a string that contains `pat` as a
    /// substring.
    pub fn field_contains<'a, S>(&'a self, field_name: &'a str, pat: S) -> bool
    where
        S: Deref<Target = str>,
    {
        self.fields
            .get(field_name)
            .and_then(serde_json::Value::as_str)
            .map_or(false, |value| value.contains(&*pat))
    }
}
