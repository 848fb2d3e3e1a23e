use std::fmt;
use std::sync::Arc;

/// Caller-supplied sink for human-readable progress and error notes
pub type DebugLog = Arc<dyn Fn(&str) + Send + Sync>;

/// Routes store notes to `tracing` and, when configured, to a [`DebugLog`].
/// Notes are informational only; nothing branches on them.
#[derive(Clone, Default)]
pub struct Notes {
    sink: Option<DebugLog>,
}

impl Notes {
    pub fn new(sink: Option<DebugLog>) -> Self {
        Self { sink }
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
        self.forward(message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        self.forward(message);
    }

    fn forward(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink(message);
        }
    }
}

impl fmt::Debug for Notes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notes")
            .field("sink", &self.sink.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_forwards_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let notes = Notes::new(Some(Arc::new(move |msg: &str| {
            captured.lock().unwrap().push(msg.to_string());
        })));

        notes.debug("first");
        notes.warn("second");

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_without_sink_is_silent() {
        Notes::default().debug("nobody listens");
    }
}
