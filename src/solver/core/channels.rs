use super::error::BackendError;
use super::traits::{Channel, MessageSink, SinkId, SolverEnvironment};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Default message sinks, forwarding to `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingSink {
    /// emit at `ERROR` level
    Error,
    /// emit at `INFO` level
    Info,
}

impl MessageSink for TracingSink {
    fn message(&self, text: &str) {
        let text = text.trim_end();
        match self {
            TracingSink::Error => error!(target: "optbind::engine", "{}", text),
            TracingSink::Info => info!(target: "optbind::engine", "{}", text),
        }
    }
}

/// Error and info sinks supplied by the embedding application
///
/// Engine error-channel messages and session failures go to the error
/// sink.   Warning, results and log messages go to the info sink.
#[derive(Clone)]
pub struct Diagnostics {
    error: Arc<dyn MessageSink>,
    info: Arc<dyn MessageSink>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            error: Arc::new(TracingSink::Error),
            info: Arc::new(TracingSink::Info),
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Diagnostics")
    }
}

impl Diagnostics {
    /// diagnostics writing to the given sinks
    pub fn new(error: Arc<dyn MessageSink>, info: Arc<dyn MessageSink>) -> Self {
        Self { error, info }
    }

    /// replace the error sink
    pub fn with_error_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.error = sink;
        self
    }

    /// replace the info sink
    pub fn with_info_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.info = sink;
        self
    }

    /// write to the error sink
    pub fn error(&self, text: &str) {
        self.error.message(text);
    }

    /// write to the info sink
    pub fn info(&self, text: &str) {
        self.info.message(text);
    }

    /// the sink attached to an engine channel
    pub(crate) fn channel_sink(&self, channel: Channel) -> Arc<dyn MessageSink> {
        match channel {
            Channel::Error => Arc::new(ErrorChannelSink(Arc::clone(&self.error))),
            _ => Arc::clone(&self.info),
        }
    }
}

// error channel messages are forwarded with a prefix
struct ErrorChannelSink(Arc<dyn MessageSink>);

impl MessageSink for ErrorChannelSink {
    fn message(&self, text: &str) {
        self.0.message(&format!("Error: {}", text));
    }
}

/// Sinks attached during a session, detached in reverse order
#[derive(Debug, Default)]
pub(crate) struct ChannelRegistrations {
    entries: Vec<(Channel, SinkId)>,
}

impl ChannelRegistrations {
    pub fn attach<E: SolverEnvironment>(
        &mut self,
        env: &mut E,
        channel: Channel,
        sink: Arc<dyn MessageSink>,
    ) -> Result<(), BackendError> {
        let id = env.add_channel_sink(channel, sink)?;
        self.entries.push((channel, id));
        Ok(())
    }

    // detach failures are not escalated
    pub fn detach_all<E: SolverEnvironment>(&mut self, env: &mut E) {
        while let Some((channel, id)) = self.entries.pop() {
            if let Err(e) = env.remove_channel_sink(channel, id) {
                warn!("could not detach {:?} channel sink: {}", channel, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl MessageSink for Collect {
        fn message(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn test_channel_routing() {
        let err = Arc::new(Collect::default());
        let info = Arc::new(Collect::default());
        let diag = Diagnostics::new(err.clone(), info.clone());

        diag.channel_sink(Channel::Error).message("bad row");
        diag.channel_sink(Channel::Warning).message("careful");
        diag.channel_sink(Channel::Log).message("iteration 1");

        assert_eq!(*err.0.lock().unwrap(), vec!["Error: bad row"]);
        assert_eq!(*info.0.lock().unwrap(), vec!["careful", "iteration 1"]);
    }
}
