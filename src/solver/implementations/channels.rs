use crate::solver::traits::{Channel, MessageSink, SinkId};
use crate::solver::BackendError;
use std::collections::HashMap;
use std::sync::Arc;

// engines in this crate have no message channels of their own, so the
// environments keep their attached sinks here

#[derive(Default)]
pub(crate) struct ChannelTable {
    next_id: usize,
    sinks: HashMap<Channel, Vec<(SinkId, Arc<dyn MessageSink>)>>,
}

impl ChannelTable {
    pub fn add(&mut self, channel: Channel, sink: Arc<dyn MessageSink>) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.sinks.entry(channel).or_default().push((id, sink));
        id
    }

    pub fn remove(&mut self, channel: Channel, id: SinkId) -> Result<(), BackendError> {
        let sinks = self.sinks.entry(channel).or_default();
        match sinks.iter().position(|(sid, _)| *sid == id) {
            Some(pos) => {
                sinks.remove(pos);
                Ok(())
            }
            None => Err(BackendError::new(
                ERR_NO_SINK,
                format!("no sink {} on the {:?} channel", id.0, channel),
            )),
        }
    }

    pub fn emit(&self, channel: Channel, text: &str) {
        if let Some(sinks) = self.sinks.get(&channel) {
            for (_, sink) in sinks {
                sink.message(text);
            }
        }
    }

    // report on the error channel and build the matching error
    pub fn fail(&self, code: i32, text: impl Into<String>) -> BackendError {
        let text = text.into();
        self.emit(Channel::Error, &text);
        BackendError::new(code, text)
    }

    pub fn clear(&mut self) {
        self.sinks.clear();
    }
}

// error codes shared by the backends
pub(crate) const ERR_NO_SINK: i32 = 1001;
pub(crate) const ERR_BAD_DATA: i32 = 1002;
pub(crate) const ERR_UNSUPPORTED: i32 = 1003;
pub(crate) const ERR_BAD_PARAM: i32 = 1004;
pub(crate) const ERR_NO_SOLUTION: i32 = 1005;
pub(crate) const ERR_BAD_RANGE: i32 = 1006;
pub(crate) const ERR_FILE: i32 = 1007;
#[cfg(feature = "highs")]
pub(crate) const ERR_ENGINE: i32 = 1008;

// check a half open query range against a dimension and output length
pub(crate) fn check_range(
    table: &ChannelTable,
    what: &str,
    begin: usize,
    end: usize,
    dim: usize,
    out_len: usize,
) -> Result<(), BackendError> {
    if begin > end || end > dim || out_len != end - begin {
        return Err(table.fail(
            ERR_BAD_RANGE,
            format!("bad {} range {}..{} for dimension {}", what, begin, end, dim),
        ));
    }
    Ok(())
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
    fn test_channel_table() {
        let mut table = ChannelTable::default();
        let sink = Arc::new(Collect::default());
        let id = table.add(Channel::Log, sink.clone());

        table.emit(Channel::Log, "one");
        table.emit(Channel::Results, "dropped");
        assert!(table.remove(Channel::Log, id).is_ok());
        table.emit(Channel::Log, "two");

        assert_eq!(*sink.0.lock().unwrap(), vec!["one"]);
        assert_eq!(table.remove(Channel::Log, id).unwrap_err().code, ERR_NO_SINK);
    }
}
