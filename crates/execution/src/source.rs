use crate::channel::{RecordChannel, StreamSignal};
use ferry_common::Record;
use ferry_connector::{LoaderProtocolError, RecordSource};
use std::sync::Arc;

/// [`RecordSource`] handed to a loader, reading from the task's
/// [`RecordChannel`].
#[derive(Debug)]
pub struct ChannelSource {
    channel: Arc<RecordChannel>,
    exhausted: bool,
}

impl ChannelSource {
    pub fn new(channel: Arc<RecordChannel>) -> Self {
        Self { channel, exhausted: false }
    }

    /// True once `next` has reported the end of the stream.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl RecordSource for ChannelSource {
    fn next(&mut self) -> Result<Option<Record>, LoaderProtocolError> {
        if self.exhausted {
            return Err(LoaderProtocolError::ReadAfterEnd);
        }
        match self.channel.take()? {
            StreamSignal::Data(record) => Ok(Some(record)),
            StreamSignal::End => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_until_end() {
        let channel = Arc::new(RecordChannel::new());
        let mut source = ChannelSource::new(Arc::clone(&channel));

        channel.put(StreamSignal::Data(Record::Csv("1,2".into()))).unwrap();
        assert_eq!(source.next().unwrap(), Some(Record::Csv("1,2".into())));
        assert!(!source.is_exhausted());

        channel.put(StreamSignal::End).unwrap();
        assert_eq!(source.next().unwrap(), None);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_read_after_end_is_protocol_error() {
        let channel = Arc::new(RecordChannel::new());
        let mut source = ChannelSource::new(Arc::clone(&channel));
        channel.put(StreamSignal::End).unwrap();
        assert_eq!(source.next().unwrap(), None);
        assert_eq!(source.next(), Err(LoaderProtocolError::ReadAfterEnd));
    }

    #[test]
    fn test_abandoned_channel_aborts_read() {
        let channel = Arc::new(RecordChannel::new());
        let mut source = ChannelSource::new(Arc::clone(&channel));
        channel.abandon();
        assert_eq!(source.next(), Err(LoaderProtocolError::Aborted));
        assert!(!source.is_exhausted());
    }
}
