use std::sync::mpsc::Sender;

/// Receives scan progress, one value per finished row.
pub trait ProgressSink {
    fn report(&mut self, progress: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report(&mut self, progress: f32) {
        self(progress)
    }
}

/// Forwards progress over a channel, e.g. from a worker to the thread owning a display.
///
/// A disconnected receiver is ignored: the scan does not depend on anyone listening.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub Sender<f32>);

impl ProgressSink for ChannelSink {
    fn report(&mut self, progress: f32) {
        let _ = self.0.send(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn report_all<S: ProgressSink>(mut sink: S, values: &[f32]) {
        for &value in values {
            sink.report(value);
        }
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = vec![];
        report_all(|p: f32| seen.push(p), &[0.25, 0.5]);
        assert_eq!(seen, vec![0.25, 0.5]);
    }

    #[test]
    fn channel_sink_survives_a_dropped_receiver() {
        let (sender, receiver) = mpsc::channel();
        report_all(ChannelSink(sender.clone()), &[0.1]);
        assert_eq!(receiver.recv().unwrap(), 0.1);
        drop(receiver);
        report_all(ChannelSink(sender), &[0.2]);
    }
}
