use crate::snapshot::Snapshot;

pub mod console;
pub mod display;
pub mod payload;

#[cfg(feature = "upload")]
#[cfg_attr(docsrs, doc(cfg(feature = "upload")))]
pub mod upload;

/// A [Sink] projects each [Snapshot] onto one output channel.
/// Sinks handle their own failures: nothing propagates to the control loop.
pub trait Sink {
    /// Renders a new [Snapshot]
    fn consume(&mut self, snapshot: &Snapshot);

    /// Reporting tick that did not produce any [Snapshot]
    fn idle(&mut self) {}
}

/// Dispatches every reporting tick to all [Sink]s, in registration order
#[derive(Default)]
pub struct Reporter {
    sinks: Vec<Box<dyn Sink>>,
}

impl Reporter {
    /// Registers a new [Sink]
    pub fn with_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn publish(&mut self, snapshot: Option<&Snapshot>) {
        for sink in self.sinks.iter_mut() {
            match snapshot {
                Some(snapshot) => sink.consume(snapshot),
                None => sink.idle(),
            }
        }
    }
}
