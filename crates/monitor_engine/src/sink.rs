use monitor_core::LifecycleEvent;
use tokio::sync::mpsc;

/// Receives lifecycle events. Implementations must not block; events are
/// delivered while the session lock is held.
pub trait LifecycleSink: Send + Sync {
    fn emit(&self, event: LifecycleEvent);
}

pub struct ChannelLifecycleSink {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ChannelLifecycleSink {
    pub fn new(tx: mpsc::UnboundedSender<LifecycleEvent>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end for a render loop.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl LifecycleSink for ChannelLifecycleSink {
    fn emit(&self, event: LifecycleEvent) {
        let _ = self.tx.send(event);
    }
}
