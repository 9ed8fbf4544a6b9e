use std::sync::mpsc;

use tabs_core::NodeId;

/// Page-wide broadcasts leaving the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A widget switched its visible panel; carousels and similar dependants
    /// should re-measure.
    LayoutChanged { root: NodeId },
}

pub trait PageEventSink: Send + Sync {
    fn emit(&self, event: PageEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<PageEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<PageEvent>) -> Self {
        Self { tx }
    }
}

impl PageEventSink for ChannelEventSink {
    fn emit(&self, event: PageEvent) {
        let _ = self.tx.send(event);
    }
}
