//! Channel carrying raw bridge messages from the embedded content to the UI thread
//!
//! Script interfaces are often invoked off the UI thread (Android delivers
//! `@JavascriptInterface` calls on a WebView binder thread), so the web view
//! side only ever holds a [`BridgeSender`]. The container drains the channel on
//! the UI thread.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// Sending half handed to the web view's script interface
#[derive(Clone, Debug)]
pub struct BridgeSender {
    sender: Sender<String>,
}

impl BridgeSender {
    /// Queue a raw message. Returns `false` once the player has been dropped.
    pub fn post(&self, message: impl Into<String>) -> bool {
        self.sender.send(message.into()).is_ok()
    }
}

/// Both ends of the bridge channel, owned by the container
pub struct BridgeChannel {
    sender: Sender<String>,
    receiver: Receiver<String>,
}

impl Default for BridgeChannel {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl BridgeChannel {
    /// Creates a new bridge channel with the given sender and receiver
    pub fn new(sender: Sender<String>, receiver: Receiver<String>) -> Self {
        Self { sender, receiver }
    }

    /// Get a sender for the script interface
    pub fn sender(&self) -> BridgeSender {
        BridgeSender {
            sender: self.sender.clone(),
        }
    }

    /// Receive one message (non-blocking)
    pub fn receive(&self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drops everything queued so far
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_arrive_in_order_across_threads() {
        let channel = BridgeChannel::default();
        let sender = channel.sender();
        std::thread::spawn(move || {
            sender.post("a");
            sender.post("b");
        })
        .join()
        .unwrap();

        assert_eq!(channel.receive().as_deref(), Some("a"));
        assert_eq!(channel.receive().as_deref(), Some("b"));
        assert_eq!(channel.receive(), None);
    }

    #[test]
    fn post_fails_after_channel_dropped() {
        let channel = BridgeChannel::default();
        let sender = channel.sender();
        drop(channel);
        assert!(!sender.post("late"));
    }

    #[test]
    fn clear_discards_queued() {
        let channel = BridgeChannel::default();
        channel.sender().post("x");
        channel.sender().post("y");
        assert_eq!(channel.clear(), 2);
        assert_eq!(channel.receive(), None);
    }
}
