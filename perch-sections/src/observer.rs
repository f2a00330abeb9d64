use flume::{Receiver, Sender};

/// Explicit observer registry. Each subscriber gets its own unbounded
/// channel; subscribers that dropped their receiver are pruned on emit.
#[derive(Debug)]
pub struct Observers<E> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone> Observers<E> {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = flume::unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: E) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl<E: Clone> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}
