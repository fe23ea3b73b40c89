//! Bounded FIFO of requests made while the mixer is busy

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::command::{Command, OnComplete};
use crate::state::State;

/// Result placeholder of one request
pub(crate) struct Pending<E> {
    tx: Option<oneshot::Sender<Arc<State<E>>>>,
    on_complete: Option<OnComplete<E>>,
}

impl<E> Pending<E> {
    pub fn new(tx: oneshot::Sender<Arc<State<E>>>, on_complete: Option<OnComplete<E>>) -> Self {
        Self {
            tx: Some(tx),
            on_complete,
        }
    }

    /// Placeholder nobody waits on
    pub fn detached() -> Self {
        Self {
            tx: None,
            on_complete: None,
        }
    }

    /// Settle the request with `state`
    pub fn resolve(self, state: &Arc<State<E>>) {
        if let Some(tx) = self.tx {
            // The caller may have dropped its handle
            let _ = tx.send(state.clone());
        }
        if let Some(callback) = self.on_complete {
            callback(state.clone());
        }
    }
}

/// A request deferred until the mixer is free
pub(crate) struct QueueItem<E> {
    pub command: Command<E>,
    pub animate: bool,
    pub trigger: Option<E>,
    pub pending: Pending<E>,
}

pub(crate) struct MixQueue<E> {
    items: VecDeque<QueueItem<E>>,
    enabled: bool,
    limit: usize,
}

impl<E> MixQueue<E> {
    pub fn new(enabled: bool, limit: usize) -> Self {
        Self {
            items: VecDeque::new(),
            enabled,
            limit,
        }
    }

    /// Append `item`, returning its 1-based position, or hand it back when full
    pub fn try_push(&mut self, item: QueueItem<E>) -> Result<usize, QueueItem<E>> {
        if !self.enabled || self.items.len() >= self.limit {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(self.items.len())
    }

    pub fn pop(&mut self) -> Option<QueueItem<E>> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = QueueItem<E>> + '_ {
        self.items.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FilterCommand;

    fn item() -> QueueItem<u32> {
        QueueItem {
            command: Command::Filter(FilterCommand::all()),
            animate: true,
            trigger: None,
            pending: Pending::detached(),
        }
    }

    #[test]
    fn test_limit() {
        let mut queue = MixQueue::new(true, 2);
        assert_eq!(queue.try_push(item()).ok(), Some(1));
        assert_eq!(queue.try_push(item()).ok(), Some(2));
        assert!(queue.try_push(item()).is_err());
        assert_eq!(queue.len(), 2);

        assert!(queue.pop().is_some());
        assert_eq!(queue.try_push(item()).ok(), Some(2));
    }

    #[test]
    fn test_disabled_queue_rejects() {
        let mut queue = MixQueue::<u32>::new(false, 3);
        assert!(queue.try_push(item()).is_err());
    }
}
