//! Lifecycle events
//!
//! Subscribers are called synchronously, in registration order, from inside
//! the mixer call that produced the event.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::state::State;

new_key_type! {
    /// Handle returned by [`Mixer::subscribe`](crate::Mixer::subscribe)
    pub struct SubscriptionId;
}

/// Something that happened to a mixer
#[derive(Clone, Debug)]
pub enum MixEvent<E> {
    /// An operation was built and is about to run
    Start {
        current: Arc<State<E>>,
        future: Arc<State<E>>,
    },
    /// An operation completed and its state was published
    End { state: Arc<State<E>> },
    /// A completed operation's filter matched nothing
    Fail { state: Arc<State<E>> },
    /// A request was turned away because the queue was full or disabled
    Busy { state: Arc<State<E>> },
}

type Subscriber<E> = Box<dyn FnMut(&MixEvent<E>)>;

/// Registered event subscribers
pub(crate) struct Subscribers<E> {
    callbacks: SlotMap<SubscriptionId, Subscriber<E>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            callbacks: SlotMap::with_key(),
        }
    }
}

impl<E> Subscribers<E> {
    pub fn subscribe(&mut self, callback: impl FnMut(&MixEvent<E>) + 'static) -> SubscriptionId {
        self.callbacks.insert(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.callbacks.remove(id).is_some()
    }

    pub fn emit(&mut self, event: &MixEvent<E>) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }
}
