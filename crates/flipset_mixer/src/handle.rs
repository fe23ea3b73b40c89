//! Eventual result of a submitted request

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{MixerError, Result};
use crate::state::State;

/// How a request was admitted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Run immediately
    Started,
    /// Waiting behind the running operation; `position` is 1-based
    Queued { position: usize },
    /// Turned away; resolves with the unchanged current state
    Rejected,
}

/// Handle to a submitted request
///
/// Resolves to the state published when the request completes. A rejected
/// request resolves at once to the state that was current when it was made.
#[derive(Debug)]
pub struct MixHandle<E> {
    admission: Admission,
    rx: oneshot::Receiver<Arc<State<E>>>,
    resolved: Option<Arc<State<E>>>,
}

impl<E> MixHandle<E> {
    pub(crate) fn new(admission: Admission, rx: oneshot::Receiver<Arc<State<E>>>) -> Self {
        Self {
            admission,
            rx,
            resolved: None,
        }
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }

    /// The published state, if the request has completed
    pub fn try_state(&mut self) -> Option<Arc<State<E>>> {
        if self.resolved.is_none() {
            self.resolved = self.rx.try_recv().ok();
        }
        self.resolved.clone()
    }
}

impl<E> Future for MixHandle<E> {
    type Output = Result<Arc<State<E>>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(state) = &this.resolved {
            return Poll::Ready(Ok(state.clone()));
        }
        Pin::new(&mut this.rx).poll(cx).map(|result| {
            let state = result.map_err(|_| MixerError::Dropped)?;
            this.resolved = Some(state.clone());
            Ok(state)
        })
    }
}
