//! Registry of live mixers
//!
//! A [`Coordinator`] is owned by the application and passed to whatever needs
//! to find a mixer by container id or to track controls shared between
//! several mixers.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{MixerError, Result};

/// Registry of instances keyed by container id
pub struct Coordinator<T> {
    instances: IndexMap<String, Rc<RefCell<T>>>,
    /// Number of mixers each control is bound to
    controls: FxHashMap<String, usize>,
}

impl<T> Default for Coordinator<T> {
    fn default() -> Self {
        Self {
            instances: IndexMap::new(),
            controls: FxHashMap::default(),
        }
    }
}

impl<T> Coordinator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the instance for `id`, building it with `make` if absent
    ///
    /// Registering an id that already exists returns the existing instance
    /// without calling `make`.
    pub fn register(&mut self, id: &str, make: impl FnOnce() -> Result<T>) -> Result<Rc<RefCell<T>>> {
        if id.trim().is_empty() {
            return Err(MixerError::InvalidContainer(
                "container id must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.instances.get(id) {
            return Ok(existing.clone());
        }
        let instance = Rc::new(RefCell::new(make()?));
        self.instances.insert(id.to_string(), instance.clone());
        debug!(container = id, total = self.instances.len(), "registered mixer");
        Ok(instance)
    }

    pub fn get(&self, id: &str) -> Option<Rc<RefCell<T>>> {
        self.instances.get(id).cloned()
    }

    /// Unregister `id`, returning the instance
    pub fn remove(&mut self, id: &str) -> Option<Rc<RefCell<T>>> {
        self.instances.shift_remove(id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Note that `control` drives one more mixer; returns the new count
    pub fn bind_control(&mut self, control: &str) -> usize {
        let count = self.controls.entry(control.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Note that `control` drives one mixer fewer; returns the new count
    pub fn unbind_control(&mut self, control: &str) -> usize {
        let Some(count) = self.controls.get_mut(control) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            self.controls.remove(control);
        }
        remaining
    }

    /// Number of mixers `control` is bound to
    pub fn bound_count(&self, control: &str) -> usize {
        self.controls.get(control).copied().unwrap_or(0)
    }
}
