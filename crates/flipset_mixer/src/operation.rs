//! Operations
//!
//! An [`Operation`] describes one transition from the current state to a
//! requested one: which targets are shown, hidden and removed, the old and new
//! orderings, and once measured, a tween record per animated target.
//!
//! Invariants held by every operation the mixer builds:
//!
//! - `to_show ⊆ show` and `to_hide ⊆ hide`
//! - no target is in both `to_show` and `to_hide`
//! - `to_remove ⊆ hide`

use std::fmt;
use std::sync::Arc;

use flipset_animation::PosRecord;
use flipset_core::{Bounds, Record};
use rustc_hash::FxHashMap;

use crate::command::{Command, FilterCommand, SortCommand};
use crate::state::State;
use crate::target::TargetId;

/// Monotonic id of an operation within one mixer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Operation<E> {
    pub id: OperationId,
    pub command: Command<E>,
    pub trigger: Option<E>,

    pub start_state: Arc<State<E>>,
    /// Prospective state, filled in once the operation is built
    pub new_state: Option<Arc<State<E>>>,

    pub new_filter: FilterCommand<E>,
    pub new_sort: SortCommand<E>,
    pub new_dataset: Option<Vec<Record>>,
    pub new_container_class: String,

    pub show: Vec<TargetId>,
    pub hide: Vec<TargetId>,
    pub to_show: Vec<TargetId>,
    pub to_hide: Vec<TargetId>,
    pub to_remove: Vec<TargetId>,
    pub matching: Vec<TargetId>,
    /// Targets created by this operation
    pub inserted: Vec<TargetId>,

    pub start_order: Vec<TargetId>,
    pub new_order: Vec<TargetId>,

    pub will_sort: bool,
    pub will_change_layout: bool,
    pub has_failed: bool,
    pub has_effect: bool,

    /// Tween record per target in `show` and `to_hide`
    pub tweens: FxHashMap<TargetId, PosRecord>,
    pub start_container: Bounds,
    pub new_container: Bounds,

    elements: FxHashMap<TargetId, E>,
}

impl<E: Clone> Operation<E> {
    pub(crate) fn new(
        id: OperationId,
        command: Command<E>,
        trigger: Option<E>,
        start_state: Arc<State<E>>,
        start_order: Vec<TargetId>,
    ) -> Self {
        Self {
            id,
            command,
            trigger,
            new_filter: start_state.active_filter.clone(),
            new_sort: start_state.active_sort.clone(),
            new_dataset: start_state.active_dataset.clone(),
            new_container_class: start_state.active_container_class.clone(),
            start_state,
            new_state: None,
            show: Vec::new(),
            hide: Vec::new(),
            to_show: Vec::new(),
            to_hide: Vec::new(),
            to_remove: Vec::new(),
            matching: Vec::new(),
            inserted: Vec::new(),
            new_order: start_order.clone(),
            start_order,
            will_sort: false,
            will_change_layout: false,
            has_failed: false,
            has_effect: false,
            tweens: FxHashMap::default(),
            start_container: Bounds::zero(),
            new_container: Bounds::zero(),
            elements: FxHashMap::default(),
        }
    }

    /// Remember which element each involved target had when the operation was built
    pub(crate) fn remember(&mut self, id: TargetId, element: &E) {
        self.elements.insert(id, element.clone());
    }

    /// Element a target had when the operation was built
    pub fn element(&self, id: TargetId) -> Option<&E> {
        self.elements.get(&id)
    }

    /// Elements for a list of target ids, in list order
    pub fn elements_of(&self, ids: &[TargetId]) -> Vec<E> {
        ids.iter().filter_map(|id| self.element(*id).cloned()).collect()
    }

    pub fn is_removing(&self, id: TargetId) -> bool {
        self.to_remove.contains(&id)
    }

    /// Targets that take part in the geometry pipeline
    pub(crate) fn measured(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.show.iter().chain(self.to_hide.iter()).copied()
    }

    /// Whether the operation changes anything visible
    pub(crate) fn has_changes(&self) -> bool {
        !self.to_show.is_empty()
            || !self.to_hide.is_empty()
            || self.will_sort
            || self.will_change_layout
    }
}
