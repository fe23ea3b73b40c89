//! Published state snapshots
//!
//! A new [`State`] is published behind an `Arc` whenever an operation
//! completes. Snapshots are never mutated after publication, so holders of an
//! older `Arc` keep a consistent view.

use flipset_core::Record;

use crate::command::{FilterCommand, SortCommand};
use crate::operation::Operation;
use crate::target::TargetId;

#[derive(Clone, Debug, PartialEq)]
pub struct State<E> {
    pub active_filter: FilterCommand<E>,
    pub active_sort: SortCommand<E>,
    pub active_dataset: Option<Vec<Record>>,
    pub active_container_class: String,

    /// Every managed element, in order
    pub targets: Vec<E>,
    pub show: Vec<E>,
    pub hide: Vec<E>,
    /// Elements passing the filter, including any being removed
    pub matching: Vec<E>,

    pub total_targets: usize,
    pub total_show: usize,
    pub total_hide: usize,
    pub total_matching: usize,

    /// The filter matched nothing
    pub has_failed: bool,
    pub trigger: Option<E>,
}

impl<E> State<E> {
    /// State of a mixer that has not completed any operation yet
    pub(crate) fn initial(
        active_filter: FilterCommand<E>,
        active_sort: SortCommand<E>,
        active_container_class: String,
    ) -> Self {
        Self {
            active_filter,
            active_sort,
            active_dataset: None,
            active_container_class,
            targets: Vec::new(),
            show: Vec::new(),
            hide: Vec::new(),
            matching: Vec::new(),
            total_targets: 0,
            total_show: 0,
            total_hide: 0,
            total_matching: 0,
            has_failed: false,
            trigger: None,
        }
    }
}

impl<E: Clone> State<E> {
    /// Prospective state once `operation` has completed
    ///
    /// Targets removed by the operation are left out entirely, so
    /// `total_show + total_hide == total_targets` always holds.
    pub(crate) fn from_operation(operation: &Operation<E>) -> Self {
        let kept = |ids: &[TargetId]| -> Vec<TargetId> {
            ids.iter()
                .copied()
                .filter(|id| !operation.is_removing(*id))
                .collect()
        };

        let targets = operation.elements_of(&kept(&operation.new_order));
        let show = operation.elements_of(&operation.show);
        let hide = operation.elements_of(&kept(&operation.hide));
        let matching = operation.elements_of(&operation.matching);

        Self {
            active_filter: operation.new_filter.clone(),
            active_sort: operation.new_sort.clone(),
            active_dataset: operation.new_dataset.clone(),
            active_container_class: operation.new_container_class.clone(),
            total_targets: targets.len(),
            total_show: show.len(),
            total_hide: hide.len(),
            total_matching: matching.len(),
            targets,
            show,
            hide,
            matching,
            has_failed: operation.has_failed,
            trigger: operation.trigger.clone(),
        }
    }
}
