//! Keyed dataset reconciliation
//!
//! Maps a new ordered list of records onto the cached targets:
//!
//! 1. Every uid is read and checked for duplicates before anything changes.
//! 2. Records that are new or whose data changed are rendered.
//! 3. One pass in record order updates persistent targets (swapping the node
//!    in place when rendering produced a new one) and batches new targets.
//!    A batch is flushed as one contiguous insertion right before the next
//!    persistent target already in the container.
//! 4. Cached uids missing from the new records become removals.
//!
//! Reordering is detected on persistent uids only: targets present before
//! and after are compared in their old and new relative order.

use flipset_core::{Host, Record};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use tracing::trace;

use crate::command::{FilterCommand, SortCommand};
use crate::error::{MixerError, Result};
use crate::operation::Operation;
use crate::source::DatasetSource;
use crate::target::{Target, TargetId};

enum Plan<E> {
    /// Cached and unchanged
    Keep(TargetId),
    /// Cached and re-rendered into `element`
    Update(TargetId, E),
    /// Not cached; rendered into `element`
    Create(E),
}

/// Read and check every uid of `records`
pub(crate) fn uids(dataset: &DatasetSource, records: &[Record]) -> Result<Vec<String>> {
    let mut seen = FxHashSet::default();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let uid = dataset.uid(record, index)?;
            if !seen.insert(uid.clone()) {
                return Err(MixerError::DuplicateUid(uid));
            }
            Ok(uid)
        })
        .collect()
}

/// Diff `records` against the cached targets and fill the operation
pub(crate) fn reconcile<H: Host>(
    host: &mut H,
    targets: &mut SlotMap<TargetId, Target<H::Element>>,
    dataset: &mut DatasetSource,
    operation: &mut Operation<H::Element>,
    records: Vec<Record>,
) -> Result<()> {
    let uids = uids(dataset, &records)?;

    // Render pass
    let mut plans = Vec::with_capacity(records.len());
    for (record, uid) in records.iter().zip(&uids) {
        let plan = match dataset.cached(uid).and_then(|id| targets.get(id).map(|t| (id, t))) {
            Some((id, target)) => {
                let dirty = !dataset.dirty_check() || target.data() != Some(record);
                if dirty {
                    let element = host
                        .render(record, Some(target.element()))
                        .ok_or_else(|| MixerError::MissingRenderer(uid.clone()))?;
                    Plan::Update(id, element)
                } else {
                    Plan::Keep(id)
                }
            }
            None => {
                let element = host
                    .render(record, None)
                    .ok_or_else(|| MixerError::MissingRenderer(uid.clone()))?;
                Plan::Create(element)
            }
        };
        plans.push(plan);
    }

    let start_uids: Vec<String> = uids_lenient(dataset, dataset.active());
    let new_uids: FxHashSet<&str> = uids.iter().map(String::as_str).collect();

    // Apply pass
    let mut batch: Vec<TargetId> = Vec::new();
    let mut next_in_dom: Option<H::Element> = None;

    operation.show.clear();
    operation.to_show.clear();

    for ((plan, record), uid) in plans.into_iter().zip(records.iter()).zip(&uids) {
        let id = match plan {
            Plan::Keep(id) => id,
            Plan::Update(id, element) => {
                if let Some(target) = targets.get_mut(id) {
                    if *target.element() != element {
                        trace!(uid = %uid, "swapping re-rendered node");
                        host.replace(target.element(), &element);
                        host.set_displayed(&element, target.is_shown());
                        target.set_element(element);
                    }
                    target.set_data(record.clone());
                }
                id
            }
            Plan::Create(element) => {
                host.set_displayed(&element, false);
                let target = Target::new(element, false, false).with_record(uid.clone(), record.clone());
                let id = targets.insert(target);
                dataset.cache(uid.clone(), id);
                operation.inserted.push(id);
                batch.push(id);
                operation.show.push(id);
                operation.to_show.push(id);
                continue;
            }
        };

        let Some(target) = targets.get(id) else {
            continue;
        };
        if target.is_in_dom() {
            let anchor = target.element().clone();
            flush(host, targets, &mut batch, Some(&anchor));
            next_in_dom = host.next_sibling(&anchor);
        } else {
            batch.push(id);
        }

        operation.show.push(id);
        if targets.get(id).is_some_and(|target| !target.is_shown()) {
            operation.to_show.push(id);
        }
    }
    flush(host, targets, &mut batch, next_in_dom.as_ref());

    // Removals
    operation.hide.clear();
    operation.to_hide.clear();
    operation.to_remove.clear();
    for uid in &start_uids {
        if new_uids.contains(uid.as_str()) {
            continue;
        }
        let Some(id) = dataset.cached(uid) else {
            continue;
        };
        operation.hide.push(id);
        operation.to_remove.push(id);
        if targets.get(id).is_some_and(|target| target.is_shown()) {
            operation.to_hide.push(id);
        }
    }

    // Reorder detection on persistent uids only
    let start_set: FxHashSet<&str> = start_uids.iter().map(String::as_str).collect();
    let persistent_start: Vec<&str> = start_uids
        .iter()
        .map(String::as_str)
        .filter(|uid| new_uids.contains(uid))
        .collect();
    let persistent_new: Vec<&str> = uids
        .iter()
        .map(String::as_str)
        .filter(|uid| start_set.contains(uid))
        .collect();
    operation.will_sort = persistent_start != persistent_new;

    // Every record is shown in dataset order
    operation.new_order = operation.show.clone();
    operation.matching = operation.show.clone();
    operation.new_filter = FilterCommand::all();
    operation.new_sort = SortCommand::default_order();
    operation.has_failed = false;
    operation.new_dataset = Some(records);
    Ok(())
}

/// Insert the pending batch before `before`, or at the end
fn flush<H: Host>(
    host: &mut H,
    targets: &mut SlotMap<TargetId, Target<H::Element>>,
    batch: &mut Vec<TargetId>,
    before: Option<&H::Element>,
) {
    if batch.is_empty() {
        return;
    }
    let elements: Vec<H::Element> = batch
        .iter()
        .filter_map(|id| targets.get(*id).map(|target| target.element().clone()))
        .collect();
    host.insert_before(&elements, before);
    for id in batch.drain(..) {
        if let Some(target) = targets.get_mut(id) {
            target.set_in_dom(true);
        }
    }
}

/// Uids of an already accepted dataset
fn uids_lenient(dataset: &DatasetSource, records: &[Record]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| dataset.uid(record, index).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uids_reject_duplicates_and_missing() {
        let dataset = DatasetSource::new("id".into(), true);
        assert_eq!(
            uids(&dataset, &[json!({"id": 1}), json!({"id": "1"})]),
            Err(MixerError::DuplicateUid("1".into()))
        );
        assert!(matches!(
            uids(&dataset, &[json!({"id": 1}), json!({"title": "x"})]),
            Err(MixerError::MissingUid { index: 1, .. })
        ));
        assert_eq!(
            uids(&dataset, &[json!({"id": 2}), json!({"id": "b"})]).unwrap(),
            vec!["2".to_string(), "b".to_string()]
        );
    }
}
