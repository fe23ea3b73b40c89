//! Sort evaluation
//!
//! Attribute sorts compare numerically when both values read as numbers and
//! case-insensitively as strings otherwise. Each chained level only breaks
//! ties left by the level before it.

use std::cmp::Ordering;

use flipset_core::Host;
use rand::seq::SliceRandom;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::command::{SortCommand, SortOrder};
use crate::operation::Operation;
use crate::source::Source;
use crate::target::{Target, TargetId};

/// Numeric reading of a sort value; blank reads as zero
fn as_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Compute `new_order` and `will_sort` for `sort`
pub(crate) fn evaluate<H: Host>(
    host: &H,
    targets: &SlotMap<TargetId, Target<H::Element>>,
    source: &Source,
    operation: &mut Operation<H::Element>,
    sort: &SortCommand<H::Element>,
    show_warnings: bool,
) {
    let current = operation.new_order.clone();

    let new_order = if let Some(collection) = &sort.collection {
        by_collection(targets, &current, collection)
    } else if sort.order == SortOrder::Random {
        let mut shuffled = current.clone();
        shuffled.shuffle(&mut rand::rng());
        shuffled
    } else if sort.attribute.is_empty() {
        let mut order: Vec<TargetId> = source
            .default_order()
            .into_iter()
            .filter(|id| current.contains(id))
            .collect();
        // Anything the source does not know about keeps its relative order at the end
        let unknown: Vec<TargetId> = current.iter().copied().filter(|id| !order.contains(id)).collect();
        order.extend(unknown);
        if sort.order == SortOrder::Desc {
            order.reverse();
        }
        order
    } else {
        by_attributes(host, targets, &current, sort, show_warnings)
    };

    operation.will_sort = new_order != operation.start_order;
    operation.new_order = new_order;
    operation.new_sort = sort.clone();
}

/// Listed elements first, in listed order, then everything else
fn by_collection<E: Clone + Eq + std::hash::Hash>(
    targets: &SlotMap<TargetId, Target<E>>,
    current: &[TargetId],
    collection: &[E],
) -> Vec<TargetId> {
    let by_element: FxHashMap<&E, TargetId> = current
        .iter()
        .filter_map(|id| targets.get(*id).map(|target| (target.element(), *id)))
        .collect();

    let mut order: Vec<TargetId> = Vec::with_capacity(current.len());
    for element in collection {
        if let Some(id) = by_element.get(element) {
            if !order.contains(id) {
                order.push(*id);
            }
        }
    }
    let rest: Vec<TargetId> = current.iter().copied().filter(|id| !order.contains(id)).collect();
    order.extend(rest);
    order
}

fn by_attributes<H: Host>(
    host: &H,
    targets: &SlotMap<TargetId, Target<H::Element>>,
    current: &[TargetId],
    sort: &SortCommand<H::Element>,
    show_warnings: bool,
) -> Vec<TargetId> {
    // Attribute levels up to the first default or random level
    let levels: SmallVec<[&SortCommand<H::Element>; 2]> = sort
        .levels()
        .take_while(|level| !level.attribute.is_empty() && level.order != SortOrder::Random)
        .collect();

    let values: FxHashMap<TargetId, SmallVec<[String; 2]>> = current
        .iter()
        .filter_map(|id| {
            let target = targets.get(*id)?;
            let keys = levels
                .iter()
                .map(|level| {
                    target.sort_value(host, &level.attribute).unwrap_or_else(|| {
                        if show_warnings {
                            warn!(
                                attribute = %level.attribute,
                                element = ?target.element(),
                                "target has no value for sort attribute, sorting as 0"
                            );
                        }
                        "0".to_string()
                    })
                })
                .collect();
            Some((*id, keys))
        })
        .collect();

    let mut order = current.to_vec();
    order.sort_by(|a, b| {
        let (Some(a), Some(b)) = (values.get(a), values.get(b)) else {
            return Ordering::Equal;
        };
        for (depth, level) in levels.iter().enumerate() {
            let ordering = compare_values(&a[depth], &b[depth]);
            let ordering = if level.order == SortOrder::Desc {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_when_both_numbers() {
        assert_eq!(compare_values("9", "10"), Ordering::Less);
        assert_eq!(compare_values(" 2.5 ", "2.50"), Ordering::Equal);
        assert_eq!(compare_values("", "0"), Ordering::Equal);
    }

    #[test]
    fn test_text_when_either_is_not_a_number() {
        assert_eq!(compare_values("9", "10a"), Ordering::Greater);
        assert_eq!(compare_values("Apple", "apple"), Ordering::Equal);
        assert_eq!(compare_values("banana", "Cherry"), Ordering::Less);
        assert_eq!(compare_values("NaN", "1"), Ordering::Greater);
    }

    #[test]
    fn test_collection_order_keeps_unlisted_at_end() {
        let mut targets = SlotMap::with_key();
        let current: Vec<TargetId> = (1..=4u32)
            .map(|el| targets.insert(Target::new(el, true, true)))
            .collect();

        let order = by_collection(&targets, &current, &[3, 9, 1, 3]);
        assert_eq!(order, vec![current[2], current[0], current[1], current[3]]);
    }
}
