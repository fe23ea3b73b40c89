//! Filter evaluation

use flipset_core::Host;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::command::{FilterAction, FilterCommand};
use crate::operation::Operation;
use crate::target::{Target, TargetId};

/// Expand the `"all"` and `"none"` shorthands
pub(crate) fn resolve_selector<'a>(selector: &'a str, target_selector: &'a str) -> &'a str {
    match selector.trim() {
        "all" => target_selector,
        "none" => "",
        other => other,
    }
}

/// Populate `show`, `hide`, `to_show`, `to_hide` and `matching`
///
/// Targets are visited in `new_order`. Targets pending removal are taken out
/// of the shown sets after `matching` is captured.
pub(crate) fn evaluate<H: Host>(
    host: &H,
    targets: &SlotMap<TargetId, Target<H::Element>>,
    operation: &mut Operation<H::Element>,
    filter: &FilterCommand<H::Element>,
    target_selector: &str,
) {
    let selector = filter
        .selector
        .as_deref()
        .map(|selector| resolve_selector(selector, target_selector));
    let collection: Option<FxHashSet<&H::Element>> =
        filter.collection.as_ref().map(|elements| elements.iter().collect());

    operation.show.clear();
    operation.hide.clear();
    operation.to_show.clear();
    operation.to_hide.clear();

    for id in operation.new_order.iter().copied() {
        let Some(target) = targets.get(id) else {
            continue;
        };

        let mut test = match (&selector, &collection) {
            (Some(selector), _) => !selector.is_empty() && host.matches(target.element(), selector),
            (None, Some(collection)) => collection.contains(target.element()),
            (None, None) => false,
        };
        if filter.action == FilterAction::Hide {
            test = !test;
        }

        if test {
            operation.show.push(id);
            if !target.is_shown() {
                operation.to_show.push(id);
            }
        } else {
            operation.hide.push(id);
            if target.is_shown() {
                operation.to_hide.push(id);
            }
        }
    }

    operation.matching = operation.show.clone();

    for id in operation.to_remove.clone() {
        if let Some(pos) = operation.show.iter().position(|other| *other == id) {
            operation.show.remove(pos);
            operation.to_show.retain(|other| *other != id);
            operation.hide.push(id);
            if targets.get(id).is_some_and(|target| target.is_shown()) {
                operation.to_hide.push(id);
            }
        }
    }

    let requested = !filter.is_empty() && selector.map_or(true, |selector| !selector.is_empty());
    let remaining = operation
        .new_order
        .iter()
        .any(|id| !operation.to_remove.contains(id));
    operation.has_failed = requested && remaining && operation.show.is_empty();
    operation.new_filter = filter.clone();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_selector() {
        assert_eq!(resolve_selector("all", ".mix"), ".mix");
        assert_eq!(resolve_selector(" none ", ".mix"), "");
        assert_eq!(resolve_selector(".category-a", ".mix"), ".category-a");
    }
}
