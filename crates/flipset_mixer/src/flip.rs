//! Four-phase geometry capture
//!
//! 1. **Start**: positions before anything changes
//! 2. **Inter**: revealed targets displayed and the layout class swapped; the
//!    natural-flow baseline every tween is expressed against
//! 3. **Final**: new order printed and hidden targets removed from flow;
//!    the container is then put back exactly as it was
//! 4. **Tween**: in/out styles derived per target
//!
//! Each phase reads layout produced by the one before it, so the order is
//! fixed.

use flipset_animation::{PosRecord, TweenSettings};
use flipset_core::Host;
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::{AnimationConfig, Settings};
use crate::operation::Operation;
use crate::target::{Target, TargetId};

/// Capture geometry for every target in `show` and `to_hide` and derive tweens
///
/// The host is left in the state it was found in.
pub(crate) fn measure<H: Host>(
    host: &mut H,
    targets: &mut SlotMap<TargetId, Target<H::Element>>,
    operation: &mut Operation<H::Element>,
    settings: &Settings,
    animation: &AnimationConfig,
) {
    let resize = animation.animate_resize_targets;
    let measured: Vec<TargetId> = operation.measured().collect();
    let start_class = operation.start_state.active_container_class.clone();

    operation.has_effect = settings.effects_in.has_effect() || settings.effects_out.has_effect();
    operation.start_container = host.container_bounds();
    operation.tweens.clear();

    debug!(operation = %operation.id, targets = measured.len(), "measuring start positions");
    for id in &measured {
        if let Some(target) = targets.get(*id) {
            operation.tweens.insert(*id, PosRecord::new(target.pos_data(host, resize)));
        }
    }

    // Inter
    for id in &operation.to_show {
        if let Some(target) = targets.get_mut(*id) {
            target.show(host);
        }
    }
    if operation.will_change_layout {
        host.swap_container_class(&start_class, &operation.new_container_class);
    }
    for id in &measured {
        if let (Some(target), Some(record)) = (targets.get(*id), operation.tweens.get_mut(id)) {
            record.inter = target.pos_data(host, resize);
        }
    }

    // Final
    let snapshot = host.children();
    if operation.will_sort {
        host.arrange(&operation.elements_of(&operation.new_order));
    }
    for id in &operation.to_hide {
        if let Some(target) = targets.get_mut(*id) {
            target.hide(host);
        }
    }
    for id in &measured {
        if let (Some(target), Some(record)) = (targets.get(*id), operation.tweens.get_mut(id)) {
            record.final_pos = target.pos_data(host, resize);
            trace!(
                target = ?target.element(),
                start = ?record.start,
                inter = ?record.inter,
                final_pos = ?record.final_pos,
                "measured"
            );
        }
    }
    operation.new_container = host.container_bounds();

    // Put the container back as it was
    if operation.will_sort {
        host.arrange(&snapshot);
    }
    for id in &operation.to_show {
        if let Some(target) = targets.get_mut(*id) {
            target.hide(host);
        }
    }
    for id in &operation.to_hide {
        if let Some(target) = targets.get_mut(*id) {
            target.show(host);
        }
    }
    if operation.will_change_layout {
        host.swap_container_class(&operation.new_container_class, &start_class);
    }

    // Tween
    let tween_settings = TweenSettings {
        effects_in: &settings.effects_in,
        effects_out: &settings.effects_out,
        nudge: animation.nudge,
        resize,
    };
    for id in &operation.show {
        if let (Some(target), Some(record)) = (targets.get(*id), operation.tweens.get_mut(id)) {
            record.tween_show(target.is_shown(), &tween_settings);
        }
    }
    for id in &operation.to_hide {
        if let (Some(target), Some(record)) = (targets.get(*id), operation.tweens.get_mut(id)) {
            record.tween_hide(target.is_shown(), &tween_settings);
        }
    }
}
