//! Managed targets
//!
//! A [`Target`] wraps one element the mixer owns. It carries visibility and
//! mid-transition flags plus, in dataset mode, the record it renders.

use flipset_animation::{is_recognized_property, PosRecord};
use flipset_core::{Host, PosData, Record};
use serde_json::Value;
use slotmap::new_key_type;

use crate::operation::OperationId;

new_key_type! {
    /// Handle to a target owned by a mixer
    pub struct TargetId;
}

/// One managed element
#[derive(Clone, Debug)]
pub struct Target<E> {
    element: E,
    uid: Option<String>,
    data: Option<Record>,
    is_shown: bool,
    is_in_dom: bool,
    is_bound: bool,
    /// Operation whose transition-end this target is waiting for
    pending: Option<OperationId>,
}

impl<E: Clone> Target<E> {
    pub(crate) fn new(element: E, is_shown: bool, is_in_dom: bool) -> Self {
        Self {
            element,
            uid: None,
            data: None,
            is_shown,
            is_in_dom,
            is_bound: false,
            pending: None,
        }
    }

    pub(crate) fn with_record(mut self, uid: String, record: Record) -> Self {
        self.uid = Some(uid);
        self.data = Some(record);
        self
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    /// Unique id of the record this target renders (dataset mode)
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn data(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    pub fn is_shown(&self) -> bool {
        self.is_shown
    }

    pub fn is_in_dom(&self) -> bool {
        self.is_in_dom
    }

    pub fn is_bound(&self) -> bool {
        self.is_bound
    }

    pub(crate) fn set_data(&mut self, record: Record) {
        self.data = Some(record);
    }

    pub(crate) fn set_element(&mut self, element: E) {
        self.element = element;
    }

    pub(crate) fn set_in_dom(&mut self, is_in_dom: bool) {
        self.is_in_dom = is_in_dom;
    }

    pub(crate) fn show<H: Host<Element = E>>(&mut self, host: &mut H) {
        host.set_displayed(&self.element, true);
        self.is_shown = true;
    }

    pub(crate) fn hide<H: Host<Element = E>>(&mut self, host: &mut H) {
        host.set_displayed(&self.element, false);
        self.is_shown = false;
    }

    /// Capture the target's current position, and size when `resize`
    pub(crate) fn pos_data<H: Host<Element = E>>(&self, host: &H, resize: bool) -> PosData {
        let bounds = host.bounds(&self.element);
        if resize {
            PosData::with_size(bounds, host.margins(&self.element))
        } else {
            PosData::from_bounds(bounds)
        }
    }

    /// Value this target sorts by
    ///
    /// Dataset targets read the field from their record; everything else
    /// reads the `data-` attribute of the element.
    pub(crate) fn sort_value<H: Host<Element = E>>(&self, host: &H, attribute: &str) -> Option<String> {
        match &self.data {
            Some(record) => match record.get(attribute)? {
                Value::Null => None,
                Value::String(value) => Some(value.clone()),
                other => Some(other.to_string()),
            },
            None => host.attribute(&self.element, &format!("data-{}", attribute)),
        }
    }

    pub(crate) fn apply_styles_in<H: Host<Element = E>>(&self, host: &mut H, record: &PosRecord, resize: bool) {
        host.apply_style(&self.element, &record.pos_in.to_declaration(resize));
    }

    pub(crate) fn apply_styles_out<H: Host<Element = E>>(
        &self,
        host: &mut H,
        record: &PosRecord,
        transition: String,
        resize: bool,
    ) {
        let decl = record.pos_out.to_declaration(resize).transition(transition);
        host.apply_style(&self.element, &decl);
    }

    pub(crate) fn apply_tween<H: Host<Element = E>>(
        &self,
        host: &mut H,
        record: &PosRecord,
        multiplier: f32,
        resize: bool,
    ) {
        host.apply_style(&self.element, &record.at(multiplier).to_declaration(resize));
    }

    /// Register the pending transition of `operation`
    pub(crate) fn bind(&mut self, operation: OperationId) {
        self.is_bound = true;
        self.pending = Some(operation);
    }

    pub(crate) fn unbind(&mut self) {
        self.is_bound = false;
        self.pending = None;
    }

    /// Remove every inline style the mixer wrote
    pub(crate) fn clean_up<H: Host<Element = E>>(&mut self, host: &mut H) {
        host.clear_style(&self.element);
        self.unbind();
    }

    /// Consume a transition-end notification
    ///
    /// Returns the operation the target was bound to when `property` is one
    /// that completes the target; further notifications are ignored.
    pub(crate) fn handle_transition_end(&mut self, property: &str, resize: bool) -> Option<OperationId> {
        if !self.is_bound || !is_recognized_property(property, resize) {
            return None;
        }
        let operation = self.pending.take();
        self.is_bound = false;
        operation
    }
}
