//! Host abstraction
//!
//! The host owns the container and its child elements. All reads are
//! synchronous and assumed reliable; the engine only ever calls the host from
//! the single thread that drives it.
//!
//! Two notifications flow the other way and are delivered by the host calling
//! into the mixer: the next-paint callback that follows
//! [`Host::request_frame`], and transition-end notifications for elements
//! that were given a transition.

use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{Bounds, Margins};
use crate::style::{ContainerStyle, StyleDeclaration};

/// One record of an external dataset
///
/// Records are JSON objects; the field named by the configured unique key
/// identifies the record across datasets.
pub type Record = serde_json::Value;

/// The rendering environment a mixer animates
pub trait Host {
    /// Handle to one rendered element
    ///
    /// Handles are compared for identity, so two handles are equal exactly
    /// when they refer to the same node.
    type Element: Clone + Eq + Hash + Debug;

    /// Whether the container is currently rendered and visible
    fn is_rendered(&self) -> bool;

    /// Container children in document order
    fn children(&self) -> Vec<Self::Element>;

    /// The child following `element`, if any
    fn next_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Selector membership test
    fn matches(&self, element: &Self::Element, selector: &str) -> bool;

    /// Read an attribute value
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Bounding box of the container itself
    fn container_bounds(&self) -> Bounds;

    /// Offset position of `element` relative to the container, plus its size
    fn bounds(&self, element: &Self::Element) -> Bounds;

    /// Computed trailing margins of `element`
    fn margins(&self, element: &Self::Element) -> Margins;

    /// Show or hide an element (take it in or out of the layout flow)
    fn set_displayed(&mut self, element: &Self::Element, displayed: bool);

    /// Merge a declaration into the element's inline style
    fn apply_style(&mut self, element: &Self::Element, style: &StyleDeclaration);

    /// Remove every inline style the engine has written to `element`
    fn clear_style(&mut self, element: &Self::Element);

    /// Replace the container's inline style
    fn set_container_style(&mut self, style: &ContainerStyle);

    /// Swap one layout class on the container for another
    ///
    /// Either side may be empty, meaning "no class".
    fn swap_container_class(&mut self, from: &str, to: &str);

    /// Permute the listed elements among the child slots they currently occupy
    ///
    /// After the call, the listed elements appear in `order` sequence; children
    /// that are not listed keep their positions.
    fn arrange(&mut self, order: &[Self::Element]);

    /// Insert a contiguous batch of elements before `before` (or at the end)
    fn insert_before(&mut self, elements: &[Self::Element], before: Option<&Self::Element>);

    /// Swap `old` for `new` at the same position
    fn replace(&mut self, old: &Self::Element, new: &Self::Element);

    /// Remove an element from the container
    fn detach(&mut self, element: &Self::Element);

    /// Ask for the mixer's `handle_frame` to be called after the next paint
    fn request_frame(&mut self);

    /// Render a dataset record
    ///
    /// `existing` is the element currently representing the record, if any.
    /// Returning it unchanged means the node was patched in place; returning a
    /// different handle swaps the node. Hosts that never render return `None`.
    fn render(&mut self, record: &Record, existing: Option<&Self::Element>) -> Option<Self::Element> {
        let _ = (record, existing);
        None
    }
}
