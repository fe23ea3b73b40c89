//! In-memory host for tests
//!
//! Lays displayed children out on a grid of 100x100 cells, four per row. With
//! the `list` class on the container every child takes a full 400x50 row.
//! Hidden children report zero bounds.
//!
//! A style written with a transition starts one running transition per listed
//! property whose value actually changed, the way a browser does.

use flipset_core::{Bounds, ContainerStyle, Host, Margins, Record, StyleDeclaration};
use rustc_hash::FxHashMap;
use serde_json::Value;

pub(crate) type El = usize;

#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    pub classes: Vec<String>,
    pub attributes: FxHashMap<String, String>,
    pub displayed: bool,
    pub style: StyleDeclaration,
    /// Properties still transitioning
    pub running: Vec<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderMode {
    Disabled,
    /// Re-rendering updates the existing node
    PatchInPlace,
    /// Every render produces a fresh node
    Recreate,
}

pub(crate) struct MockHost {
    pub nodes: FxHashMap<El, Node>,
    pub children: Vec<El>,
    pub container_classes: Vec<String>,
    pub container_style: ContainerStyle,
    pub rendered: bool,
    pub render_mode: RenderMode,
    pub renders: usize,
    pub frames_requested: usize,
    pub style_log: Vec<(El, StyleDeclaration)>,
    next_id: El,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            children: Vec::new(),
            container_classes: Vec::new(),
            container_style: ContainerStyle::default(),
            rendered: true,
            render_mode: RenderMode::Disabled,
            renders: 0,
            frames_requested: 0,
            style_log: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Create a detached node
    pub fn create(&mut self, classes: &str, attributes: &[(&str, &str)]) -> El {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                classes: classes.split_whitespace().map(str::to_string).collect(),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                displayed: true,
                style: StyleDeclaration::default(),
                running: Vec::new(),
            },
        );
        id
    }

    /// Create a node and append it to the container
    pub fn add(&mut self, classes: &str, attributes: &[(&str, &str)]) -> El {
        let id = self.create(classes, attributes);
        self.children.push(id);
        id
    }

    pub fn node(&self, el: El) -> &Node {
        &self.nodes[&el]
    }

    pub fn is_displayed(&self, el: El) -> bool {
        self.nodes.get(&el).is_some_and(|node| node.displayed)
    }

    /// Displayed children in document order
    pub fn visible(&self) -> Vec<El> {
        self.children
            .iter()
            .copied()
            .filter(|el| self.is_displayed(*el))
            .collect()
    }

    /// End every running transition, returning one notification per property
    pub fn finish_transitions(&mut self) -> Vec<(El, &'static str)> {
        let mut ended = Vec::new();
        for el in &self.children {
            if let Some(node) = self.nodes.get_mut(el) {
                ended.extend(node.running.drain(..).map(|property| (*el, property)));
            }
        }
        ended
    }

    fn cell(&self) -> (usize, f32, f32) {
        if self.container_classes.iter().any(|class| class == "list") {
            (1, 400.0, 50.0)
        } else {
            (4, 100.0, 100.0)
        }
    }

    fn render_node(&mut self, record: &Record, el: El) {
        let node = self.nodes.entry(el).or_default();
        node.classes = vec!["mix".to_string()];
        node.attributes.clear();
        if let Value::Object(fields) = record {
            for (key, value) in fields {
                let value = match value {
                    Value::String(value) => value.clone(),
                    other => other.to_string(),
                };
                if key == "category" {
                    node.classes.push(format!("category-{}", value));
                }
                node.attributes.insert(format!("data-{}", key), value);
            }
        }
    }

    fn matches_compound(&self, node: &Node, selector: &str) -> bool {
        let classes: Vec<&str> = selector.split('.').filter(|s| !s.is_empty()).collect();
        selector.starts_with('.')
            && !classes.is_empty()
            && classes
                .iter()
                .all(|class| node.classes.iter().any(|own| own == class))
    }
}

impl Host for MockHost {
    type Element = El;

    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn children(&self) -> Vec<El> {
        self.children.clone()
    }

    fn next_sibling(&self, element: &El) -> Option<El> {
        let at = self.children.iter().position(|el| el == element)?;
        self.children.get(at + 1).copied()
    }

    fn matches(&self, element: &El, selector: &str) -> bool {
        let Some(node) = self.nodes.get(element) else {
            return false;
        };
        selector
            .split(',')
            .map(str::trim)
            .any(|part| self.matches_compound(node, part))
    }

    fn attribute(&self, element: &El, name: &str) -> Option<String> {
        self.nodes.get(element)?.attributes.get(name).cloned()
    }

    fn container_bounds(&self) -> Bounds {
        let (columns, width, height) = self.cell();
        let rows = self.visible().len().div_ceil(columns);
        Bounds::new(0.0, 0.0, width * columns as f32, height * rows as f32)
    }

    fn bounds(&self, element: &El) -> Bounds {
        let (columns, width, height) = self.cell();
        match self.visible().iter().position(|el| el == element) {
            Some(slot) => Bounds::new(
                (slot % columns) as f32 * width,
                (slot / columns) as f32 * height,
                width,
                height,
            ),
            None => Bounds::zero(),
        }
    }

    fn margins(&self, _element: &El) -> Margins {
        Margins::default()
    }

    fn set_displayed(&mut self, element: &El, displayed: bool) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.displayed = displayed;
        }
    }

    fn apply_style(&mut self, element: &El, style: &StyleDeclaration) {
        if let Some(node) = self.nodes.get_mut(element) {
            let before = node.style.clone();
            node.style.merge(style);
            if let Some(transition) = &style.transition {
                node.running = changed_properties(&before, &node.style, transition);
            }
        }
        self.style_log.push((*element, style.clone()));
    }

    fn clear_style(&mut self, element: &El) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.style = StyleDeclaration::default();
            node.running.clear();
        }
    }

    fn set_container_style(&mut self, style: &ContainerStyle) {
        self.container_style = style.clone();
    }

    fn swap_container_class(&mut self, from: &str, to: &str) {
        self.container_classes.retain(|class| class != from);
        if !to.is_empty() && !self.container_classes.iter().any(|class| class == to) {
            self.container_classes.push(to.to_string());
        }
    }

    fn arrange(&mut self, order: &[El]) {
        let mut slots: Vec<usize> = order
            .iter()
            .filter_map(|el| self.children.iter().position(|child| child == el))
            .collect();
        slots.sort_unstable();
        let listed = order.iter().filter(|el| self.children.contains(el)).copied();
        let placed: Vec<(usize, El)> = slots.into_iter().zip(listed).collect();
        for (slot, el) in placed {
            self.children[slot] = el;
        }
    }

    fn insert_before(&mut self, elements: &[El], before: Option<&El>) {
        self.children.retain(|child| !elements.contains(child));
        let at = before
            .and_then(|before| self.children.iter().position(|child| child == before))
            .unwrap_or(self.children.len());
        self.children.splice(at..at, elements.iter().copied());
    }

    fn replace(&mut self, old: &El, new: &El) {
        if let Some(at) = self.children.iter().position(|child| child == old) {
            self.children[at] = *new;
        }
    }

    fn detach(&mut self, element: &El) {
        self.children.retain(|child| child != element);
    }

    fn request_frame(&mut self) {
        self.frames_requested += 1;
    }

    fn render(&mut self, record: &Record, existing: Option<&El>) -> Option<El> {
        let el = match (self.render_mode, existing) {
            (RenderMode::Disabled, _) => return None,
            (RenderMode::PatchInPlace, Some(existing)) => *existing,
            _ => self.create("", &[]),
        };
        self.renders += 1;
        self.render_node(record, el);
        Some(el)
    }
}

/// Transitioned properties that differ between `before` and `after`
fn changed_properties(before: &StyleDeclaration, after: &StyleDeclaration, transition: &str) -> Vec<&'static str> {
    let listed: Vec<&str> = transition
        .split(',')
        .filter_map(|rule| rule.split_whitespace().next())
        .collect();
    let candidates: [(&'static str, bool); 6] = [
        ("transform", before.transform != after.transform),
        ("opacity", before.opacity != after.opacity),
        ("width", before.width != after.width),
        ("height", before.height != after.height),
        ("margin-right", before.margin_right != after.margin_right),
        ("margin-bottom", before.margin_bottom != after.margin_bottom),
    ];
    candidates
        .into_iter()
        .filter(|(property, changed)| *changed && listed.contains(property))
        .map(|(property, _)| property)
        .collect()
}
