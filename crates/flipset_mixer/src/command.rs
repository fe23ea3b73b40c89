//! Commands accepted by [`Mixer::submit`](crate::Mixer::submit)

use std::fmt;
use std::sync::Arc;

use flipset_core::Record;

use crate::error::{MixerError, Result};
use crate::parse::parse_sort;
use crate::state::State;

/// Whether elements passing a filter test are shown or hidden
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterAction {
    #[default]
    Show,
    Hide,
}

/// Visibility request
///
/// Exactly one of `selector` or `collection` may be set. The selector
/// shorthands `"all"` and `"none"` match every target and no target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterCommand<E> {
    pub selector: Option<String>,
    pub collection: Option<Vec<E>>,
    pub action: FilterAction,
}

impl<E> FilterCommand<E> {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            collection: None,
            action: FilterAction::Show,
        }
    }

    pub fn collection(elements: Vec<E>) -> Self {
        Self {
            selector: None,
            collection: Some(elements),
            action: FilterAction::Show,
        }
    }

    pub fn all() -> Self {
        Self::selector("all")
    }

    pub fn none() -> Self {
        Self::selector("none")
    }

    /// Hide matching elements instead of showing them
    pub fn hide(mut self) -> Self {
        self.action = FilterAction::Hide;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match (&self.selector, &self.collection) {
            (Some(_), Some(_)) => Err(MixerError::ConflictingFilter),
            (None, None) => Err(MixerError::InvalidCommand(
                "a filter needs a selector or a collection".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Whether the filter asks for anything at all
    pub(crate) fn is_empty(&self) -> bool {
        match (&self.selector, &self.collection) {
            (Some(selector), _) => selector.trim().is_empty(),
            (_, Some(collection)) => collection.is_empty(),
            (None, None) => true,
        }
    }
}

/// Sort direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
    /// Uniform shuffle; attribute and tie-breakers are ignored
    Random,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
            SortOrder::Random => "random",
        })
    }
}

/// Ordering request, chained through `next` for tie-breaking
///
/// An empty `attribute` is the default order (original insertion order). A
/// `collection` sorts by explicit element order instead of by attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortCommand<E> {
    pub attribute: String,
    pub order: SortOrder,
    pub collection: Option<Vec<E>>,
    pub next: Option<Box<SortCommand<E>>>,
}

impl<E> SortCommand<E> {
    /// Parse `"attr:order attr2:order2"`, `"default"` or `"random"`
    pub fn parse(input: &str) -> Result<Self> {
        parse_sort(input)
    }

    pub fn by(attribute: impl Into<String>, order: SortOrder) -> Self {
        Self {
            attribute: attribute.into(),
            order,
            collection: None,
            next: None,
        }
    }

    /// Original insertion order
    pub fn default_order() -> Self {
        Self::by("", SortOrder::Asc)
    }

    pub fn random() -> Self {
        Self::by("", SortOrder::Random)
    }

    /// Explicit element order; unlisted targets follow in their current order
    pub fn collection(elements: Vec<E>) -> Self {
        Self {
            collection: Some(elements),
            ..Self::default_order()
        }
    }

    /// Append a tie-breaker to the end of the chain
    pub fn then(mut self, next: SortCommand<E>) -> Self {
        match self.next {
            Some(inner) => self.next = Some(Box::new((*inner).then(next))),
            None => self.next = Some(Box::new(next)),
        }
        self
    }

    /// Whether this is the plain ascending default order
    pub fn is_default(&self) -> bool {
        self.attribute.is_empty() && self.order == SortOrder::Asc && self.collection.is_none()
    }

    /// Sort levels from first to last tie-breaker
    pub fn levels(&self) -> impl Iterator<Item = &SortCommand<E>> {
        std::iter::successors(Some(self), |level| level.next.as_deref())
    }
}

impl<E> fmt::Display for SortCommand<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.levels().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if level.collection.is_some() {
                f.write_str("collection")?;
            } else if level.order == SortOrder::Random {
                f.write_str("random")?;
            } else {
                let attribute = if level.attribute.is_empty() {
                    "default"
                } else {
                    level.attribute.as_str()
                };
                write!(f, "{}:{}", attribute, level.order)?;
            }
        }
        Ok(())
    }
}

/// Where inserted elements go
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertPosition<E> {
    /// Before the target currently at this index; past the end appends
    Index(usize),
    Before(E),
    After(E),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertCommand<E> {
    pub collection: Vec<E>,
    pub position: InsertPosition<E>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveCommand<E> {
    pub targets: Vec<E>,
}

/// Any combination of the DOM-oriented commands
///
/// Parts are applied as insert, remove, sort, filter, layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multimix<E> {
    pub filter: Option<FilterCommand<E>>,
    pub sort: Option<SortCommand<E>>,
    pub insert: Option<InsertCommand<E>>,
    pub remove: Option<RemoveCommand<E>>,
    pub change_layout: Option<String>,
}

impl<E> Default for Multimix<E> {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
            insert: None,
            remove: None,
            change_layout: None,
        }
    }
}

impl<E> Multimix<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterCommand<E>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: SortCommand<E>) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn insert(mut self, collection: Vec<E>, position: InsertPosition<E>) -> Self {
        self.insert = Some(InsertCommand {
            collection,
            position,
        });
        self
    }

    pub fn remove(mut self, targets: Vec<E>) -> Self {
        self.remove = Some(RemoveCommand { targets });
        self
    }

    pub fn change_layout(mut self, class_name: impl Into<String>) -> Self {
        self.change_layout = Some(class_name.into());
        self
    }

    pub(crate) fn has_mutation(&self) -> bool {
        self.insert.is_some() || self.remove.is_some()
    }
}

/// A requested change
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<E> {
    Filter(FilterCommand<E>),
    Sort(SortCommand<E>),
    Insert(InsertCommand<E>),
    Remove(RemoveCommand<E>),
    ChangeLayout(String),
    Multimix(Multimix<E>),
    /// Replace the rendered set with these records (dataset mode only)
    Dataset(Vec<Record>),
}

impl<E> Command<E> {
    /// Normalize a DOM-oriented command; datasets come back as `Err`
    pub(crate) fn into_multimix(self) -> std::result::Result<Multimix<E>, Vec<Record>> {
        let mix = Multimix::new();
        Ok(match self {
            Command::Filter(filter) => mix.filter(filter),
            Command::Sort(sort) => mix.sort(sort),
            Command::Insert(insert) => Multimix {
                insert: Some(insert),
                ..mix
            },
            Command::Remove(remove) => Multimix {
                remove: Some(remove),
                ..mix
            },
            Command::ChangeLayout(class_name) => mix.change_layout(class_name),
            Command::Multimix(mix) => mix,
            Command::Dataset(records) => return Err(records),
        })
    }
}

/// Callback invoked with the published state when a request completes
pub type OnComplete<E> = Box<dyn FnOnce(Arc<State<E>>)>;

/// A command plus how to run it
pub struct Request<E> {
    pub command: Command<E>,
    /// Animate the change; `false` applies it synchronously
    pub animate: bool,
    /// Control that triggered the request, carried into the published state
    pub trigger: Option<E>,
    pub on_complete: Option<OnComplete<E>>,
}

impl<E> Request<E> {
    pub fn new(command: Command<E>) -> Self {
        Self {
            command,
            animate: true,
            trigger: None,
            on_complete: None,
        }
    }

    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn trigger(mut self, trigger: E) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(Arc<State<E>>) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl<E> From<Command<E>> for Request<E> {
    fn from(command: Command<E>) -> Self {
        Request::new(command)
    }
}

impl<E: fmt::Debug> fmt::Debug for Request<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("command", &self.command)
            .field("animate", &self.animate)
            .field("trigger", &self.trigger)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_validation() {
        assert!(FilterCommand::<u32>::selector(".a").validate().is_ok());
        let conflicting = FilterCommand {
            selector: Some(".a".to_string()),
            collection: Some(vec![1u32]),
            action: FilterAction::Show,
        };
        assert_eq!(conflicting.validate(), Err(MixerError::ConflictingFilter));
        assert!(!FilterCommand::<u32>::selector(".a").is_empty());
        assert!(FilterCommand::<u32>::selector("").is_empty());
        assert!(FilterCommand::<u32>::collection(vec![]).is_empty());
    }

    #[test]
    fn test_sort_chain() {
        let sort = SortCommand::<u32>::by("views", SortOrder::Desc)
            .then(SortCommand::by("published", SortOrder::Asc))
            .then(SortCommand::by("title", SortOrder::Asc));
        let attributes: Vec<_> = sort.levels().map(|level| level.attribute.as_str()).collect();
        assert_eq!(attributes, ["views", "published", "title"]);
        assert_eq!(sort.to_string(), "views:desc published:asc title:asc");
        assert!(SortCommand::<u32>::default_order().is_default());
        assert!(!SortCommand::<u32>::random().is_default());
    }

    #[test]
    fn test_into_multimix() {
        let mix = Command::<u32>::ChangeLayout("list".into())
            .into_multimix()
            .unwrap();
        assert_eq!(mix.change_layout.as_deref(), Some("list"));
        assert!(!mix.has_mutation());
        assert!(Command::<u32>::Dataset(vec![]).into_multimix().is_err());
    }
}
