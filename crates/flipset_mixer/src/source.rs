//! Where a mixer's targets come from
//!
//! A mixer either manages elements found in (or inserted into) its container,
//! or renders an external keyed dataset. The two modes differ in what "default
//! order" means and in which commands they accept; everything else is shared.

use flipset_core::Record;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::{MixerError, Result};
use crate::target::TargetId;

/// Target source of a mixer
#[derive(Clone, Debug)]
pub enum Source {
    Dom(DomSource),
    Dataset(DatasetSource),
}

/// Elements indexed from the container
#[derive(Clone, Debug, Default)]
pub struct DomSource {
    /// Insertion order, restored by the default sort
    orig_order: Vec<TargetId>,
}

impl DomSource {
    pub(crate) fn new(orig_order: Vec<TargetId>) -> Self {
        Self { orig_order }
    }

    pub fn orig_order(&self) -> &[TargetId] {
        &self.orig_order
    }

    /// Record inserted targets before `before` in insertion order, or at the end
    pub(crate) fn insert(&mut self, before: Option<TargetId>, ids: &[TargetId]) {
        let at = before
            .and_then(|before| self.orig_order.iter().position(|id| *id == before))
            .unwrap_or(self.orig_order.len());
        self.orig_order.splice(at..at, ids.iter().copied());
    }
}

/// Targets rendered from keyed records
#[derive(Clone, Debug)]
pub struct DatasetSource {
    uid_key: String,
    dirty_check: bool,
    /// Target per record uid
    cache: FxHashMap<String, TargetId>,
    /// Dataset currently rendered
    active: Vec<Record>,
}

impl DatasetSource {
    pub(crate) fn new(uid_key: String, dirty_check: bool) -> Self {
        Self {
            uid_key,
            dirty_check,
            cache: FxHashMap::default(),
            active: Vec::new(),
        }
    }

    pub fn uid_key(&self) -> &str {
        &self.uid_key
    }

    pub fn dirty_check(&self) -> bool {
        self.dirty_check
    }

    pub fn active(&self) -> &[Record] {
        &self.active
    }

    pub(crate) fn set_active(&mut self, records: Vec<Record>) {
        self.active = records;
    }

    pub fn cached(&self, uid: &str) -> Option<TargetId> {
        self.cache.get(uid).copied()
    }

    pub(crate) fn cache(&mut self, uid: String, id: TargetId) {
        self.cache.insert(uid, id);
    }

    /// Unique id of `record`; strings and numbers are accepted
    pub(crate) fn uid(&self, record: &Record, index: usize) -> Result<String> {
        match record.get(&self.uid_key) {
            Some(Value::String(uid)) => Ok(uid.clone()),
            Some(Value::Number(uid)) => Ok(uid.to_string()),
            _ => Err(MixerError::MissingUid {
                index,
                key: self.uid_key.clone(),
            }),
        }
    }
}

impl Source {
    pub fn is_dataset(&self) -> bool {
        matches!(self, Source::Dataset(_))
    }

    /// Order restored by the default sort
    ///
    /// Container elements keep their insertion order; dataset targets follow
    /// the active dataset.
    pub(crate) fn default_order(&self) -> Vec<TargetId> {
        match self {
            Source::Dom(dom) => dom.orig_order.clone(),
            Source::Dataset(dataset) => dataset
                .active
                .iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    let uid = dataset.uid(record, index).ok()?;
                    dataset.cached(&uid)
                })
                .collect(),
        }
    }

    /// Drop a removed target
    pub(crate) fn forget(&mut self, id: TargetId, uid: Option<&str>) {
        match self {
            Source::Dom(dom) => dom.orig_order.retain(|other| *other != id),
            Source::Dataset(dataset) => {
                if let Some(uid) = uid {
                    dataset.cache.remove(uid);
                }
            }
        }
    }
}
