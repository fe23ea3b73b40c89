//! Operation pipeline
//!
//! Extension points are explicit: a [`Pipeline`] holds named [`Stage`]s that
//! run in insertion order at fixed [`HookPoint`]s of every operation. Stages
//! receive the operation mutably and may adjust it before the next step
//! reads it.

use std::fmt;

use crate::operation::Operation;

/// Where in an operation's life a stage runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Show/hide sets computed
    AfterFilter,
    /// New order computed
    AfterSort,
    /// Dataset reconciled
    AfterDiff,
    /// About to capture geometry
    BeforeMeasure,
    /// Tweens derived
    AfterMeasure,
    /// Cleanup finished and the new state published
    AfterCleanUp,
}

/// A named pipeline stage
pub trait Stage<E> {
    fn name(&self) -> &str;

    fn run(&mut self, point: HookPoint, operation: &mut Operation<E>);
}

/// Stage backed by a closure
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<E, F> Stage<E> for FnStage<F>
where
    F: FnMut(HookPoint, &mut Operation<E>),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, point: HookPoint, operation: &mut Operation<E>) {
        (self.f)(point, operation)
    }
}

/// Ordered collection of stages
pub struct Pipeline<E> {
    stages: Vec<Box<dyn Stage<E>>>,
}

impl<E> Default for Pipeline<E> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<E: 'static> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<E: 'static> Pipeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn push(&mut self, stage: impl Stage<E> + 'static) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a closure stage
    pub fn with_fn(
        mut self,
        name: impl Into<String>,
        f: impl FnMut(HookPoint, &mut Operation<E>) + 'static,
    ) -> Self {
        self.push(FnStage {
            name: name.into(),
            f,
        });
        self
    }

    /// Remove every stage named `name`, returning how many were removed
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.stages.len();
        self.stages.retain(|stage| stage.name() != name);
        before - self.stages.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub(crate) fn run(&mut self, point: HookPoint, operation: &mut Operation<E>) {
        for stage in &mut self.stages {
            stage.run(point, operation);
        }
    }
}
