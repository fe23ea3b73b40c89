//! The mixer
//!
//! A [`Mixer`] owns the targets of one container. Every request becomes an
//! [`Operation`] that is built, measured and animated to completion before the
//! next one starts; requests made in the meantime wait in a bounded FIFO queue.
//!
//! The mixer is driven from a single thread. Animation progresses when the
//! host calls back into it:
//!
//! - [`Mixer::handle_frame`] after each frame it requested
//! - [`Mixer::handle_transition_end`] when a target finishes a transition
//!
//! An operation that has nothing to animate (animation disabled, zero
//! duration, no effects, container not rendered, nothing changing) completes
//! synchronously inside the call that started it.

use std::rc::Rc;
use std::sync::Arc;

use flipset_animation::{StaggerSequence, TransitionTiming};
use flipset_core::{ContainerStyle, Host, Record};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::command::{
    Command, FilterCommand, InsertCommand, InsertPosition, Multimix, RemoveCommand, Request,
    SortCommand,
};
use crate::config::{MixerConfig, Settings};
use crate::error::{MixerError, Result};
use crate::events::{MixEvent, SubscriptionId, Subscribers};
use crate::handle::{Admission, MixHandle};
use crate::operation::{Operation, OperationId};
use crate::pipeline::{HookPoint, Pipeline};
use crate::queue::{MixQueue, Pending, QueueItem};
use crate::source::{DatasetSource, DomSource, Source};
use crate::state::State;
use crate::target::{Target, TargetId};
use crate::{filter, flip, reconcile, sort};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Waiting for the frame that writes start styles
    AwaitingMove,
    /// Waiting for the frame that writes end styles and transitions
    AwaitingStylesOut,
    /// Waiting for transition-end notifications
    Transitioning,
}

/// The operation currently being animated
struct Active<E> {
    operation: Operation<E>,
    phase: Phase,
    pending: Pending<E>,
    timing: TransitionTiming,
    container_style: ContainerStyle,
    /// Stagger index per target, assigned when targets move
    stagger: FxHashMap<TargetId, usize>,
    bound: usize,
    done: usize,
    immovable: usize,
}

pub struct Mixer<H: Host> {
    host: H,
    config: MixerConfig,
    settings: Settings,

    targets: SlotMap<TargetId, Target<H::Element>>,
    /// Targets in container order
    order: Vec<TargetId>,
    index: FxHashMap<H::Element, TargetId>,
    source: Source,

    state: Arc<State<H::Element>>,
    active: Option<Active<H::Element>>,
    queue: MixQueue<H::Element>,
    last_operation: Option<Operation<H::Element>>,
    next_operation_id: u64,

    subscribers: Subscribers<H::Element>,
    pipeline: Pipeline<H::Element>,
    stagger_sequence: Option<StaggerSequence>,

    is_destroyed: bool,
}

impl<H: Host> Mixer<H>
where
    H::Element: 'static,
{
    // =========================================================================
    // Construction
    // =========================================================================

    /// Index the container's targets and apply the load filter and sort
    ///
    /// With `data.uid_key` configured the mixer starts in dataset mode with an
    /// empty dataset; use [`Mixer::with_dataset`] to start from records.
    pub fn new(host: H, config: MixerConfig) -> Result<Self> {
        if !config.data.uid_key.is_empty() {
            return Self::with_dataset(host, config, Vec::new());
        }
        let mut mixer = Self::bare(host, config)?;
        let ids = mixer.index_children();
        mixer.source = Source::Dom(DomSource::new(ids));
        mixer.load()?;
        Ok(mixer)
    }

    /// Start in dataset mode from `records`
    ///
    /// Targets already in the container are adopted one per record, in order;
    /// their count must match. An empty container gets every record rendered.
    pub fn with_dataset(host: H, config: MixerConfig, records: Vec<Record>) -> Result<Self> {
        if config.data.uid_key.is_empty() {
            return Err(MixerError::MissingUidKey);
        }
        let mut mixer = Self::bare(host, config)?;
        let mut dataset = DatasetSource::new(
            mixer.config.data.uid_key.clone(),
            mixer.config.data.dirty_check,
        );
        let uids = reconcile::uids(&dataset, &records)?;

        let existing: Vec<H::Element> = mixer
            .host
            .children()
            .into_iter()
            .filter(|el| mixer.host.matches(el, &mixer.config.selectors.target))
            .collect();

        if existing.is_empty() {
            let mut rendered = Vec::with_capacity(records.len());
            for (record, uid) in records.iter().zip(&uids) {
                let element = mixer
                    .host
                    .render(record, None)
                    .ok_or_else(|| MixerError::MissingRenderer(uid.clone()))?;
                rendered.push(element);
            }
            mixer.host.insert_before(&rendered, None);
            for ((element, record), uid) in rendered.into_iter().zip(&records).zip(uids) {
                mixer.adopt(&mut dataset, element, record.clone(), uid);
            }
        } else if existing.len() != records.len() {
            return Err(MixerError::DatasetMismatch {
                records: records.len(),
                targets: existing.len(),
            });
        } else {
            for ((element, record), uid) in existing.into_iter().zip(&records).zip(uids) {
                mixer.adopt(&mut dataset, element, record.clone(), uid);
            }
        }

        dataset.set_active(records.clone());
        mixer.source = Source::Dataset(dataset);
        let mut state = (*mixer.state).clone();
        state.active_dataset = Some(records);
        mixer.state = Arc::new(state);
        mixer.load()?;
        Ok(mixer)
    }

    fn bare(host: H, config: MixerConfig) -> Result<Self> {
        config.validate()?;
        let settings = Settings::from_config(&config)?;
        let state = State::initial(
            FilterCommand::selector(config.load.filter.clone()),
            SortCommand::default_order(),
            config.layout.container_class_name.clone(),
        );
        let queue = MixQueue::new(config.animation.queue, config.animation.queue_limit);

        Ok(Self {
            host,
            settings,
            targets: SlotMap::with_key(),
            order: Vec::new(),
            index: FxHashMap::default(),
            source: Source::Dom(DomSource::default()),
            state: Arc::new(state),
            active: None,
            queue,
            last_operation: None,
            next_operation_id: 0,
            subscribers: Subscribers::default(),
            pipeline: Pipeline::default(),
            stagger_sequence: None,
            is_destroyed: false,
            config,
        })
    }

    fn adopt(&mut self, dataset: &mut DatasetSource, element: H::Element, record: Record, uid: String) {
        let target = Target::new(element.clone(), true, true).with_record(uid.clone(), record);
        let id = self.targets.insert(target);
        self.index.insert(element, id);
        self.order.push(id);
        dataset.cache(uid, id);
    }

    /// Create targets for container children matching the target selector
    fn index_children(&mut self) -> Vec<TargetId> {
        let children = self.host.children();
        let mut ids = Vec::new();
        for element in children {
            if !self.host.matches(&element, &self.config.selectors.target) {
                continue;
            }
            let id = self.targets.insert(Target::new(element.clone(), true, true));
            self.index.insert(element, id);
            ids.push(id);
        }
        self.order = ids.clone();
        debug!(targets = ids.len(), "indexed container");
        ids
    }

    /// Apply the load filter and sort without animating
    fn load(&mut self) -> Result<()> {
        let mix = Multimix::new()
            .filter(FilterCommand::selector(self.config.load.filter.clone()))
            .sort(Settings::load_sort(&self.config)?);
        let operation = self.build_operation(Command::Multimix(mix), None)?;
        self.execute(operation, false, Pending::detached());
        Ok(())
    }

    /// Use `sequence` to map stagger indices to delay multipliers
    pub fn with_stagger_sequence(mut self, sequence: impl Fn(usize) -> usize + 'static) -> Self {
        self.stagger_sequence = Some(Rc::new(sequence) as StaggerSequence);
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline<H::Element>) -> Self {
        self.pipeline = pipeline;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Most recently published state
    pub fn state(&self) -> Arc<State<H::Element>> {
        self.state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.is_destroyed
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline<H::Element> {
        &mut self.pipeline
    }

    /// Targets in container order
    pub fn targets(&self) -> impl Iterator<Item = &Target<H::Element>> {
        self.order.iter().filter_map(|id| self.targets.get(*id))
    }

    pub fn target(&self, element: &H::Element) -> Option<&Target<H::Element>> {
        self.index.get(element).and_then(|id| self.targets.get(*id))
    }

    /// The last operation that completed; never mutated afterwards
    pub fn last_operation(&self) -> Option<&Operation<H::Element>> {
        self.last_operation.as_ref()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&MixEvent<H::Element>) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Submit a request
    ///
    /// Invalid commands are rejected with an error before anything changes.
    /// Otherwise the request runs now, waits in the queue, or (queue full or
    /// disabled) is turned away and resolves with the current state.
    pub fn submit(&mut self, request: impl Into<Request<H::Element>>) -> Result<MixHandle<H::Element>> {
        let Request {
            command,
            animate,
            trigger,
            on_complete,
        } = request.into();
        let (tx, rx) = oneshot::channel();
        let pending = Pending::new(tx, on_complete);

        if self.is_destroyed {
            if self.config.debug.show_warnings {
                warn!("request made to a destroyed mixer");
            }
            pending.resolve(&self.state);
            return Ok(MixHandle::new(Admission::Rejected, rx));
        }

        self.validate(&command)?;

        if self.is_busy() {
            let item = QueueItem {
                command,
                animate,
                trigger,
                pending,
            };
            return match self.queue.try_push(item) {
                Ok(position) => {
                    debug!(position, "mixer busy, request queued");
                    Ok(MixHandle::new(Admission::Queued { position }, rx))
                }
                Err(item) => {
                    if self.config.debug.show_warnings {
                        warn!(
                            limit = self.config.animation.queue_limit,
                            "mixer busy and queue full, request dropped"
                        );
                    }
                    let state = self.state.clone();
                    self.subscribers.emit(&MixEvent::Busy {
                        state: state.clone(),
                    });
                    item.pending.resolve(&state);
                    Ok(MixHandle::new(Admission::Rejected, rx))
                }
            };
        }

        let operation = self.build_operation(command, trigger)?;
        self.execute(operation, animate, pending);
        Ok(MixHandle::new(Admission::Started, rx))
    }

    /// Filter by selector (`"all"`, `"none"` or any selector the host understands)
    pub fn filter(&mut self, selector: &str) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Filter(FilterCommand::selector(selector)))
    }

    /// Sort by a sort string such as `"views:desc published:asc"`
    pub fn sort(&mut self, sort: &str) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Sort(SortCommand::parse(sort)?))
    }

    /// Insert elements before the target at `index`
    pub fn insert(&mut self, index: usize, elements: Vec<H::Element>) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Insert(InsertCommand {
            collection: elements,
            position: InsertPosition::Index(index),
        }))
    }

    pub fn prepend(&mut self, elements: Vec<H::Element>) -> Result<MixHandle<H::Element>> {
        self.insert(0, elements)
    }

    pub fn append(&mut self, elements: Vec<H::Element>) -> Result<MixHandle<H::Element>> {
        let end = self.order.len();
        self.insert(end, elements)
    }

    pub fn remove(&mut self, elements: Vec<H::Element>) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Remove(RemoveCommand { targets: elements }))
    }

    pub fn change_layout(&mut self, class_name: &str) -> Result<MixHandle<H::Element>> {
        self.submit(Command::ChangeLayout(class_name.to_string()))
    }

    pub fn dataset(&mut self, records: Vec<Record>) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Dataset(records))
    }

    pub fn multimix(&mut self, mix: Multimix<H::Element>) -> Result<MixHandle<H::Element>> {
        self.submit(Command::Multimix(mix))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Reject commands that cannot run against the current targets
    fn validate(&self, command: &Command<H::Element>) -> Result<()> {
        let (filter, insert, remove) = match command {
            Command::Dataset(records) => {
                let Source::Dataset(dataset) = &self.source else {
                    return Err(MixerError::MissingUidKey);
                };
                reconcile::uids(dataset, records)?;
                return Ok(());
            }
            Command::Filter(filter) => (Some(filter), None, None),
            Command::Insert(insert) => (None, Some(insert), None),
            Command::Remove(remove) => (None, None, Some(remove)),
            Command::Multimix(mix) => (mix.filter.as_ref(), mix.insert.as_ref(), mix.remove.as_ref()),
            Command::Sort(_) | Command::ChangeLayout(_) => (None, None, None),
        };

        if let Some(filter) = filter {
            filter.validate()?;
        }
        if (insert.is_some() || remove.is_some()) && self.source.is_dataset() {
            return Err(MixerError::InvalidCommand(
                "insert and remove are not available in dataset mode".to_string(),
            ));
        }
        if let Some(insert) = insert {
            let mut seen = FxHashSet::default();
            for element in &insert.collection {
                if self.index.contains_key(element) || !seen.insert(element) {
                    return Err(MixerError::PreexistingElement(format!("{:?}", element)));
                }
            }
            if let InsertPosition::Before(sibling) | InsertPosition::After(sibling) = &insert.position {
                if !self.index.contains_key(sibling) {
                    return Err(MixerError::InvalidCommand(format!(
                        "insertion sibling {:?} is not a target",
                        sibling
                    )));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Operation construction
    // =========================================================================

    fn build_operation(
        &mut self,
        command: Command<H::Element>,
        trigger: Option<H::Element>,
    ) -> Result<Operation<H::Element>> {
        let id = OperationId(self.next_operation_id);
        self.next_operation_id += 1;

        let mut operation = Operation::new(
            id,
            command.clone(),
            trigger,
            self.state.clone(),
            self.order.clone(),
        );
        match command.into_multimix() {
            Ok(mix) => self.build_multimix(&mut operation, mix)?,
            Err(records) => self.build_dataset(&mut operation, records)?,
        }

        operation.new_state = Some(Arc::new(State::from_operation(&operation)));
        debug!(
            operation = %operation.id,
            show = operation.show.len(),
            to_show = operation.to_show.len(),
            to_hide = operation.to_hide.len(),
            to_remove = operation.to_remove.len(),
            will_sort = operation.will_sort,
            "built operation"
        );
        Ok(operation)
    }

    fn build_multimix(&mut self, operation: &mut Operation<H::Element>, mix: Multimix<H::Element>) -> Result<()> {
        let Multimix {
            filter,
            sort,
            insert,
            remove,
            change_layout,
        } = mix;

        if let Some(insert) = insert {
            self.insert_targets(operation, insert);
            operation.start_order = self.order.clone();
            operation.new_order = self.order.clone();
        }
        self.remember_all(operation);

        if let Some(remove) = remove {
            for element in &remove.targets {
                match self.index.get(element) {
                    Some(id) => operation.to_remove.push(*id),
                    None if self.config.debug.show_warnings => {
                        warn!(element = ?element, "cannot remove an element that is not a target");
                    }
                    None => {}
                }
            }
        }

        let sort = match sort {
            Some(sort) => Some(sort),
            None if !operation.inserted.is_empty() && !self.state.active_sort.is_default() => {
                Some(self.state.active_sort.clone())
            }
            None => None,
        };
        if let Some(sort) = sort {
            sort::evaluate(
                &self.host,
                &self.targets,
                &self.source,
                operation,
                &sort,
                self.config.debug.show_warnings,
            );
            self.pipeline.run(HookPoint::AfterSort, operation);
        }

        let filter = filter.unwrap_or_else(|| self.state.active_filter.clone());
        filter::evaluate(
            &self.host,
            &self.targets,
            operation,
            &filter,
            &self.config.selectors.target,
        );
        self.pipeline.run(HookPoint::AfterFilter, operation);

        if let Some(class_name) = change_layout {
            if class_name != operation.start_state.active_container_class {
                operation.will_change_layout = true;
                operation.new_container_class = class_name;
            }
        }
        Ok(())
    }

    fn build_dataset(&mut self, operation: &mut Operation<H::Element>, records: Vec<Record>) -> Result<()> {
        let Source::Dataset(dataset) = &mut self.source else {
            return Err(MixerError::MissingUidKey);
        };
        reconcile::reconcile(&mut self.host, &mut self.targets, dataset, operation, records)?;
        self.rebuild_index();
        self.remember_all(operation);
        self.pipeline.run(HookPoint::AfterDiff, operation);
        Ok(())
    }

    /// Insert new targets, hidden, at the requested position
    fn insert_targets(&mut self, operation: &mut Operation<H::Element>, insert: InsertCommand<H::Element>) {
        let InsertCommand {
            collection,
            position,
        } = insert;
        if collection.is_empty() {
            return;
        }

        let position_of = |element: &H::Element| {
            self.index
                .get(element)
                .and_then(|id| self.order.iter().position(|other| other == id))
        };
        let (at, before) = match position {
            InsertPosition::Index(index) => {
                let at = index.min(self.order.len());
                let before = match self.order.get(at) {
                    Some(id) => self.targets.get(*id).map(|target| target.element().clone()),
                    None => self
                        .order
                        .last()
                        .and_then(|id| self.targets.get(*id))
                        .and_then(|target| self.host.next_sibling(target.element())),
                };
                (at, before)
            }
            InsertPosition::Before(sibling) => (position_of(&sibling).unwrap_or(self.order.len()), Some(sibling)),
            InsertPosition::After(sibling) => {
                let at = position_of(&sibling).map_or(self.order.len(), |at| at + 1);
                (at, self.host.next_sibling(&sibling))
            }
        };

        let mut ids = Vec::with_capacity(collection.len());
        for element in &collection {
            self.host.set_displayed(element, false);
            let id = self.targets.insert(Target::new(element.clone(), false, true));
            self.index.insert(element.clone(), id);
            ids.push(id);
        }
        self.host.insert_before(&collection, before.as_ref());

        let before_id = self.order.get(at).copied();
        if let Source::Dom(dom) = &mut self.source {
            dom.insert(before_id, &ids);
        }
        self.order.splice(at..at, ids.iter().copied());
        debug!(count = ids.len(), at, "inserted targets");
        operation.inserted = ids;
    }

    fn remember_all(&self, operation: &mut Operation<H::Element>) {
        for (id, target) in &self.targets {
            operation.remember(id, target.element());
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .targets
            .iter()
            .map(|(id, target)| (target.element().clone(), id))
            .collect();
    }

    // =========================================================================
    // Execution
    // =========================================================================

    fn should_animate(&self, operation: &Operation<H::Element>, animate: bool) -> bool {
        let animation = &self.config.animation;
        let has_effects = !animation.effects.trim().is_empty()
            || animation.effects_in.as_deref().is_some_and(|e| !e.trim().is_empty())
            || animation.effects_out.as_deref().is_some_and(|e| !e.trim().is_empty());

        animate
            && animation.enable
            && animation.duration > 0
            && has_effects
            && self.host.is_rendered()
            && operation.has_changes()
            && !(operation.start_state.show.is_empty() && operation.show.is_empty())
    }

    fn execute(&mut self, mut operation: Operation<H::Element>, animate: bool, pending: Pending<H::Element>) {
        let future = operation
            .new_state
            .clone()
            .unwrap_or_else(|| Arc::new(State::from_operation(&operation)));
        self.subscribers.emit(&MixEvent::Start {
            current: self.state.clone(),
            future,
        });

        if !self.should_animate(&operation, animate) {
            debug!(operation = %operation.id, "completing without animation");
            self.clean_up(operation, pending, false);
            return;
        }

        self.pipeline.run(HookPoint::BeforeMeasure, &mut operation);
        flip::measure(
            &mut self.host,
            &mut self.targets,
            &mut operation,
            &self.settings,
            &self.config.animation,
        );
        self.pipeline.run(HookPoint::AfterMeasure, &mut operation);

        let animation = &self.config.animation;
        let mut container_style = ContainerStyle::default();
        if animation.apply_perspective {
            container_style.perspective = Some(animation.perspective_distance.clone());
            container_style.perspective_origin = Some(animation.perspective_origin.clone());
        }
        if animation.animate_resize_container {
            if animation.clamp_height {
                container_style.height = Some(operation.start_container.height);
            }
            if animation.clamp_width {
                container_style.width = Some(operation.start_container.width);
            }
            container_style.overflow_hidden = animation.clamp_height || animation.clamp_width;
        }
        if !container_style.is_clear() {
            self.host.set_container_style(&container_style);
        }

        let timing = TransitionTiming {
            duration_ms: animation.duration,
            easing: self.settings.easing,
            stagger_ms: self.settings.stagger_ms,
            sequence: self.stagger_sequence.clone(),
        };
        debug!(
            operation = %operation.id,
            duration = timing.duration_ms,
            stagger = timing.stagger_ms,
            "animating"
        );

        self.active = Some(Active {
            operation,
            phase: Phase::AwaitingMove,
            pending,
            timing,
            container_style,
            stagger: FxHashMap::default(),
            bound: 0,
            done: 0,
            immovable: 0,
        });
        self.host.request_frame();
    }

    /// Advance the running operation; call after each requested frame
    pub fn handle_frame(&mut self) {
        let Some(phase) = self.active.as_ref().map(|active| active.phase) else {
            return;
        };
        match phase {
            Phase::AwaitingMove => self.move_targets(),
            Phase::AwaitingStylesOut => self.apply_styles_out(),
            Phase::Transitioning => {}
        }
    }

    /// Write start styles, reveal targets and swap the layout class
    fn move_targets(&mut self) {
        let Self {
            host,
            targets,
            active,
            config,
            ..
        } = self;
        let Some(active) = active.as_mut() else {
            return;
        };
        let operation = &active.operation;
        let resize = config.animation.animate_resize_targets;

        let mut stagger_index = 0;
        for id in &operation.show {
            let (Some(target), Some(record)) = (targets.get_mut(*id), operation.tweens.get(id)) else {
                continue;
            };
            let status_change = !target.is_shown();
            target.apply_styles_in(host, record, resize);
            if status_change {
                target.show(host);
            }
            active.stagger.insert(*id, stagger_index);
            if record.will_transition(resize) {
                stagger_index += 1;
            }
        }
        for (i, id) in operation.to_hide.iter().enumerate() {
            let (Some(target), Some(record)) = (targets.get(*id), operation.tweens.get(id)) else {
                continue;
            };
            target.apply_styles_in(host, record, resize);
            active.stagger.insert(*id, i);
        }

        if operation.will_change_layout {
            host.swap_container_class(
                &operation.start_state.active_container_class,
                &operation.new_container_class,
            );
        }

        if config.animation.animate_resize_container {
            let duration = config.animation.duration;
            if config.animation.clamp_height {
                active.container_style.height = Some(operation.new_container.height);
            }
            if config.animation.clamp_width {
                active.container_style.width = Some(operation.new_container.width);
            }
            active.container_style.transition = Some(format!(
                "height {}ms ease, width {}ms ease",
                duration, duration
            ));
            host.set_container_style(&active.container_style);
        }

        active.phase = Phase::AwaitingStylesOut;
        host.request_frame();
    }

    /// Write end styles with transitions and bind every moving target
    fn apply_styles_out(&mut self) {
        let finished = {
            let Self {
                host,
                targets,
                active,
                config,
                ..
            } = self;
            let Some(active) = active.as_mut() else {
                return;
            };
            let operation = &active.operation;
            let resize = config.animation.animate_resize_targets;

            for id in operation.show.iter().chain(&operation.to_hide) {
                let (Some(target), Some(record)) = (targets.get_mut(*id), operation.tweens.get(id)) else {
                    continue;
                };
                if !record.will_transition(resize) {
                    active.immovable += 1;
                    continue;
                }
                let stagger_index = active.stagger.get(id).copied().unwrap_or(0);
                let fading = record.pos_in.opacity != record.pos_out.opacity;
                let transition = active.timing.transition_css(stagger_index, fading, resize);
                target.apply_styles_out(host, record, transition, resize);
                target.bind(operation.id);
                active.bound += 1;
            }

            active.phase = Phase::Transitioning;
            debug!(
                operation = %operation.id,
                bound = active.bound,
                immovable = active.immovable,
                "targets moving"
            );
            active.bound == 0
        };

        if finished {
            self.complete_active();
        }
    }

    /// Report that `element` finished transitioning `property`
    pub fn handle_transition_end(&mut self, element: &H::Element, property: &str) {
        let resize = self.config.animation.animate_resize_targets;
        let Some(id) = self.index.get(element).copied() else {
            return;
        };
        let Some(operation_id) = self
            .targets
            .get_mut(id)
            .and_then(|target| target.handle_transition_end(property, resize))
        else {
            return;
        };
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.operation.id != operation_id || active.phase != Phase::Transitioning {
            return;
        }
        active.done += 1;
        if active.done >= active.bound {
            self.complete_active();
        }
    }

    fn complete_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.clean_up(active.operation, active.pending, true);
        }
    }

    /// Settle the DOM, publish the new state and run the next queued request
    fn clean_up(&mut self, mut operation: Operation<H::Element>, pending: Pending<H::Element>, animated: bool) {
        for id in &operation.show {
            if let Some(target) = self.targets.get_mut(*id) {
                target.clean_up(&mut self.host);
                target.show(&mut self.host);
            }
        }
        for id in &operation.to_hide {
            if let Some(target) = self.targets.get_mut(*id) {
                target.clean_up(&mut self.host);
                target.hide(&mut self.host);
            }
        }

        if operation.will_sort {
            self.host.arrange(&operation.elements_of(&operation.new_order));
        }
        if animated {
            self.host.set_container_style(&ContainerStyle::default());
        } else if operation.will_change_layout {
            self.host.swap_container_class(
                &operation.start_state.active_container_class,
                &operation.new_container_class,
            );
        }

        for id in &operation.to_remove {
            if let Some(target) = self.targets.remove(*id) {
                self.host.detach(target.element());
                self.index.remove(target.element());
                self.source.forget(*id, target.uid());
            }
        }

        let removed: FxHashSet<TargetId> = operation.to_remove.iter().copied().collect();
        if operation.will_sort || self.source.is_dataset() {
            self.order = operation.new_order.clone();
        }
        self.order.retain(|id| !removed.contains(id));

        if let (Source::Dataset(dataset), Command::Dataset(_)) = (&mut self.source, &operation.command) {
            if let Some(records) = &operation.new_dataset {
                dataset.set_active(records.clone());
            }
        }

        let state = operation
            .new_state
            .clone()
            .unwrap_or_else(|| Arc::new(State::from_operation(&operation)));
        self.state = state.clone();
        self.pipeline.run(HookPoint::AfterCleanUp, &mut operation);

        debug!(
            operation = %operation.id,
            show = state.total_show,
            hide = state.total_hide,
            failed = state.has_failed,
            "operation complete"
        );
        self.last_operation = Some(operation);

        self.subscribers.emit(&MixEvent::End {
            state: state.clone(),
        });
        if state.has_failed {
            self.subscribers.emit(&MixEvent::Fail {
                state: state.clone(),
            });
        }
        pending.resolve(&state);

        self.next_queued();
    }

    /// Run queued requests until one starts animating or the queue is empty
    fn next_queued(&mut self) {
        while let Some(item) = self.queue.pop() {
            let QueueItem {
                command,
                animate,
                trigger,
                pending,
            } = item;

            let built = self
                .validate(&command)
                .and_then(|()| self.build_operation(command, trigger));
            match built {
                Ok(operation) => {
                    debug!(operation = %operation.id, remaining = self.queue.len(), "running queued request");
                    self.execute(operation, animate, pending);
                    return;
                }
                Err(err) => {
                    if self.config.debug.show_warnings {
                        warn!(error = %err, "queued request is no longer valid");
                    }
                    pending.resolve(&self.state);
                }
            }
        }
    }

    // =========================================================================
    // Scrubbing
    // =========================================================================

    /// Build and measure an operation without running it
    ///
    /// Only filter, sort and layout changes can be prepared. Pass the result
    /// to [`Mixer::tween`] to render any point of the transition.
    pub fn prepare(&mut self, command: Command<H::Element>) -> Result<Operation<H::Element>> {
        if self.is_busy() {
            return Err(MixerError::InvalidCommand(
                "cannot prepare an operation while mixing".to_string(),
            ));
        }
        let preparable = match &command {
            Command::Filter(_) | Command::Sort(_) | Command::ChangeLayout(_) => true,
            Command::Multimix(mix) => !mix.has_mutation(),
            Command::Insert(_) | Command::Remove(_) | Command::Dataset(_) => false,
        };
        if !preparable {
            return Err(MixerError::InvalidCommand(
                "only filter, sort and layout changes can be prepared".to_string(),
            ));
        }
        self.validate(&command)?;

        let mut operation = self.build_operation(command, None)?;
        flip::measure(
            &mut self.host,
            &mut self.targets,
            &mut operation,
            &self.settings,
            &self.config.animation,
        );
        Ok(operation)
    }

    /// Render `operation` at `multiplier` (clamped to `0.0..=1.0`) of the way through
    pub fn tween(&mut self, operation: &Operation<H::Element>, multiplier: f32) {
        let resize = self.config.animation.animate_resize_targets;
        for id in &operation.to_show {
            if let Some(target) = self.targets.get(*id) {
                self.host.set_displayed(target.element(), true);
            }
        }
        for id in operation.measured() {
            if let (Some(target), Some(record)) = (self.targets.get(id), operation.tweens.get(&id)) {
                target.apply_tween(&mut self.host, record, multiplier, resize);
            }
        }
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Re-read the container after it was changed from outside
    ///
    /// New matching children become targets (appended to the insertion
    /// order); targets no longer in the container are dropped.
    pub fn force_refresh(&mut self) {
        if self.is_busy() || self.source.is_dataset() {
            if self.config.debug.show_warnings {
                warn!("force_refresh ignored while mixing or in dataset mode");
            }
            return;
        }

        let children: Vec<H::Element> = self
            .host
            .children()
            .into_iter()
            .filter(|el| self.host.matches(el, &self.config.selectors.target))
            .collect();
        let present: FxHashSet<&H::Element> = children.iter().collect();

        let stale: Vec<TargetId> = self
            .targets
            .iter()
            .filter(|(_, target)| !present.contains(target.element()))
            .map(|(id, _)| id)
            .collect();
        for id in stale {
            if let Some(target) = self.targets.remove(id) {
                self.index.remove(target.element());
                self.source.forget(id, None);
            }
        }

        let mut added = Vec::new();
        let mut order = Vec::with_capacity(children.len());
        for element in children {
            let id = match self.index.get(&element) {
                Some(id) => *id,
                None => {
                    let id = self.targets.insert(Target::new(element.clone(), true, true));
                    self.index.insert(element, id);
                    added.push(id);
                    id
                }
            };
            order.push(id);
        }
        if let Source::Dom(dom) = &mut self.source {
            dom.insert(None, &added);
        }
        self.order = order;
        debug!(targets = self.order.len(), added = added.len(), "refreshed targets");
    }

    /// Re-render every dataset target from its current record
    pub fn force_render(&mut self) -> Result<()> {
        let Self {
            host,
            targets,
            index,
            ..
        } = self;
        for (id, target) in targets.iter_mut() {
            let Some(record) = target.data().cloned() else {
                continue;
            };
            let uid = target.uid().unwrap_or_default().to_string();
            let element = host
                .render(&record, Some(target.element()))
                .ok_or(MixerError::MissingRenderer(uid))?;
            if element != *target.element() {
                host.replace(target.element(), &element);
                host.set_displayed(&element, target.is_shown());
                index.remove(target.element());
                index.insert(element.clone(), id);
                target.set_element(element);
            }
        }
        Ok(())
    }

    /// Tear the mixer down
    ///
    /// Inline styles are cleared, every waiting request resolves with the
    /// current state and later requests are turned away.
    pub fn destroy(&mut self) {
        if self.is_destroyed {
            return;
        }
        let state = self.state.clone();

        if let Some(active) = self.active.take() {
            active.pending.resolve(&state);
        }
        for item in self.queue.drain() {
            item.pending.resolve(&state);
        }
        for (_, target) in self.targets.iter_mut() {
            target.clean_up(&mut self.host);
        }
        self.host.set_container_style(&ContainerStyle::default());
        self.subscribers.clear();
        self.is_destroyed = true;
        debug!("mixer destroyed");
    }
}
