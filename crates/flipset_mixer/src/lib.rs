//! Flipset Mixer
//!
//! Animated filter, sort, insert, remove, layout and dataset operations over
//! the children of one container.
//!
//! - **Operations**: Each request is diffed into an operation (what shows,
//!   what hides, the new order) before anything moves
//! - **FLIP**: Geometry is captured in four phases and every target animates
//!   from where it was to where the new layout puts it
//! - **Queue**: Requests made mid-animation wait in a bounded FIFO and run in
//!   order
//! - **Datasets**: Keyed reconciliation of record lists against rendered
//!   targets
//! - **Events**: Start, end, fail and busy notifications to subscribers
//!
//! # Example
//!
//! ```ignore
//! use flipset_mixer::prelude::*;
//!
//! let mut mixer = Mixer::new(host, MixerConfig::from_toml_str(CONFIG)?)?;
//! mixer.subscribe(|event| {
//!     if let MixEvent::End { state } = event {
//!         tracing::info!(shown = state.total_show, "mix complete");
//!     }
//! });
//!
//! let handle = mixer.filter(".category-a")?;
//! // ... the host calls mixer.handle_frame() and mixer.handle_transition_end()
//! let state = pollster::block_on(handle)?;
//! ```

pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod handle;
pub mod operation;
pub mod pipeline;
pub mod source;
pub mod state;
pub mod target;

mod filter;
mod flip;
mod mixer;
mod parse;
mod queue;
mod reconcile;
mod sort;

#[cfg(test)]
mod mock;

pub use command::{
    Command, FilterAction, FilterCommand, InsertCommand, InsertPosition, Multimix, OnComplete,
    RemoveCommand, Request, SortCommand, SortOrder,
};
pub use config::{
    AnimationConfig, DataConfig, DebugConfig, LayoutConfig, LoadConfig, MixerConfig,
    SelectorsConfig,
};
pub use coordinator::Coordinator;
pub use error::{MixerError, Result};
pub use events::{MixEvent, SubscriptionId};
pub use handle::{Admission, MixHandle};
pub use mixer::Mixer;
pub use operation::{Operation, OperationId};
pub use parse::parse_sort;
pub use pipeline::{FnStage, HookPoint, Pipeline, Stage};
pub use source::{DatasetSource, DomSource, Source};
pub use state::State;
pub use target::{Target, TargetId};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::command::{Command, FilterCommand, Multimix, Request, SortCommand, SortOrder};
    pub use crate::config::MixerConfig;
    pub use crate::error::{MixerError, Result};
    pub use crate::events::MixEvent;
    pub use crate::handle::{Admission, MixHandle};
    pub use crate::mixer::Mixer;
    pub use crate::pipeline::{HookPoint, Pipeline};
    pub use crate::state::State;

    pub use flipset_core::{Bounds, ContainerStyle, Host, Margins, Record, StyleDeclaration};
}
