//! Flipset Core
//!
//! Foundational types shared by every Flipset crate:
//!
//! - **Host**: The collaborator that owns rendered elements, reports their
//!   geometry and accepts style declarations back
//! - **Geometry**: Bounds, margins and the per-checkpoint position snapshot
//! - **Style**: Declarations written to targets and to their container
//!
//! The engine never performs layout. Everything it knows about positions comes
//! from [`Host`] reads, and everything it changes goes through [`Host`] writes.

pub mod geometry;
pub mod host;
pub mod style;

pub use geometry::{Bounds, Margins, PosData};
pub use host::{Host, Record};
pub use style::{ContainerStyle, StyleDeclaration};
