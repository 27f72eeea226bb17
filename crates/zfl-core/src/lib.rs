//! Core types shared by the ZFL event-flow pipeline.
//!
//! - [`span`] and [`source`]: byte spans and 1-based source locations
//! - [`diagnostic`]: diagnostics reported by every stage
//! - [`semantic`]: the typed semantic model produced by analysis
//! - [`flow`]: the node/edge flow IR
//! - [`geometry`]: points, sizes and bounds used by layout

pub mod diagnostic;
pub mod flow;
pub mod geometry;
pub mod semantic;
pub mod source;
pub mod span;
