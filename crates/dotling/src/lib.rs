#![forbid(unsafe_code)]

//! Headless Dorling-style layout engine for weighted land nodes.
//!
//! Sizes geographic entities as circles by population/area, spreads their
//! anchors with a recursive equal-mass redistribution, and relaxes
//! circle-circle collisions iteratively while tethering each circle to its
//! anchor and rescaling the whole configuration into a fixed frame. The
//! engine is runtime-agnostic: an external loop drives
//! [`Simulator::step`] and owns rendering and persistence.

pub mod adjacency;
pub mod density;
pub mod error;
pub mod geom;
pub mod mass;
pub mod model;
pub mod quadtree;
pub mod sim;
pub mod snapshot;

pub use error::{Error, Result};
pub use model::{LandLink, LandNode, LayoutState, LinkRecord, NodeRecord, Tunables};
pub use sim::{Bounds, Phase, Simulator, bounding_box, center_of_mass, node_home};
pub use snapshot::Snapshot;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
