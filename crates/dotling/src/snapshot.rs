//! Serializable snapshot of a layout run.
//!
//! The persistence collaborator owns where this goes; the engine only
//! guarantees the shape: the full tunable/counter state plus per-node
//! placements.

use crate::model::Tunables;
use crate::sim::Simulator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SnapshotState,
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotState {
    #[serde(flatten)]
    pub tunables: Tunables,
    pub surface: f64,
    pub max_population: f64,
    pub max_area: f64,
    pub density: f64,
    pub ticks: u64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub code: String,
    pub name: String,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
}

impl Snapshot {
    pub fn capture(sim: &Simulator) -> Self {
        let state = sim.state();
        Self {
            state: SnapshotState {
                tunables: state.tunables().clone(),
                surface: state.surface,
                max_population: state.max_population,
                max_area: state.max_area,
                density: state.density,
                ticks: state.ticks,
                alpha: state.alpha,
            },
            nodes: sim
                .nodes()
                .iter()
                .map(|n| SnapshotNode {
                    code: n.code.clone(),
                    name: n.name.clone(),
                    radius: n.radius,
                    x: n.position.x,
                    y: n.position.y,
                })
                .collect(),
        }
    }
}
