//! Core node/link types and the tunable layout state.
//!
//! These are intentionally lightweight and `Clone`-friendly so deterministic
//! tests can snapshot and diff whole node sets.

use crate::error::{Error, Result};
use crate::geom::{Point, point};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One land entity as supplied by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub code: String,
    pub name: String,
    pub population: f64,
    pub area: f64,
    pub lon: f64,
    pub lat: f64,
    pub group: String,
    pub continent: String,
    /// Total boundary length of the entity, shared-perimeter denominator for
    /// link weighting.
    pub perimeter: f64,
}

/// One undirected land adjacency as supplied by the loader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: usize,
    pub target: usize,
    pub perimeter: f64,
}

/// A land entity plus its derived simulation state.
#[derive(Debug, Clone)]
pub struct LandNode {
    pub code: String,
    pub name: String,
    pub population: f64,
    pub area: f64,
    pub group: String,
    pub continent: String,
    pub perimeter: f64,

    /// Layout-space anchor projected from the geographic coordinates.
    pub home: Point,
    /// Anchor after recursive equal-mass redistribution (see `density`).
    pub home_even: Point,
    pub mass: f64,
    pub radius: f64,
    pub position: Point,
    /// Land-adjacent neighbor indices. Distinct from the collision graph:
    /// linked nodes are allowed to sit closer together.
    pub links: FxHashSet<usize>,
}

impl LandNode {
    pub(crate) fn from_record(record: NodeRecord, home: Point) -> Self {
        Self {
            code: record.code,
            name: record.name,
            population: record.population,
            area: record.area,
            group: record.group,
            continent: record.continent,
            perimeter: record.perimeter,
            home,
            home_even: home,
            mass: 1.0,
            radius: 0.0,
            position: home,
            links: FxHashSet::default(),
        }
    }
}

/// An undirected land adjacency with its derived strength.
#[derive(Debug, Clone, Copy)]
pub struct LandLink {
    pub source: usize,
    pub target: usize,
    pub perimeter: f64,
    /// Relative shared-boundary strength in `(0, 1]`. Computed once by the
    /// adjacency builder and immutable thereafter.
    pub weight: f64,
}

/// The full tunable configuration.
///
/// Every field is a plain scalar so external edits can be validated and then
/// swapped in atomically between steps (`LayoutState::apply`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tunables {
    pub width: f64,
    pub height: f64,

    pub pop_scale: f64,
    pub area_scale: f64,
    pub size_power: f64,

    pub start_density: f64,
    pub target_density: f64,
    pub step_density: f64,

    /// Electrostatic coefficient forwarded to an external force integrator,
    /// if any. Carried and validated but not interpreted by this engine.
    pub charge_gain: f64,
    /// Link-force coefficient for an external force integrator; same
    /// pass-through status as `charge_gain`.
    pub link_gain: f64,
    pub home_gain: f64,
    /// Blend between the geographic anchor (0) and the density-equalized
    /// anchor (1).
    pub home_even_density: f64,
    pub frame_gain: f64,
    pub frame_padding: f64,

    pub sea_distance: f64,
    pub group_distance: f64,

    /// Bisection depth of the density normalizer. Fixed after construction:
    /// the equal-mass partition is computed once and only the blend above is
    /// adjustable live.
    pub even_octaves: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            pop_scale: 5.0,
            area_scale: 2.5,
            size_power: 0.5,
            start_density: 0.05,
            target_density: 0.4,
            step_density: 0.002,
            charge_gain: 0.0,
            link_gain: 38.0,
            home_gain: 0.8,
            home_even_density: 1.0,
            frame_gain: 3.0,
            frame_padding: 30.0,
            sea_distance: 5.0,
            group_distance: 22.0,
            even_octaves: 4,
        }
    }
}

fn require(name: &'static str, value: f64, ok: bool) -> Result<()> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(Error::InvalidTunable { name, value })
    }
}

impl Tunables {
    /// Rejects values outside their valid domain. Callers keep the previous
    /// configuration when this fails.
    pub fn validate(&self) -> Result<()> {
        require("width", self.width, self.width > 0.0)?;
        require("height", self.height, self.height > 0.0)?;
        require("popScale", self.pop_scale, self.pop_scale >= 0.0)?;
        require("areaScale", self.area_scale, self.area_scale >= 0.0)?;
        require("sizePower", self.size_power, self.size_power >= 0.0)?;
        require(
            "startDensity",
            self.start_density,
            self.start_density > 0.0 && self.start_density <= 1.0,
        )?;
        require(
            "targetDensity",
            self.target_density,
            self.target_density > 0.0 && self.target_density <= 1.0,
        )?;
        require("stepDensity", self.step_density, self.step_density > 0.0)?;
        require("chargeGain", self.charge_gain, true)?;
        require("linkGain", self.link_gain, self.link_gain >= 0.0)?;
        require("homeGain", self.home_gain, self.home_gain >= 0.0)?;
        require(
            "homeEvenDensity",
            self.home_even_density,
            (0.0..=1.0).contains(&self.home_even_density),
        )?;
        require("frameGain", self.frame_gain, self.frame_gain >= 0.0)?;
        require(
            "framePadding",
            self.frame_padding,
            self.frame_padding >= 0.0 && 2.0 * self.frame_padding < self.width.min(self.height),
        )?;
        require("seaDistance", self.sea_distance, self.sea_distance >= 0.0)?;
        require(
            "groupDistance",
            self.group_distance,
            self.group_distance >= 0.0,
        )?;
        Ok(())
    }
}

/// Tunables plus the derived quantities and running counters of one layout
/// run. Constructed once per run; the simulator owns all mutation during
/// stepping.
#[derive(Debug, Clone)]
pub struct LayoutState {
    tunables: Tunables,

    /// `width × height`, fixed at construction.
    pub surface: f64,
    /// Global maxima over the node set, computed once at initialization and
    /// never recomputed mid-run (sizes must not react to external edits of
    /// individual nodes).
    pub max_population: f64,
    pub max_area: f64,

    /// Current disk coverage fraction, walked toward `target_density` one
    /// `step_density` at a time.
    pub density: f64,
    /// Monotonic step counter.
    pub ticks: u64,
    /// Alpha supplied with the most recent step, recorded for snapshots.
    pub alpha: f64,
}

impl LayoutState {
    pub fn new(tunables: Tunables, nodes: &[NodeRecord]) -> Result<Self> {
        tunables.validate()?;
        let surface = tunables.width * tunables.height;
        let max_population = nodes.iter().fold(0.0_f64, |m, n| m.max(n.population));
        let max_area = nodes.iter().fold(0.0_f64, |m, n| m.max(n.area));
        let density = tunables.start_density;
        Ok(Self {
            tunables,
            surface,
            max_population,
            max_area,
            density,
            ticks: 0,
            alpha: 0.0,
        })
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Replaces the tunable block atomically. On error the previous values
    /// are retained. Canvas dimensions and the bisection depth derive other
    /// state (`surface`, both home projections) and are fixed for the run.
    pub fn apply(&mut self, next: Tunables) -> Result<()> {
        next.validate()?;
        if next.width != self.tunables.width {
            return Err(Error::FixedTunable { name: "width" });
        }
        if next.height != self.tunables.height {
            return Err(Error::FixedTunable { name: "height" });
        }
        if next.even_octaves != self.tunables.even_octaves {
            return Err(Error::FixedTunable {
                name: "evenOctaves",
            });
        }
        self.tunables = next;
        Ok(())
    }

    /// Resets the running counters to their start-of-run values.
    pub fn reset(&mut self) {
        self.density = self.tunables.start_density;
        self.ticks = 0;
        self.alpha = 0.0;
    }

    /// Projects geographic coordinates into layout space: lon −180→0,
    /// 180→width; lat 90→0, −90→height.
    pub fn project(&self, lon: f64, lat: f64) -> Point {
        let x = (lon + 180.0) / 360.0 * self.tunables.width;
        let y = (90.0 - lat) / 180.0 * self.tunables.height;
        point(x, y)
    }
}
