//! Layout simulator: the per-step relaxation loop.
//!
//! The simulator performs no scheduling of its own. An external stepping
//! authority (typically a render/event loop) drives it through the
//! `start`/`step`/`pause`/`resume`/`reset` contract and supplies a per-step
//! alpha that scales every force.

use crate::adjacency;
use crate::density::{Axis, spread_axis};
use crate::error::Result;
use crate::geom::{Point, lerp, point};
use crate::mass::update_radii;
use crate::model::{LandLink, LandNode, LayoutState, LinkRecord, NodeRecord, Tunables};
use crate::quadtree::Quadtree;

/// Fixed margin added to a node's radius when querying the spatial
/// partition, so near-misses within force range are still visited.
const COLLIDE_MARGIN: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Axis-aligned bounding box of the node disks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_lo: f64,
    pub x_hi: f64,
    pub y_lo: f64,
    pub y_hi: f64,
}

/// Mass-weighted center of the node set. `None` when total mass is zero.
pub fn center_of_mass(nodes: &[LandNode]) -> Option<Point> {
    let mut x_sum = 0.0;
    let mut y_sum = 0.0;
    let mut sum = 0.0;
    for node in nodes {
        x_sum += node.position.x * node.mass;
        y_sum += node.position.y * node.mass;
        sum += node.mass;
    }
    if sum <= 0.0 {
        return None;
    }
    Some(point(x_sum / sum, y_sum / sum))
}

/// Disk bounding box of the node set. `None` when the set is empty.
pub fn bounding_box(nodes: &[LandNode]) -> Option<Bounds> {
    let mut iter = nodes.iter();
    let first = iter.next()?;
    let mut b = Bounds {
        x_lo: first.position.x - first.radius,
        x_hi: first.position.x + first.radius,
        y_lo: first.position.y - first.radius,
        y_hi: first.position.y + first.radius,
    };
    for node in iter {
        b.x_lo = b.x_lo.min(node.position.x - node.radius);
        b.x_hi = b.x_hi.max(node.position.x + node.radius);
        b.y_lo = b.y_lo.min(node.position.y - node.radius);
        b.y_hi = b.y_hi.max(node.position.y + node.radius);
    }
    Some(b)
}

/// Blend of a node's geographic anchor and its density-equalized anchor,
/// controlled by the `home_even_density` tunable.
pub fn node_home(node: &LandNode, state: &LayoutState) -> Point {
    let t = state.tunables().home_even_density;
    point(
        lerp(node.home.x, node.home_even.x, t),
        lerp(node.home.y, node.home_even.y, t),
    )
}

/// Owns the node set and layout state for one run.
///
/// All mutation of positions, radii, masses and counters happens inside
/// `step`; external callers may only swap tunables between steps
/// (`set_tunables`), which `&mut self` keeps exclusive.
#[derive(Debug)]
pub struct Simulator {
    nodes: Vec<LandNode>,
    links: Vec<LandLink>,
    state: LayoutState,
    phase: Phase,
}

impl Simulator {
    /// Builds a simulator from loader records.
    ///
    /// Projects geographic coordinates into layout space, sizes every disk
    /// for the start density, runs the density normalizer on both axes, and
    /// seats every node at its blended home.
    pub fn new(
        nodes: Vec<NodeRecord>,
        links: Vec<LinkRecord>,
        tunables: Tunables,
    ) -> Result<Self> {
        let state = LayoutState::new(tunables, &nodes)?;

        let mut nodes: Vec<LandNode> = nodes
            .into_iter()
            .map(|record| {
                let home = state.project(record.lon, record.lat);
                LandNode::from_record(record, home)
            })
            .collect();
        let links = adjacency::link_nodes(&mut nodes, &links)?;

        update_radii(&mut nodes, &state);

        let t = state.tunables();
        spread_axis(&mut nodes, Axis::X, 0.0, t.width, t.even_octaves);
        spread_axis(&mut nodes, Axis::Y, 0.0, t.height, t.even_octaves);

        let mut sim = Self {
            nodes,
            links,
            state,
            phase: Phase::Idle,
        };
        sim.seat_at_homes();
        Ok(sim)
    }

    pub fn nodes(&self) -> &[LandNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[LandLink] {
        &self.links
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Per-node `(x, y, radius)` of the current configuration, in node
    /// order, for renderers.
    pub fn placements(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.nodes
            .iter()
            .map(|n| (n.position.x, n.position.y, n.radius))
    }

    /// Replaces the tunable block atomically between steps. On error the
    /// run continues with the previous valid configuration.
    pub fn set_tunables(&mut self, tunables: Tunables) -> Result<()> {
        self.state.apply(tunables)
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
            tracing::debug!(ticks = self.state.ticks, "simulation started");
        }
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    /// Returns to `Idle` with the start density, zero ticks, radii sized
    /// for the start density, and every node reseated at its blended home.
    pub fn reset(&mut self) {
        self.state.reset();
        update_radii(&mut self.nodes, &self.state);
        self.seat_at_homes();
        self.phase = Phase::Idle;
        tracing::debug!(density = self.state.density, "simulation reset");
    }

    fn seat_at_homes(&mut self) {
        for i in 0..self.nodes.len() {
            let home = node_home(&self.nodes[i], &self.state);
            self.nodes[i].position = home;
        }
    }

    /// One complete relaxation pass. Returns `false` (and does nothing)
    /// unless the simulator is running and `alpha` is a finite scalar.
    ///
    /// Passes run in a fixed order: density retarget, collision resolution,
    /// home tethering, frame fitting, tick accounting.
    pub fn step(&mut self, alpha: f64) -> bool {
        if self.phase != Phase::Running || !alpha.is_finite() || alpha < 0.0 {
            return false;
        }

        self.retarget_density();
        self.collide();
        self.tether(alpha);
        self.fit_frame(alpha);

        self.state.ticks += 1;
        self.state.alpha = alpha;
        tracing::trace!(ticks = self.state.ticks, alpha, "step");
        true
    }

    /// Walks `density` one clamped increment toward the target, re-sizing
    /// every disk when it moves. Produces a smooth animated transition when
    /// the target tunable is edited externally.
    fn retarget_density(&mut self) {
        let t = self.state.tunables();
        let remaining = t.target_density - self.state.density;
        if remaining == 0.0 {
            return;
        }
        let increment = t.step_density.min(remaining.abs());
        self.state.density += increment.copysign(remaining);
        update_radii(&mut self.nodes, &self.state);
        tracing::debug!(density = self.state.density, "density retarget");
    }

    /// Single-pass approximate collision relaxation over a fresh spatial
    /// partition. Residual overlap after one pass is expected; it resolves
    /// progressively over many steps.
    fn collide(&mut self) {
        let tree = Quadtree::build(self.nodes.iter().enumerate().map(|(i, n)| (i, n.position)));
        let t = self.state.tunables();
        let sea_distance = t.sea_distance;
        let group_distance = t.group_distance;

        let nodes = &mut self.nodes;
        for i in 0..nodes.len() {
            let reach = nodes[i].radius + COLLIDE_MARGIN;
            let qx = nodes[i].position.x;
            let qy = nodes[i].position.y;
            tree.visit(qx - reach, qy - reach, qx + reach, qy + reach, |j| {
                if j != i {
                    resolve_pair(nodes, i, j, sea_distance, group_distance);
                }
            });
        }
    }

    /// Pulls every node a mass-scaled fraction of the way to its blended
    /// home. Heavier entities are pulled harder, keeping large disks
    /// anchored.
    fn tether(&mut self, alpha: f64) {
        let gain = self.state.tunables().home_gain;
        if gain <= 0.0 {
            return;
        }
        let k = gain * alpha;
        for i in 0..self.nodes.len() {
            let home = node_home(&self.nodes[i], &self.state);
            let node = &mut self.nodes[i];
            node.position.x += (home.x - node.position.x) * k * node.mass;
            node.position.y += (home.y - node.position.y) * k * node.mass;
        }
    }

    /// Moves every node toward the position it would hold if the disk
    /// bounding box were rescaled into the padded canvas. Counteracts drift
    /// and expansion from the collision and tether passes.
    fn fit_frame(&mut self, alpha: f64) {
        let t = self.state.tunables();
        let gain = t.frame_gain;
        if gain <= 0.0 {
            return;
        }
        let Some(bbox) = bounding_box(&self.nodes) else {
            return;
        };
        let com = center_of_mass(&self.nodes);
        tracing::trace!(?com, ?bbox, "frame fit");

        // Zero-span axes (all disks stacked on a line) are left unscaled
        // rather than dividing by zero.
        let x_span = bbox.x_hi - bbox.x_lo;
        let y_span = bbox.y_hi - bbox.y_lo;
        let x_scale = if x_span > 0.0 {
            (t.width - 2.0 * t.frame_padding) / x_span
        } else {
            1.0
        };
        let y_scale = if y_span > 0.0 {
            (t.height - 2.0 * t.frame_padding) / y_span
        } else {
            1.0
        };
        let padding = t.frame_padding;
        let k = gain * alpha;

        for node in &mut self.nodes {
            let dx = (node.position.x - bbox.x_lo) * x_scale + padding - node.position.x;
            let dy = (node.position.y - bbox.y_lo) * y_scale + padding - node.position.y;
            node.position.x += dx * k;
            node.position.y += dy * k;
        }
    }
}

/// Symmetric pairwise repulsion for one candidate pair.
///
/// Required separation is the radius sum, widened by `sea_distance` when the
/// pair is not land-linked and by `group_distance` when it additionally
/// spans two groups. Overlap is split 50/50 between both nodes regardless of
/// mass. Exactly coincident pairs are skipped: there is no separating
/// direction and dividing by zero distance would poison both positions.
fn resolve_pair(nodes: &mut [LandNode], i: usize, j: usize, sea_distance: f64, group_distance: f64) {
    let dx = nodes[i].position.x - nodes[j].position.x;
    let dy = nodes[i].position.y - nodes[j].position.y;
    let l = (dx * dx + dy * dy).sqrt();

    let mut r = nodes[i].radius + nodes[j].radius;
    if !nodes[i].links.contains(&j) {
        r += sea_distance;
        if nodes[i].group != nodes[j].group {
            r += group_distance;
        }
    }

    if l < r && l > 0.0 {
        let k = (l - r) / l * 0.5;
        let sx = dx * k;
        let sy = dy * k;
        nodes[i].position.x -= sx;
        nodes[i].position.y -= sy;
        nodes[j].position.x += sx;
        nodes[j].position.y += sy;
    }
}
