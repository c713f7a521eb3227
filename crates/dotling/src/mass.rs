//! Magnitude model: node mass from population/area, disk radius from mass
//! and the global density target.

use crate::model::{LandNode, LayoutState};

/// Relative sizing weight of one node.
///
/// `1 + popScale·(population/maxPopulation)^sizePower +
/// areaScale·(area/maxArea)^sizePower`. The additive floor keeps every node
/// at mass ≥ 1 so no disk degenerates to a point. A zero global maximum
/// contributes nothing for that term rather than dividing by zero.
pub fn land_mass(node: &LandNode, state: &LayoutState) -> f64 {
    let t = state.tunables();
    let mut mass = 1.0;
    if state.max_population > 0.0 {
        mass += t.pop_scale * (node.population / state.max_population).powf(t.size_power);
    }
    if state.max_area > 0.0 {
        mass += t.area_scale * (node.area / state.max_area).powf(t.size_power);
    }
    mass
}

/// Recomputes every mass and radius for the current density.
///
/// Radii are sized so the disk areas sum to exactly `surface × density`
/// (coverage ignoring overlap). Must be re-invoked whenever `density` or any
/// sizing coefficient changes; idempotent for unchanged inputs.
pub fn update_radii(nodes: &mut [LandNode], state: &LayoutState) {
    let mut total_mass = 0.0;
    for node in nodes.iter_mut() {
        node.mass = land_mass(node, state);
        total_mass += node.mass;
    }
    if total_mass <= 0.0 {
        return;
    }
    let area_per_mass = state.surface * state.density / total_mass;
    for node in nodes.iter_mut() {
        node.radius = (node.mass * area_per_mass / std::f64::consts::PI).sqrt();
    }
}
