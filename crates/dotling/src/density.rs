//! Density normalizer: redistributes anchor coordinates along one axis so
//! cumulative mass spreads evenly across the canvas.
//!
//! Raw geographic coordinates cluster nodes unevenly. Each pass bisects the
//! subset at its mass-weighted centroid and linearly remaps both halves onto
//! equal shares of the range, then descends into each half with the narrowed
//! range. `octaves` levels produce `2^octaves` cells of approximately equal
//! total mass and canvas width. Only the `home_even` field is written; the
//! true `home` anchor is blended with it at use time.

use crate::model::LandNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn get(self, node: &LandNode) -> f64 {
        match self {
            Axis::X => node.home_even.x,
            Axis::Y => node.home_even.y,
        }
    }

    fn set(self, node: &mut LandNode, value: f64) {
        match self {
            Axis::X => node.home_even.x = value,
            Axis::Y => node.home_even.y = value,
        }
    }
}

struct Frame {
    subset: Vec<usize>,
    lo: f64,
    hi: f64,
    depth: u32,
}

/// Equal-mass bisection of `home_even` coordinates on one axis.
///
/// Iterative over an explicit work stack rather than recursive, so large
/// octave counts cannot exhaust the call stack. Zero-total-mass subsets and
/// zero-span halves are left unmoved (no division, no NaN).
///
/// A singleton subset sits exactly at its own centroid, lands in the right
/// group, and remaps to the range midpoint; descending octaves walk it onto
/// ever-finer dyadic cell midpoints.
pub fn spread_axis(nodes: &mut [LandNode], axis: Axis, lo: f64, hi: f64, octaves: u32) {
    let mut stack = vec![Frame {
        subset: (0..nodes.len()).collect(),
        lo,
        hi,
        depth: octaves,
    }];

    while let Some(frame) = stack.pop() {
        let Frame {
            subset,
            lo,
            hi,
            depth,
        } = frame;
        if hi <= lo {
            continue;
        }

        let mut weighted = 0.0;
        let mut mass = 0.0;
        for &i in &subset {
            weighted += axis.get(&nodes[i]) * nodes[i].mass;
            mass += nodes[i].mass;
        }
        if mass <= 0.0 {
            continue;
        }
        let center = weighted / mass;

        let w = (hi - lo) / 2.0;
        let (left, right): (Vec<usize>, Vec<usize>) =
            subset.into_iter().partition(|&i| axis.get(&nodes[i]) < center);

        if center > lo {
            let scale = w / (center - lo);
            for &i in &left {
                let v = axis.get(&nodes[i]);
                axis.set(&mut nodes[i], lo + (v - lo) * scale);
            }
        }
        if hi > center {
            let scale = w / (hi - center);
            for &i in &right {
                let v = axis.get(&nodes[i]);
                axis.set(&mut nodes[i], lo + w + (v - center) * scale);
            }
        }

        if depth > 0 {
            stack.push(Frame {
                subset: left,
                lo,
                hi: lo + w,
                depth: depth - 1,
            });
            stack.push(Frame {
                subset: right,
                lo: lo + w,
                hi,
                depth: depth - 1,
            });
        }
    }
}
