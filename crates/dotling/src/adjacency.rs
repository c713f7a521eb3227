//! Adjacency builder: per-link shared-boundary weights and the undirected
//! neighbor index used to relax collision separation between land neighbors.

use crate::error::{Error, Result};
use crate::model::{LandLink, LandNode, LinkRecord};

/// Rejects structurally broken input before any weight is derived, so every
/// weight afterwards lands in `(0, 1]`.
pub fn validate(nodes: &[LandNode], links: &[LinkRecord]) -> Result<()> {
    if nodes.is_empty() {
        return Err(Error::EmptyGraph);
    }
    for (i, link) in links.iter().enumerate() {
        for index in [link.source, link.target] {
            if index >= nodes.len() {
                return Err(Error::MissingEndpoint { link: i, index });
            }
        }
        if link.source == link.target {
            return Err(Error::SelfLink {
                link: i,
                index: link.source,
            });
        }
        if !(link.perimeter > 0.0) {
            return Err(Error::NonPositiveLinkPerimeter {
                link: i,
                perimeter: link.perimeter,
            });
        }
        for index in [link.source, link.target] {
            let node = &nodes[index];
            if !(node.perimeter > 0.0) {
                return Err(Error::NonPositiveNodePerimeter {
                    index,
                    code: node.code.clone(),
                    perimeter: node.perimeter,
                });
            }
        }
    }
    Ok(())
}

/// Derives link weights and mirrors each link into both endpoints' neighbor
/// sets.
///
/// `weight` is the larger of the two shared-perimeter ratios, clamped to 1
/// (an entity cannot share more than its whole boundary; input data may
/// disagree by measurement error).
pub fn link_nodes(nodes: &mut [LandNode], links: &[LinkRecord]) -> Result<Vec<LandLink>> {
    validate(nodes, links)?;

    let mut out = Vec::with_capacity(links.len());
    for link in links {
        let ratio_source = link.perimeter / nodes[link.source].perimeter;
        let ratio_target = link.perimeter / nodes[link.target].perimeter;
        out.push(LandLink {
            source: link.source,
            target: link.target,
            perimeter: link.perimeter,
            weight: ratio_source.max(ratio_target).min(1.0),
        });
        nodes[link.source].links.insert(link.target);
        nodes[link.target].links.insert(link.source);
    }
    Ok(out)
}
