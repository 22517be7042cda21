//! Assigning near-duplicate coordinates a shared representative id.

use tracing::{debug, info};

use crate::config::MergeStrategy;
use crate::kdtree::CoordinateIndex;
use crate::types::Coordinate;

/// Map every coordinate id to the id of its representative.
///
/// `coordinates[i].id` must equal `i`, which is what
/// [`coordinates_from_source`](crate::io::coordinates_from_source) produces.
/// The returned vector has one entry per coordinate and every representative
/// is the smallest id of the group it was chosen from.
///
/// With [`MergeStrategy::PerQuery`] coordinates are visited in input order;
/// each one not yet resolved is queried and its whole match set is assigned
/// the smallest id in that set, overwriting any earlier assignment. This is
/// order dependent and not transitive. [`MergeStrategy::Transitive`] joins
/// every matching pair into one cluster instead.
pub fn resolve_duplicates(
    coordinates: &[Coordinate],
    index: &CoordinateIndex,
    strategy: MergeStrategy,
) -> Vec<u32> {
    debug_assert!(
        coordinates.iter().enumerate().all(|(i, c)| c.id as usize == i),
        "coordinate ids must be dense stream positions"
    );

    let representative = match strategy {
        MergeStrategy::PerQuery => resolve_per_query(coordinates, index),
        MergeStrategy::Transitive => resolve_transitive(coordinates, index),
    };

    let merged = representative
        .iter()
        .enumerate()
        .filter(|&(i, &r)| i as u32 != r)
        .count();
    info!(
        "Resolved {} coordinates ({:?}): {} merged into an earlier one",
        coordinates.len(),
        strategy,
        merged
    );

    representative
}

fn resolve_per_query(coordinates: &[Coordinate], index: &CoordinateIndex) -> Vec<u32> {
    let mut representative: Vec<u32> = (0..coordinates.len() as u32).collect();
    let mut resolved = vec![false; coordinates.len()];

    for coord in coordinates {
        if resolved[coord.id as usize] {
            continue;
        }

        let matches = index.matches(coord);
        let Some(min_id) = matches.iter().map(|m| m.id).min() else {
            // NaN components never compare equal, not even to themselves.
            debug!("Coordinate {} has no match; keeping it as its own vertex", coord.id);
            resolved[coord.id as usize] = true;
            continue;
        };

        for m in &matches {
            representative[m.id as usize] = min_id;
            resolved[m.id as usize] = true;
        }
    }

    representative
}

fn resolve_transitive(coordinates: &[Coordinate], index: &CoordinateIndex) -> Vec<u32> {
    let mut parent: Vec<u32> = (0..coordinates.len() as u32).collect();

    for coord in coordinates {
        for m in index.matches(coord) {
            union(&mut parent, coord.id, m.id);
        }
    }

    (0..coordinates.len() as u32)
        .map(|id| find(&mut parent, id))
        .collect()
}

/// Root of `id`'s cluster. Roots are always the smallest id in their cluster.
fn find(parent: &mut [u32], mut id: u32) -> u32 {
    while parent[id as usize] != id {
        let grandparent = parent[parent[id as usize] as usize];
        parent[id as usize] = grandparent;
        id = grandparent;
    }
    id
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[high as usize] = low;
    }
}
