use crate::core::models::element::Element;
use crate::core::models::topology::BondOrder;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::Point3;
use std::collections::HashSet;

pub const MIN_AROMATIC_RING_SIZE: usize = 5;
pub const MAX_AROMATIC_RING_SIZE: usize = 6;

/// Maximum out-of-plane deviation (Angstrom) of a ring atom for a ring without
/// aromatic bond annotations to be perceived as aromatic.
pub const MAX_PLANARITY_DEVIATION: f64 = 0.1;

/// Chordless rings of five or six heavy atoms within `atoms`.
///
/// Each ring is returned in bonding order, starting at its lowest atom index,
/// so consecutive atoms (and the last and first) are bonded. Rings are listed
/// in ascending order of their first atom.
pub fn small_rings(structure: &dyn Structure, atoms: &[usize]) -> Vec<Vec<usize>> {
    let members: HashSet<usize> = atoms
        .iter()
        .copied()
        .filter(|&a| !structure.element(a).is_hydrogen())
        .collect();
    let mut starts: Vec<usize> = members.iter().copied().collect();
    starts.sort_unstable();

    let mut rings = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut path = Vec::with_capacity(MAX_AROMATIC_RING_SIZE);

    for &start in &starts {
        path.clear();
        path.push(start);
        extend_path(structure, &members, &mut path, &mut |ring: &[usize]| {
            let mut key = ring.to_vec();
            key.sort_unstable();
            if is_chordless(structure, ring) && seen.insert(key) {
                rings.push(ring.to_vec());
            }
        });
    }
    rings
}

fn extend_path(
    structure: &dyn Structure,
    members: &HashSet<usize>,
    path: &mut Vec<usize>,
    on_ring: &mut dyn FnMut(&[usize]),
) {
    let start = path[0];
    let Some(&last) = path.last() else {
        return;
    };
    for &next in structure.bonded_neighbors(last) {
        if next == start
            && path.len() >= MIN_AROMATIC_RING_SIZE
            && path[1] < last
        {
            on_ring(path);
            continue;
        }
        if next <= start
            || !members.contains(&next)
            || path.contains(&next)
            || path.len() >= MAX_AROMATIC_RING_SIZE
        {
            continue;
        }
        path.push(next);
        extend_path(structure, members, path, on_ring);
        path.pop();
    }
}

fn is_chordless(structure: &dyn Structure, ring: &[usize]) -> bool {
    let n = ring.len();
    (0..n).all(|i| {
        (i + 2..n).all(|j| {
            // The first and last atoms are ring neighbors.
            (i == 0 && j == n - 1) || !structure.is_bonded(ring[i], ring[j])
        })
    })
}

fn ring_bonds(ring: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    ring.iter()
        .enumerate()
        .map(|(i, &a)| (a, ring[(i + 1) % ring.len()]))
}

/// Aromaticity test for a perceived ring.
///
/// A ring is aromatic when every ring bond is annotated aromatic. Without such
/// annotations it is aromatic when it is built from C, N, O and S atoms with at
/// most three explicit connections each and is planar within
/// [`MAX_PLANARITY_DEVIATION`].
pub fn is_aromatic_ring(structure: &dyn Structure, ring: &[usize]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    if ring_bonds(ring).all(|(a, b)| structure.bond_order(a, b) == Some(BondOrder::Aromatic)) {
        return true;
    }

    let allowed = ring.iter().all(|&a| {
        matches!(
            structure.element(a),
            Element::C | Element::N | Element::O | Element::S
        ) && structure.bonded_neighbors(a).len() <= 3
    });
    if !allowed {
        return false;
    }

    let positions: Vec<Point3<f64>> = ring.iter().map(|&a| structure.position(a)).collect();
    let (Some(center), Some(normal)) = (
        geometry::centroid(&positions),
        geometry::plane_normal(&positions),
    ) else {
        return false;
    };
    geometry::max_plane_deviation(&positions, &center, &normal) <= MAX_PLANARITY_DEVIATION
}

/// Aromatic rings among the atoms of one residue.
pub fn aromatic_rings(structure: &dyn Structure, residue: usize) -> Vec<Vec<usize>> {
    small_rings(structure, structure.residue_atoms(residue))
        .into_iter()
        .filter(|ring| is_aromatic_ring(structure, ring))
        .collect()
}
