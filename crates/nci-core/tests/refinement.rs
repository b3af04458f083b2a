mod common;

use common::{Sketch, active_of_type};
use ncikit::core::models::element::Element;
use ncikit::core::models::topology::BondOrder;
use ncikit::core::structure::IndexedStructure;
use ncikit::engine::config::ContactParams;
use ncikit::engine::interactions::contacts::ContactType;
use ncikit::engine::interactions::pipeline::calculate_contacts;
use std::f64::consts::FRAC_PI_3;

#[test]
fn fused_ring_system_stacks_once_per_residue_pair() {
    let mut sketch = Sketch::new();
    sketch.residue('A', 1, "BNZ");
    sketch.hexagon("C", [0.0, 0.0, 0.0], 0.0);

    // Naphthalene above it: the second ring shares the edge between the first
    // ring's atoms at 0 and 60 degrees.
    sketch.residue('B', 2, "NAP");
    let first = sketch.hexagon("A", [0.0, 0.0, 3.5], 0.0);
    let apothem = 1.39 * FRAC_PI_3.sin();
    let (cx, cy) = (2.0 * apothem * 30f64.to_radians().cos(), 2.0 * apothem * 0.5);
    let mut second = Vec::new();
    for k in [0usize, 1, 2, 5] {
        let t = k as f64 * FRAC_PI_3;
        second.push(sketch.atom(
            &format!("B{k}"),
            Element::C,
            [cx + 1.39 * t.cos(), cy + 1.39 * t.sin(), 3.5],
        ));
    }
    // Second ring, walked from A0 to A1; the shared A0-A1 bond closes it.
    let path = [first[0], second[3], second[0], second[1], second[2], first[1]];
    for pair in path.windows(2) {
        sketch.bond(pair[0], pair[1], BondOrder::Aromatic);
    }

    let params = ContactParams {
        max_pi_stacking_offset: 2.5,
        ..ContactParams::default()
    };
    let view = IndexedStructure::new(&sketch.system);
    let frozen = calculate_contacts(&view, &params);

    let stored = (0..frozen.store.count())
        .filter(|&c| frozen.store.contact_type(c) == ContactType::PiStacking)
        .count();
    assert_eq!(stored, 2);
    let active = active_of_type(&frozen, ContactType::PiStacking);
    assert_eq!(active.len(), 1);
    assert!((frozen.distance(active[0]) - 3.5).abs() < 1e-6);
}

#[test]
fn metal_keeps_its_nearest_partners() {
    let mut sketch = Sketch::new();
    sketch.residue('M', 1, "ZN");
    sketch.atom("ZN", Element::ZN, [0.0, 0.0, 0.0]);

    let diagonal = 1.0 / 3f64.sqrt();
    let directions = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [diagonal, diagonal, diagonal],
        [-diagonal, -diagonal, -diagonal],
    ];
    for (k, direction) in directions.iter().enumerate() {
        let distance = 2.0 + 0.1 * k as f64;
        sketch.residue('W', 10 + k as isize, "HOH");
        sketch.atom("O", Element::O, direction.map(|d| d * distance));
    }

    let params = ContactParams::default();
    assert_eq!(params.max_metal_coordination, 6);
    let view = IndexedStructure::new(&sketch.system);
    let frozen = calculate_contacts(&view, &params);

    let coordination = |c: usize| frozen.store.contact_type(c) == ContactType::MetalCoordination;
    let stored: Vec<usize> = (0..frozen.store.count()).filter(|&c| coordination(c)).collect();
    assert_eq!(stored.len(), 8);

    let active = active_of_type(&frozen, ContactType::MetalCoordination);
    assert_eq!(active.len(), 6);
    let mut cleared: Vec<f64> = stored
        .iter()
        .filter(|&&c| !active.contains(&c))
        .map(|&c| frozen.distance(c))
        .collect();
    cleared.sort_by(f64::total_cmp);
    assert_eq!(cleared.len(), 2);
    assert!((cleared[0] - 2.6).abs() < 1e-9);
    assert!((cleared[1] - 2.7).abs() < 1e-9);
}
