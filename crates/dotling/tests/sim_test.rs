use dotling::{Error, LinkRecord, NodeRecord, Phase, Simulator, Tunables};

fn record(code: &str, lon: f64, lat: f64, group: &str) -> NodeRecord {
    NodeRecord {
        code: code.to_string(),
        name: code.to_string(),
        population: 100.0,
        area: 10.0,
        lon,
        lat,
        group: group.to_string(),
        continent: "c".to_string(),
        perimeter: 100.0,
    }
}

/// Collision-only configuration: equal masses, geographic homes, no tether,
/// no frame fitting, no density animation.
fn collision_tunables(density: f64) -> Tunables {
    Tunables {
        width: 100.0,
        height: 100.0,
        pop_scale: 0.0,
        area_scale: 0.0,
        start_density: density,
        target_density: density,
        home_gain: 0.0,
        home_even_density: 0.0,
        frame_gain: 0.0,
        frame_padding: 0.0,
        sea_distance: 0.0,
        group_distance: 0.0,
        ..Tunables::default()
    }
}

fn distance(sim: &Simulator, a: usize, b: usize) -> f64 {
    let pa = sim.nodes()[a].position;
    let pb = sim.nodes()[b].position;
    ((pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2)).sqrt()
}

#[test]
fn overlapping_linked_pair_separates_symmetrically() {
    // Homes 2 canvas units apart, radii ~17.8 each: heavy overlap.
    let mut sim = Simulator::new(
        vec![record("AA", 0.0, 0.0, "g"), record("BB", 7.2, 0.0, "g")],
        vec![LinkRecord {
            source: 0,
            target: 1,
            perimeter: 50.0,
        }],
        collision_tunables(0.2),
    )
    .expect("simulator");

    let l0 = distance(&sim, 0, 1);
    let separation = sim.nodes()[0].radius + sim.nodes()[1].radius;
    assert!(l0 < separation, "fixture must start overlapping");

    let mid_before = (sim.nodes()[0].position.x + sim.nodes()[1].position.x) / 2.0;
    sim.start();
    assert!(sim.step(0.1));

    let l1 = distance(&sim, 0, 1);
    assert!(l1 >= l0, "separation must not shrink: {l0} -> {l1}");
    assert!(
        (l1 - separation).abs() < 1e-9,
        "single pair resolves to exact contact: {l1} vs {separation}"
    );

    // 50/50 split regardless of mass: the midpoint is a fixed point.
    let mid_after = (sim.nodes()[0].position.x + sim.nodes()[1].position.x) / 2.0;
    assert!((mid_after - mid_before).abs() < 1e-9);
    assert_eq!(sim.nodes()[0].position.y, sim.nodes()[1].position.y);
}

#[test]
fn unlinked_cross_group_pair_keeps_sea_and_group_distance() {
    let tunables = Tunables {
        sea_distance: 5.0,
        group_distance: 22.0,
        start_density: 0.05,
        target_density: 0.05,
        ..collision_tunables(0.05)
    };
    let mut sim = Simulator::new(
        vec![record("AA", 0.0, 0.0, "a"), record("BB", 7.2, 0.0, "b")],
        Vec::new(),
        tunables,
    )
    .expect("simulator");

    let separation = sim.nodes()[0].radius + sim.nodes()[1].radius + 5.0 + 22.0;
    sim.start();
    assert!(sim.step(0.1));

    let l = distance(&sim, 0, 1);
    assert!(
        (l - separation).abs() < 1e-9,
        "unlinked cross-group pair should rest at {separation}, got {l}"
    );
}

#[test]
fn non_overlapping_centered_grid_is_a_fixed_point() {
    // 2×2 grid on an 800×450 canvas at density 0.4: disk diameter ~214,
    // nearest spacing 225. No tether, no frame force, start == target.
    let tunables = Tunables {
        width: 800.0,
        height: 450.0,
        pop_scale: 0.0,
        area_scale: 0.0,
        start_density: 0.4,
        target_density: 0.4,
        home_gain: 0.0,
        home_even_density: 0.0,
        frame_gain: 0.0,
        frame_padding: 0.0,
        sea_distance: 0.0,
        group_distance: 0.0,
        ..Tunables::default()
    };
    let mut sim = Simulator::new(
        vec![
            record("AA", -90.0, 45.0, "g"),
            record("BB", 90.0, 45.0, "g"),
            record("CC", -90.0, -45.0, "g"),
            record("DD", 90.0, -45.0, "g"),
        ],
        Vec::new(),
        tunables,
    )
    .expect("simulator");

    let radii: Vec<f64> = sim.nodes().iter().map(|n| n.radius).collect();
    assert!(radii.windows(2).all(|w| w[0] == w[1]), "equal masses, equal radii");

    let before: Vec<_> = sim.nodes().iter().map(|n| n.position).collect();
    sim.start();
    for _ in 0..5 {
        assert!(sim.step(0.1));
    }
    let after: Vec<_> = sim.nodes().iter().map(|n| n.position).collect();
    assert_eq!(before, after, "already-resolved configuration must not move");
    assert_eq!(sim.state().ticks, 5);
}

#[test]
fn density_walks_to_the_target_without_overshoot() {
    let tunables = Tunables {
        start_density: 0.05,
        target_density: 0.4,
        step_density: 0.5,
        ..Tunables::default()
    };
    let mut sim = Simulator::new(
        vec![record("AA", -20.0, 0.0, "g"), record("BB", 20.0, 0.0, "g")],
        Vec::new(),
        tunables.clone(),
    )
    .expect("simulator");

    sim.start();
    assert!(sim.step(0.1));
    assert_eq!(sim.state().density, 0.4, "increment clamps at the target");

    let total: f64 = sim
        .nodes()
        .iter()
        .map(|n| std::f64::consts::PI * n.radius * n.radius)
        .sum();
    let expected = tunables.width * tunables.height * 0.4;
    assert!((total - expected).abs() < expected * 1e-12, "radii re-sized for the new density");

    // Arrival is stable: no further density motion.
    assert!(sim.step(0.1));
    assert_eq!(sim.state().density, 0.4);
}

#[test]
fn phase_machine_gates_stepping() {
    let mut sim = Simulator::new(
        vec![record("AA", 0.0, 0.0, "g"), record("BB", 40.0, 0.0, "g")],
        Vec::new(),
        Tunables::default(),
    )
    .expect("simulator");

    assert_eq!(sim.phase(), Phase::Idle);
    assert!(!sim.step(0.1), "idle simulator must not step");

    sim.start();
    assert_eq!(sim.phase(), Phase::Running);
    assert!(sim.step(0.1));

    sim.pause();
    assert_eq!(sim.phase(), Phase::Paused);
    assert!(!sim.step(0.1), "paused simulator must not step");
    let ticks = sim.state().ticks;

    sim.resume();
    assert!(sim.step(0.1));
    assert_eq!(sim.state().ticks, ticks + 1, "resume continues from the last tick");
}

#[test]
fn reset_restores_start_density_and_reseats_nodes() {
    let records = vec![
        record("AA", -30.0, 10.0, "g"),
        record("BB", 30.0, 10.0, "g"),
        record("CC", 0.0, -20.0, "h"),
    ];
    let fresh = Simulator::new(records.clone(), Vec::new(), Tunables::default()).expect("fresh");

    let mut sim = Simulator::new(records, Vec::new(), Tunables::default()).expect("simulator");
    sim.start();
    for _ in 0..10 {
        sim.step(0.1);
    }
    assert!(sim.state().density > sim.state().tunables().start_density);

    sim.reset();
    assert_eq!(sim.phase(), Phase::Idle);
    assert_eq!(sim.state().ticks, 0);
    assert_eq!(sim.state().density, sim.state().tunables().start_density);
    for (a, b) in sim.nodes().iter().zip(fresh.nodes()) {
        assert_eq!(a.radius, b.radius, "radii must match the start density");
        assert_eq!(a.position, b.position, "nodes reseat at their blended homes");
    }
}

#[test]
fn invalid_tunables_are_rejected_and_previous_values_retained() {
    let mut sim = Simulator::new(
        vec![record("AA", 0.0, 0.0, "g")],
        Vec::new(),
        Tunables::default(),
    )
    .expect("simulator");

    let before = sim.state().tunables().clone();

    let bad = Tunables {
        target_density: -1.0,
        ..before.clone()
    };
    let err = sim.set_tunables(bad).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTunable {
            name: "targetDensity",
            ..
        }
    ));
    assert_eq!(sim.state().tunables(), &before);

    let resized = Tunables {
        width: 1024.0,
        ..before.clone()
    };
    let err = sim.set_tunables(resized).unwrap_err();
    assert!(matches!(err, Error::FixedTunable { name: "width" }));
    assert_eq!(sim.state().tunables(), &before);

    let good = Tunables {
        target_density: 0.6,
        ..before.clone()
    };
    sim.set_tunables(good).expect("valid edit applies");
    assert_eq!(sim.state().tunables().target_density, 0.6);
}

#[test]
fn non_finite_alpha_is_rejected_before_any_mutation() {
    let mut sim = Simulator::new(
        vec![record("AA", 0.0, 0.0, "g"), record("BB", 7.2, 0.0, "g")],
        Vec::new(),
        collision_tunables(0.2),
    )
    .expect("simulator");
    sim.start();

    let before: Vec<_> = sim.nodes().iter().map(|n| n.position).collect();
    assert!(!sim.step(f64::NAN));
    assert!(!sim.step(f64::INFINITY));
    assert!(!sim.step(-0.5));
    let after: Vec<_> = sim.nodes().iter().map(|n| n.position).collect();
    assert_eq!(before, after);
    assert_eq!(sim.state().ticks, 0);
}

#[test]
fn placements_expose_position_and_radius_in_node_order() {
    let sim = Simulator::new(
        vec![record("AA", -30.0, 10.0, "g"), record("BB", 30.0, -10.0, "g")],
        Vec::new(),
        Tunables::default(),
    )
    .expect("simulator");

    let placements: Vec<_> = sim.placements().collect();
    assert_eq!(placements.len(), 2);
    for (placement, node) in placements.iter().zip(sim.nodes()) {
        assert_eq!(*placement, (node.position.x, node.position.y, node.radius));
    }
}
