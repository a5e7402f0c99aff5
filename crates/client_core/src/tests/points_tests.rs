use std::collections::HashSet;

use super::*;

#[test]
fn starts_with_one_seed_point_of_each_canonical_type() {
    let registry = PointRegistry::seeded();
    assert_eq!(registry.len(), SEED_POINT_COUNT);
    let kinds: Vec<&str> = registry.points().iter().map(|p| p.kind.as_str()).collect();
    assert_eq!(kinds, vec!["QR Code", "Charging Station", "Robot"]);
    assert_eq!(registry.points()[0].position, DEFAULT_MAP_CENTER);
}

#[test]
fn labelled_clicks_append_in_order_with_unique_ids() {
    let mut registry = PointRegistry::seeded();
    let labels = ["Robot", "QR Code", "dock 7", "Robot", "Charging Station"];
    for (i, label) in labels.iter().copied().enumerate() {
        let added = registry
            .add_labelled(Some(label), LatLng::new(51.5 + i as f64 * 0.001, -0.1))
            .expect("point added");
        assert_eq!(added.kind, label);
    }

    assert_eq!(registry.len(), SEED_POINT_COUNT + labels.len());
    assert_eq!(registry.points()[..SEED_POINT_COUNT], seed_points()[..]);

    let tail: Vec<&str> = registry.points()[SEED_POINT_COUNT..]
        .iter()
        .map(|p| p.kind.as_str())
        .collect();
    assert_eq!(tail, labels);

    let ids: HashSet<PointId> = registry.points().iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), registry.len());
}

#[test]
fn cancelled_or_empty_prompt_leaves_registry_unchanged() {
    let mut registry = PointRegistry::seeded();
    assert!(registry.add_labelled(None, LatLng::new(1.0, 2.0)).is_none());
    assert!(registry.add_labelled(Some(""), LatLng::new(1.0, 2.0)).is_none());
    assert_eq!(registry.len(), SEED_POINT_COUNT);
    assert_eq!(registry.points(), &seed_points()[..]);
}

#[test]
fn whitespace_label_is_kept_verbatim() {
    let mut registry = PointRegistry::seeded();
    let added = registry
        .add_labelled(Some("  "), LatLng::new(0.0, 0.0))
        .expect("whitespace is a supplied label");
    assert_eq!(added.kind, "  ");
}

#[test]
fn duplicates_and_out_of_range_positions_are_accepted() {
    let mut registry = PointRegistry::seeded();
    let far = LatLng::new(512.0, -999.0);
    let a = registry.add_point("Robot", far).id;
    let b = registry.add_point("Robot", far).id;
    assert_ne!(a, b);
    assert_eq!(registry.get(a).map(|p| p.position), Some(far));
    assert_eq!(registry.get(b).map(|p| p.position), Some(far));
}

#[test]
fn generated_ids_are_above_seed_ids() {
    let mut registry = PointRegistry::seeded();
    let id = registry.add_point("QR Code", DEFAULT_MAP_CENTER).id;
    assert!(id > PointId(3));
}

#[test]
fn id_generator_is_strictly_increasing_within_one_millisecond() {
    let mut ids = PointIdGenerator::starting_after(PointId(3));
    let first = ids.next_from_clock(1_700_000_000_000);
    let second = ids.next_from_clock(1_700_000_000_000);
    let third = ids.next_from_clock(1_699_999_999_000);
    assert_eq!(first, PointId(1_700_000_000_000));
    assert_eq!(second, PointId(1_700_000_000_001));
    assert_eq!(third, PointId(1_700_000_000_002));
}

#[test]
fn id_generator_never_reuses_seed_ids_on_a_stale_clock() {
    let mut ids = PointIdGenerator::starting_after(PointId(3));
    assert_eq!(ids.next_from_clock(0), PointId(4));
    assert_eq!(ids.next_from_clock(2), PointId(5));
}

#[test]
fn map_point_serializes_with_type_and_pair_position() {
    let point = &seed_points()[1];
    let value = serde_json::to_value(point).expect("encode");
    assert_eq!(
        value,
        serde_json::json!({ "id": 2, "type": "Charging Station", "position": [51.51, -0.1] })
    );
}
