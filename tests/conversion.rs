mod common;

use std::sync::Arc;

use osi_scene::SceneConverter;
use osi_scene::data::{
    Category, LaneType, RoadMarkingColor, TrafficSignType, Vector3d,
    input::{GroundTruth, LogicalBoundaryPoint, LogicalLaneBoundary, RoadMarking, SensorData, SensorView},
    output::DeletionType,
};

use common::*;

#[test]
fn removed_objects_are_deleted_once() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});

    let first = converter.convert_ground_truth(&objects_frame(0, &[1, 2, 3]), &config);
    assert!(first.deletions.is_empty());
    assert_eq!(entity_ids(&first.entities), vec!["moving_object_1", "moving_object_2", "moving_object_3"]);

    let second = converter.convert_ground_truth(&objects_frame(1, &[2, 3, 4]), &config);
    assert_eq!(second.deletions.len(), 1);
    assert_eq!(second.deletions[0].id, "moving_object_1");
    assert_eq!(second.deletions[0].deletion_type, DeletionType::MatchingId);
    assert_eq!(second.deletions[0].timestamp.sec, 1);

    let third = converter.convert_ground_truth(&objects_frame(2, &[2, 3, 4]), &config);
    assert!(third.deletions.is_empty());
}

#[test]
fn same_frame_is_served_from_frame_cache() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    let frame = objects_frame(0, &[1, 2]);

    let first = converter.convert_ground_truth(&frame, &config);
    let builds = converter.stats().builds(Category::MovingObject);
    let second = converter.convert_ground_truth(&frame, &config);

    assert_eq!(first.entities, second.entities);
    assert_eq!(converter.stats().builds(Category::MovingObject), builds);
    assert_eq!(converter.stats().frame_cache_hits, 1);
    assert_eq!(converter.stats().frames, 2);
}

#[test]
fn equal_but_distinct_frames_are_rebuilt() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    converter.convert_ground_truth(&objects_frame(0, &[1, 2]), &config);
    converter.convert_ground_truth(&objects_frame(0, &[1, 2]), &config);
    assert_eq!(converter.stats().frame_cache_hits, 0);
    assert_eq!(converter.stats().builds(Category::MovingObject), 4);
}

#[test]
fn cache_hit_still_tracks_deletions() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    let frame_a = objects_frame(0, &[1, 2]);
    let frame_b = objects_frame(1, &[2, 3]);

    let first = converter.convert_ground_truth(&frame_a, &config);
    converter.convert_ground_truth(&frame_b, &config);
    let replay = converter.convert_ground_truth(&frame_a, &config);

    assert_eq!(converter.stats().frame_cache_hits, 1);
    assert_eq!(replay.entities, first.entities);
    let deleted: Vec<_> = replay.deletions.iter().map(|x| x.id.as_str()).collect();
    assert_eq!(deleted, vec!["moving_object_3"]);

    // 缓存的实体与删除跟踪记下的 id 一致
    let tracked: Vec<String> = converter
        .deletion_tracker()
        .previous_ids(Category::MovingObject)
        .unwrap()
        .iter()
        .map(|x| Category::MovingObject.entity_id(*x))
        .collect();
    assert_eq!(entity_ids(&replay.entities), tracked.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn new_config_instance_clears_caches_but_not_history() -> () {
    let mut converter = SceneConverter::default();
    let frame = objects_frame(0, &[1, 2]);
    converter.convert_ground_truth(&frame, &config(|_| {}));

    // 字段完全相同，但换了实例
    let update = converter.convert_ground_truth(&frame, &config(|_| {}));
    assert_eq!(converter.stats().frame_cache_hits, 0);
    assert_eq!(converter.stats().builds(Category::MovingObject), 4);
    assert_eq!(update.entities.len(), 2);

    let update = converter.convert_ground_truth(&objects_frame(1, &[2]), &config(|_| {}));
    assert_eq!(update.deletions.len(), 1);
}

#[test]
fn new_config_instance_clears_model_and_lane_caches() -> () {
    let mut converter = SceneConverter::default();
    let frame = |seconds: i64, model: &str| {
        let mut frame = GroundTruth::clone(&road_frame(
            seconds,
            vec![lane_boundary(10, 3.5, 0.15), lane_boundary(11, 0f64, 0.15)],
            vec![lane(1, &[10], &[11])],
        ));
        let mut object = moving_object(5, 0f64, 0f64);
        object.model_reference = model.to_string();
        frame.moving_object.push(object);
        Arc::new(frame)
    };
    let first_config = config(|x| x.show_3d_models = true);
    converter.convert_ground_truth(&frame(0, "car.glb"), &first_config);
    converter.convert_ground_truth(&frame(1, ""), &first_config);
    assert_eq!(converter.model_cache().len(), 1);
    assert_eq!(converter.stats().lane_cache_hits, 1);
    assert_eq!(converter.stats().lane_boundary_cache_hits, 1);

    let update = converter.convert_ground_truth(&frame(2, ""), &config(|x| x.show_3d_models = true));
    assert_eq!(converter.model_cache().len(), 0);
    assert_eq!(converter.stats().lane_cache_hits, 1);
    assert_eq!(converter.stats().lane_boundary_cache_hits, 1);
    assert_eq!(converter.stats().builds(Category::Lane), 2);
    assert_eq!(converter.stats().builds(Category::LaneBoundary), 4);
    assert!(update.entities.iter().any(|x| x.id == "lane_1"));
}

#[test]
fn identical_lane_ids_reuse_cached_lanes() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    let boundaries = || vec![lane_boundary(10, 3.5, 0.15), lane_boundary(11, 0f64, 0.15)];

    let mut driving = lane(1, &[10], &[11]);
    driving.classification.lane_type = LaneType::Driving;
    let mut other = driving.clone();
    other.classification.lane_type = LaneType::Nondriving;

    let first = converter.convert_ground_truth(&road_frame(0, boundaries(), vec![driving]), &config);
    let second = converter.convert_ground_truth(&road_frame(1, boundaries(), vec![other]), &config);

    assert_eq!(converter.stats().builds(Category::Lane), 1);
    assert_eq!(converter.stats().builds(Category::LaneBoundary), 2);
    assert_eq!(converter.stats().lane_cache_hits, 1);
    assert_eq!(converter.stats().lane_boundary_cache_hits, 1);

    // 只看 id 序列：车道类型变了，输出仍是缓存里的旧结果
    let lane_of = |update: &osi_scene::data::output::SceneUpdate| {
        update.entities.iter().find(|x| x.id == "lane_1").cloned().unwrap()
    };
    assert_eq!(lane_of(&second), lane_of(&first));
    assert_eq!(lane_of(&second).metadata_value("type"), Some("DRIVING"));
}

#[test]
fn changed_lane_ids_rebuild() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    converter.convert_ground_truth(&road_frame(0, vec![lane_boundary(10, 0f64, 0.1)], vec![lane(1, &[], &[])]), &config);
    converter.convert_ground_truth(&road_frame(1, vec![lane_boundary(11, 0f64, 0.1)], vec![lane(2, &[], &[])]), &config);
    assert_eq!(converter.stats().builds(Category::Lane), 2);
    assert_eq!(converter.stats().builds(Category::LaneBoundary), 2);
    assert_eq!(converter.stats().lane_cache_hits, 0);
}

#[test]
fn disabled_caching_always_rebuilds_lanes() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|x| x.caching = false);
    for seconds in 0..3 {
        converter.convert_ground_truth(&road_frame(seconds, vec![lane_boundary(10, 0f64, 0.1)], vec![lane(1, &[], &[])]), &config);
    }
    assert_eq!(converter.stats().builds(Category::Lane), 3);
    assert_eq!(converter.stats().lane_cache_hits, 0);
}

#[test]
fn hiding_physical_lanes_deletes_them() -> () {
    let mut converter = SceneConverter::default();
    let frame = road_frame(0, vec![lane_boundary(10, 0f64, 0.1)], vec![lane(1, &[], &[])]);
    let shown = converter.convert_ground_truth(&frame, &config(|_| {}));
    assert_eq!(entity_ids(&shown.entities), vec!["lane_boundary_10", "lane_1"]);

    let hidden = converter.convert_ground_truth(&frame, &config(|x| x.show_physical_lanes = false));
    assert!(hidden.entities.is_empty());
    let mut deleted: Vec<_> = hidden.deletions.iter().map(|x| x.id.as_str()).collect();
    deleted.sort();
    assert_eq!(deleted, vec!["lane_1", "lane_boundary_10"]);
}

#[test]
fn zero_width_boundary_renders_with_minimum_width() -> () {
    let mut converter = SceneConverter::default();
    let update = converter.convert_ground_truth(&road_frame(0, vec![lane_boundary(10, 2f64, 0f64)], Vec::new()), &config(|_| {}));
    let mesh = &update.entities[0].triangles[0];
    assert!(mesh.triangle_count() > 0);
    let (lo, hi) = mesh.points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    assert!((hi - lo - converter.style().min_boundary_width).abs() < 1e-9);
}

#[test]
fn only_stop_road_markings_become_entities() -> () {
    let marking = |value: u64, sign_type: TrafficSignType| {
        let mut marking = RoadMarking::default();
        marking.id = id(value);
        marking.base.dimension.length = 3f64;
        marking.base.dimension.width = 0.5;
        marking.classification.traffic_main_sign_type = sign_type.into();
        marking.classification.monochrome_color = RoadMarkingColor::White;
        marking
    };
    let frame = Arc::new(GroundTruth {
        road_marking: vec![marking(1, TrafficSignType::Stop), marking(2, TrafficSignType::GiveWay)],
        ..GroundTruth::default()
    });
    let update = SceneConverter::default().convert_ground_truth(&frame, &config(|_| {}));
    assert_eq!(entity_ids(&update.entities), vec!["road_marking_1"]);
}

#[test]
fn logical_lanes_rebuild_alongside_cached_boundaries() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|x| x.show_logical_lanes = true);
    let logical = LogicalLaneBoundary {
        id: id(20),
        boundary_line: vec![
            LogicalBoundaryPoint { position: Vector3d::new(0f64, 0f64, 0f64), ..LogicalBoundaryPoint::default() },
            LogicalBoundaryPoint { position: Vector3d::new(10f64, 0f64, 0f64), ..LogicalBoundaryPoint::default() },
        ],
        ..LogicalLaneBoundary::default()
    };
    let frame = |seconds: i64| {
        let mut frame = GroundTruth::clone(&road_frame(seconds, vec![lane_boundary(10, 0f64, 0.1)], Vec::new()));
        frame.logical_lane_boundary = vec![logical.clone()];
        Arc::new(frame)
    };

    converter.convert_ground_truth(&frame(0), &config);
    let second = converter.convert_ground_truth(&frame(1), &config);
    assert_eq!(converter.stats().lane_boundary_cache_hits, 1);
    assert_eq!(converter.stats().builds(Category::LogicalLaneBoundary), 2);
    assert!(entity_ids(&second.entities).contains(&"logical_lane_boundary_20"));
}

#[test]
fn broken_frame_degrades_to_deletions_only() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    converter.convert_ground_truth(&objects_frame(0, &[1, 2]), &config);

    let mut broken = GroundTruth::clone(&objects_frame(1, &[2, 3]));
    broken.moving_object[1].base.position.x = f64::NAN;
    let update = converter.convert_ground_truth(&Arc::new(broken), &config);

    assert!(update.entities.is_empty());
    assert_eq!(update.deletions.len(), 1);
    assert_eq!(converter.stats().failures, 1);

    // 后续帧照常处理
    let update = converter.convert_ground_truth(&objects_frame(2, &[2, 3]), &config);
    assert_eq!(update.entities.len(), 2);
    assert!(update.deletions.is_empty());
}

#[test]
fn cached_model_poses_do_not_move() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|x| x.show_3d_models = true);
    let with_model = |seconds: i64, x: f64| {
        let mut frame = GroundTruth::clone(&objects_frame(seconds, &[1]));
        frame.moving_object[0].base.position.x = x;
        frame.moving_object[0].model_reference = "car.glb".to_string();
        Arc::new(frame)
    };
    let frame_a = with_model(0, 1f64);
    let first = converter.convert_ground_truth(&frame_a, &config);
    converter.convert_ground_truth(&with_model(1, 5f64), &config);
    let replay = converter.convert_ground_truth(&frame_a, &config);

    assert_eq!(converter.model_cache().len(), 1);
    assert_eq!(first.entities[0].models[0].pose.position.x, 1f64);
    assert_eq!(replay.entities[0].models[0].pose.position.x, 1f64);
    assert_eq!(converter.model_cache().template("/opt/models/vehicles/car.glb").unwrap().pose.position.x, 5f64);
}

#[test]
fn sensor_view_unwraps_ground_truth() -> () {
    let mut converter = SceneConverter::default();
    let config = config(|_| {});
    let view = SensorView { global_ground_truth: Some(objects_frame(0, &[7])), ..SensorView::default() };
    assert_eq!(entity_ids(&converter.convert_sensor_view(&view, &config).entities), vec!["moving_object_7"]);

    let empty = converter.convert_sensor_view(&SensorView::default(), &config);
    assert!(empty.entities.is_empty() && empty.deletions.is_empty());
}

#[test]
fn sensor_data_produces_preview_entity() -> () {
    let mut converter = SceneConverter::default();
    let update = converter.convert_sensor_data(&SensorData::default());
    assert!(update.deletions.is_empty());
    assert_eq!(update.entities.len(), 1);
    assert_eq!(update.entities[0].frame_id, "ego_vehicle_rear_axle");
    assert_eq!(update.entities[0].texts.len(), 1);
}
