//! 手工构造的 ground truth 帧

#![allow(dead_code)]

use std::sync::Arc;

use osi_scene::config::Config;
use osi_scene::data::{
    Dimension3d, Identifier, MovingObjectType, Orientation3d, Timestamp, Vector3d,
    input::{BoundaryPoint, GroundTruth, Lane, LaneBoundary, MovingObject, VehicleAttributes},
};

pub fn id(value: u64) -> Identifier {
    Identifier::from(value)
}

pub fn moving_object(value: u64, x: f64, y: f64) -> MovingObject {
    let mut object = MovingObject::default();
    object.id = id(value);
    object.object_type = MovingObjectType::Vehicle;
    object.base.position = Vector3d::new(x, y, 0.75);
    object.base.dimension = Dimension3d { length: 4.5, width: 1.8, height: 1.5 };
    object
}

pub fn host_vehicle(value: u64, position: Vector3d, orientation: Orientation3d, rear: Option<Vector3d>) -> MovingObject {
    let mut object = moving_object(value, 0f64, 0f64);
    object.base.position = position;
    object.base.orientation = orientation;
    object.vehicle_attributes = Some(VehicleAttributes { bbcenter_to_rear: rear });
    object
}

/// 沿 x 轴、横向位置为 y 的直线车道线
pub fn lane_boundary(value: u64, y: f64, width: f64) -> LaneBoundary {
    let mut boundary = LaneBoundary::default();
    boundary.id = id(value);
    boundary.boundary_line = (0..4)
        .map(|i| BoundaryPoint { position: Vector3d::new(i as f64 * 10f64, y, 0f64), width, height: 0f64 })
        .collect();
    boundary
}

pub fn lane(value: u64, left: &[u64], right: &[u64]) -> Lane {
    let mut lane = Lane::default();
    lane.id = id(value);
    lane.classification.left_lane_boundary_id = left.iter().copied().map(id).collect();
    lane.classification.right_lane_boundary_id = right.iter().copied().map(id).collect();
    lane
}

/// 只有交通参与者的帧，第一个 id 作为 host
pub fn objects_frame(seconds: i64, ids: &[u64]) -> Arc<GroundTruth> {
    Arc::new(GroundTruth {
        timestamp: Timestamp { seconds, nanos: 0 },
        host_vehicle_id: ids.first().copied().map(id),
        moving_object: ids.iter().map(|x| moving_object(*x, *x as f64 * 10f64, 0f64)).collect(),
        ..GroundTruth::default()
    })
}

pub fn road_frame(seconds: i64, boundaries: Vec<LaneBoundary>, lanes: Vec<Lane>) -> Arc<GroundTruth> {
    Arc::new(GroundTruth {
        timestamp: Timestamp { seconds, nanos: 0 },
        lane_boundary: boundaries,
        lane: lanes,
        ..GroundTruth::default()
    })
}

pub fn config(f: impl FnOnce(&mut Config)) -> Arc<Config> {
    let mut config = Config::default();
    f(&mut config);
    Arc::new(config)
}

pub fn entity_ids(entities: &[osi_scene::data::output::SceneEntity]) -> Vec<&str> {
    entities.iter().map(|x| x.id.as_str()).collect()
}
