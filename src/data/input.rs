//! # 数据输入接口
//!
//! OSI ground truth 的精简映射。可选字段在反序列化时即被确定：
//! 缺省即默认值的字段用 `#[serde(default)]`，需要区分“不存在”的字段用 `Option`

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMoving {
    pub dimension: Dimension3d,
    pub position: Vector3d,
    pub orientation: Orientation3d,
    pub velocity: Option<Vector3d>,
    pub acceleration: Option<Vector3d>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStationary {
    pub dimension: Dimension3d,
    pub position: Vector3d,
    pub orientation: Orientation3d,
}

/// 灯光状态，每个字段都可能缺失
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightState {
    pub indicator_state: Option<IndicatorState>,
    pub brake_light_state: Option<BrakeLightState>,
    pub front_fog_light: Option<GenericLightState>,
    pub rear_fog_light: Option<GenericLightState>,
    pub head_light: Option<GenericLightState>,
    pub high_beam: Option<GenericLightState>,
    pub reversing_light: Option<GenericLightState>,
    pub emergency_vehicle_illumination: Option<GenericLightState>,
}
impl LightState {
    /// 按字段声明顺序给出 (字段名, 状态名)，跳过缺失的字段
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let generic = [
            ("front_fog_light", self.front_fog_light),
            ("rear_fog_light", self.rear_fog_light),
            ("head_light", self.head_light),
            ("high_beam", self.high_beam),
            ("reversing_light", self.reversing_light),
            ("emergency_vehicle_illumination", self.emergency_vehicle_illumination),
        ];
        self.indicator_state.map(|x| ("indicator_state", x.to_string())).into_iter()
            .chain(self.brake_light_state.map(|x| ("brake_light_state", x.to_string())))
            .chain(generic.into_iter().filter_map(|(key, state)| state.map(|x| (key, x.to_string()))))
            .collect()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleClassification {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub light_state: Option<LightState>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleAttributes {
    /// 包围盒中心到后轴中心的偏移，车身坐标系
    pub bbcenter_to_rear: Option<Vector3d>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingObjectClassification {
    pub assigned_lane_id: Vec<Identifier>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingObject {
    pub id: Identifier,
    pub base: BaseMoving,
    #[serde(rename = "type")]
    pub object_type: MovingObjectType,
    pub moving_object_classification: MovingObjectClassification,
    pub vehicle_attributes: Option<VehicleAttributes>,
    pub vehicle_classification: Option<VehicleClassification>,
    pub model_reference: String,
}
impl MovingObject {
    pub fn light_state(&self) -> Option<&LightState> {
        self.vehicle_classification.as_ref().and_then(|x| x.light_state.as_ref())
    }

    pub fn bbcenter_to_rear(&self) -> Option<Vector3d> {
        self.vehicle_attributes.as_ref().and_then(|x| x.bbcenter_to_rear)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryObjectClassification {
    #[serde(rename = "type")]
    pub object_type: StationaryObjectType,
    pub material: StationaryObjectMaterial,
    pub density: StationaryObjectDensity,
    pub color: StationaryObjectColor,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryObject {
    pub id: Identifier,
    pub base: BaseStationary,
    pub classification: StationaryObjectClassification,
    pub model_reference: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignClassification {
    #[serde(rename = "type")]
    pub sign_type: OsiCode<TrafficSignType>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sign {
    pub base: BaseStationary,
    pub classification: SignClassification,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSign {
    pub id: Identifier,
    pub main_sign: Sign,
    pub supplementary_sign: Vec<Sign>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficLightClassification {
    pub color: TrafficLightColor,
    pub icon: OsiCode<TrafficLightIcon>,
    pub mode: TrafficLightMode,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficLight {
    pub id: Identifier,
    pub base: BaseStationary,
    pub classification: TrafficLightClassification,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadMarkingClassification {
    #[serde(rename = "type")]
    pub marking_type: RoadMarkingType,
    pub traffic_main_sign_type: OsiCode<TrafficSignType>,
    pub monochrome_color: RoadMarkingColor,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadMarking {
    pub id: Identifier,
    pub base: BaseStationary,
    pub classification: RoadMarkingClassification,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryPoint {
    pub position: Vector3d,
    /// 0 表示未给出线宽
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneBoundaryClassification {
    #[serde(rename = "type")]
    pub boundary_type: LaneBoundaryType,
    pub color: LaneBoundaryColor,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneBoundary {
    pub id: Identifier,
    pub boundary_line: Vec<BoundaryPoint>,
    pub classification: LaneBoundaryClassification,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanePairing {
    pub antecessor_lane_id: Option<Identifier>,
    pub successor_lane_id: Option<Identifier>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneClassification {
    #[serde(rename = "type")]
    pub lane_type: LaneType,
    pub subtype: Option<LaneSubtype>,
    pub is_host_vehicle_lane: Option<bool>,
    pub centerline: Vec<Vector3d>,
    pub centerline_is_driving_direction: bool,
    pub left_adjacent_lane_id: Vec<Identifier>,
    pub right_adjacent_lane_id: Vec<Identifier>,
    pub lane_pairing: Vec<LanePairing>,
    pub left_lane_boundary_id: Vec<Identifier>,
    pub right_lane_boundary_id: Vec<Identifier>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Lane {
    pub id: Identifier,
    pub classification: LaneClassification,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalBoundaryPoint {
    pub position: Vector3d,
    pub s_position: f64,
    pub t_position: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalLaneBoundary {
    pub id: Identifier,
    pub boundary_line: Vec<LogicalBoundaryPoint>,
    pub passing_rule: PassingRule,
    pub physical_boundary_id: Vec<Identifier>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConnection {
    pub other_lane_id: Identifier,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalLaneReference {
    pub physical_lane_id: Identifier,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalLane {
    pub id: Identifier,
    #[serde(rename = "type")]
    pub lane_type: LogicalLaneType,
    pub move_direction: MoveDirection,
    pub left_boundary_id: Vec<Identifier>,
    pub right_boundary_id: Vec<Identifier>,
    pub left_adjacent_lane: Vec<LaneConnection>,
    pub right_adjacent_lane: Vec<LaneConnection>,
    pub physical_lane_reference: Vec<PhysicalLaneReference>,
}

/// 一个时间步的完整 ground truth
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruth {
    pub timestamp: Timestamp,
    pub host_vehicle_id: Option<Identifier>,
    pub moving_object: Vec<MovingObject>,
    pub stationary_object: Vec<StationaryObject>,
    pub traffic_sign: Vec<TrafficSign>,
    pub traffic_light: Vec<TrafficLight>,
    pub road_marking: Vec<RoadMarking>,
    pub lane_boundary: Vec<LaneBoundary>,
    pub lane: Vec<Lane>,
    pub logical_lane_boundary: Vec<LogicalLaneBoundary>,
    pub logical_lane: Vec<LogicalLane>,
}
impl GroundTruth {
    /// 本帧的 host 车辆，host id 缺失或找不到时为 None
    pub fn host_vehicle(&self) -> Option<&MovingObject> {
        let host_id = self.host_vehicle_id?;
        self.moving_object.iter().find(|x| x.id == host_id)
    }
}

/// 包了一层 ground truth 的 SensorView
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorView {
    pub timestamp: Timestamp,
    /// 用 Arc 保存，整帧缓存依赖它的地址
    pub global_ground_truth: Option<Arc<GroundTruth>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedLaneBoundary {
    pub boundary_line: Vec<BoundaryPoint>,
}

/// 只带车道线检测结果的 SensorData，走简化的预览路径
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorData {
    pub timestamp: Timestamp,
    pub lane_boundary: Vec<DetectedLaneBoundary>,
}
