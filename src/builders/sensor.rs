//! SensorData 预览：检测到的车道线画成折线，再加一行提示文字

use crate::data::{
    input::{DetectedLaneBoundary, SensorData},
    output::{LinePrimitive, LineType, Pose, SceneEntity, TextPrimitive, Time, Vector3},
};
use crate::error::{ConversionError, ConversionResult};
use crate::style;
use crate::transforms::EGO_REAR_AXLE_FRAME;

pub const SENSOR_DATA_ENTITY_ID: &str = "sensor_data";
pub const SENSOR_DATA_NOTE: &str = "SensorData preview: detected lane boundaries only";

const LINE_THICKNESS: f64 = 1f64;
const NOTE_FONT_SIZE: f64 = 30f64;

/// 压平到 z = 0
fn boundary_line(boundary: &DetectedLaneBoundary) -> LinePrimitive {
    LinePrimitive {
        line_type: LineType::LineStrip,
        pose: Pose::default(),
        thickness: LINE_THICKNESS,
        scale_invariant: true,
        points: boundary.boundary_line.iter().map(|x| Vector3::new(x.position.x, x.position.y, 0f64)).collect(),
        color: style::GREEN,
        indices: Vec::new(),
    }
}

pub fn build_sensor_data_entity(data: &SensorData) -> ConversionResult<SceneEntity> {
    if !data.lane_boundary.iter().flat_map(|x| &x.boundary_line).all(|p| p.position.is_finite()) {
        return Err(ConversionError::NonFiniteGeometry { entity: SENSOR_DATA_ENTITY_ID.to_string() });
    }

    let mut entity = SceneEntity::new(SENSOR_DATA_ENTITY_ID.to_string(), EGO_REAR_AXLE_FRAME, Time::from(data.timestamp));
    entity.lines = data.lane_boundary.iter().map(boundary_line).collect();
    entity.texts.push(TextPrimitive {
        pose: Pose::default(),
        billboard: true,
        font_size: NOTE_FONT_SIZE,
        scale_invariant: true,
        color: style::GREEN,
        text: SENSOR_DATA_NOTE.to_string(),
    });
    Ok(entity)
}
