//! 交通参与者与静态物体：包围盒、坐标轴、车灯、3D 模型

use std::f64::consts::FRAC_PI_2;

use nalgebra as na;

use super::{BuildContext, Metadata, ensure_finite};
use crate::cache::ModelCache;
use crate::data::{
    BrakeLightState, Category, Dimension3d, Identifier, IndicatorState, MovingObjectType, Orientation3d, Vector3d,
    input::{LightState, MovingObject, StationaryObject},
    output::{ArrowPrimitive, Color, CubePrimitive, KeyValuePair, Pose, SceneEntity, Vector3},
};
use crate::error::ConversionResult;
use crate::geometry::{euler_to_quaternion, offset_in_body, orientation_to_quaternion, pose, to_vector3};
use crate::resolver::ModelResolver;
use crate::style::{self, Style};

const AXIS_SHAFT_LENGTH: f64 = 0.308;
const AXIS_SHAFT_DIAMETER: f64 = 0.04;
const AXIS_HEAD_LENGTH: f64 = 0.092;
const AXIS_HEAD_DIAMETER: f64 = 0.10;

/// 车灯小方块的尺寸 (x, y, z)
const BRAKE_LIGHT_SIZE: (f64, f64, f64) = (0.05, 0.3, 0.1);
const INDICATOR_SIZE: (f64, f64, f64) = (0.08, 0.12, 0.08);
/// 车灯到侧面的距离
const LIGHT_SIDE_INSET: f64 = 0.2;

/// 在接入时确定一次的物体子类型，后续按变体分支而不是逐字段探测
#[derive(Clone, Copy, Debug)]
pub enum ObjectRecord<'a> {
    Moving { object: &'a MovingObject, is_host: bool },
    Stationary(&'a StationaryObject),
}

impl<'a> ObjectRecord<'a> {
    pub fn moving(object: &'a MovingObject, host_id: Option<Identifier>) -> Self {
        Self::Moving { object, is_host: host_id == Some(object.id) }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Moving { .. } => Category::MovingObject,
            Self::Stationary(_) => Category::StationaryObject,
        }
    }

    pub fn id(&self) -> Identifier {
        match self {
            Self::Moving { object, .. } => object.id,
            Self::Stationary(object) => object.id,
        }
    }

    fn placement(&self) -> (&'a Vector3d, &'a Orientation3d, &'a Dimension3d) {
        match *self {
            Self::Moving { object, .. } => (&object.base.position, &object.base.orientation, &object.base.dimension),
            Self::Stationary(object) => (&object.base.position, &object.base.orientation, &object.base.dimension),
        }
    }

    pub fn model_reference(&self) -> &'a str {
        match *self {
            Self::Moving { object, .. } => &object.model_reference,
            Self::Stationary(object) => &object.model_reference,
        }
    }

    /// 只有车辆分类里带了灯光状态的交通参与者才有
    pub fn light_state(&self) -> Option<&'a LightState> {
        match *self {
            Self::Moving { object, .. } => object.light_state(),
            Self::Stationary(_) => None,
        }
    }

    fn color(&self, style: &Style) -> Color {
        match self {
            Self::Moving { is_host: true, .. } => style.host_object_color,
            Self::Moving { object, .. } => style.moving_object_color(object.object_type),
            Self::Stationary(object) => style.stationary_object_color(object.classification.color),
        }
    }

    pub fn metadata(&self) -> Vec<KeyValuePair> {
        match *self {
            Self::Moving { object, .. } => moving_object_metadata(object),
            Self::Stationary(object) => stationary_object_metadata(object),
        }
    }
}

pub fn moving_object_metadata(object: &MovingObject) -> Vec<KeyValuePair> {
    let mut metadata = Metadata::default();
    metadata
        .push("moving_object_type", object.object_type)
        .push_opt("velocity", object.base.velocity)
        .push_opt("acceleration", object.base.acceleration)
        .push_list("assigned_lane_id", &object.moving_object_classification.assigned_lane_id);
    if object.object_type == MovingObjectType::Vehicle {
        if let Some(classification) = &object.vehicle_classification {
            metadata.push("type", classification.vehicle_type);
        }
        for (key, state) in object.light_state().map(|x| x.entries()).unwrap_or_default() {
            metadata.push(&format!("light_state.{}", key), state);
        }
    }
    metadata.into_inner()
}

pub fn stationary_object_metadata(object: &StationaryObject) -> Vec<KeyValuePair> {
    let classification = &object.classification;
    let mut metadata = Metadata::default();
    metadata
        .push("density", classification.density)
        .push("material", classification.material)
        .push("color", classification.color)
        .push("type", classification.object_type);
    metadata.into_inner()
}

fn axis_arrow(position: &Vector3d, base: &na::UnitQuaternion<f64>, local: na::UnitQuaternion<f64>, color: Color) -> ArrowPrimitive {
    ArrowPrimitive {
        pose: Pose { position: (*position).into(), orientation: (&(base * local)).into() },
        shaft_length: AXIS_SHAFT_LENGTH,
        shaft_diameter: AXIS_SHAFT_DIAMETER,
        head_length: AXIS_HEAD_LENGTH,
        head_diameter: AXIS_HEAD_DIAMETER,
        color,
    }
}

/// x/y/z 轴分别为红/绿/蓝，y、z 轴在物体姿态上再局部旋转 +90°（绕 z）和 -90°（绕 y）
pub fn axes(position: &Vector3d, orientation: &Orientation3d) -> Vec<ArrowPrimitive> {
    let base = orientation_to_quaternion(orientation);
    vec![
        axis_arrow(position, &base, na::UnitQuaternion::identity(), style::RED),
        axis_arrow(position, &base, euler_to_quaternion(0f64, 0f64, FRAC_PI_2), style::GREEN),
        axis_arrow(position, &base, euler_to_quaternion(0f64, -FRAC_PI_2, 0f64), style::BLUE),
    ]
}

fn light_cube(position: &Vector3d, orientation: &Orientation3d, local: na::Vector3<f64>, size: (f64, f64, f64), color: Color) -> CubePrimitive {
    CubePrimitive {
        pose: Pose {
            position: to_vector3(&offset_in_body(position, orientation, &local)),
            orientation: (&orientation_to_quaternion(orientation)).into(),
        },
        size: Vector3::new(size.0, size.1, size.2),
        color,
    }
}

fn brake_light_color(state: BrakeLightState) -> Color {
    match state {
        BrakeLightState::Normal => style::RED,
        BrakeLightState::Strong => Color::rgba(1f64, 0.25, 0.25, 1f64),
        _ => style::DARK_RED,
    }
}

/// 左右尾灯 + 四角转向灯，只为灯光状态中存在的字段生成
pub fn vehicle_lights(position: &Vector3d, orientation: &Orientation3d, dimension: &Dimension3d, lights: &LightState) -> Vec<CubePrimitive> {
    let (half_l, half_w) = (dimension.length / 2f64, dimension.width / 2f64);
    let side = (half_w - LIGHT_SIDE_INSET).max(0f64);
    let mut cubes = Vec::new();

    if let Some(state) = lights.brake_light_state {
        for y in [side, -side] {
            cubes.push(light_cube(position, orientation, na::Vector3::new(-half_l, y, 0f64), BRAKE_LIGHT_SIZE, brake_light_color(state)));
        }
    }

    if let Some(state) = lights.indicator_state {
        let (left_on, right_on) = match state {
            IndicatorState::Left => (true, false),
            IndicatorState::Right => (false, true),
            IndicatorState::Warning => (true, true),
            _ => (false, false),
        };
        let color = |on: bool| if on { style::AMBER } else { style::DARK_AMBER };
        for x in [half_l, -half_l] {
            cubes.push(light_cube(position, orientation, na::Vector3::new(x, half_w, 0f64), INDICATOR_SIZE, color(left_on)));
            cubes.push(light_cube(position, orientation, na::Vector3::new(x, -half_w, 0f64), INDICATOR_SIZE, color(right_on)));
        }
    }
    cubes
}

/// 交通参与者 / 静态物体
///
/// 3D 模型按 (默认路径 + model_reference) 从模型缓存中取，位置下移半个高度，
/// 把包围盒中心换成模型原点（底面中心）
pub fn build_object_entity(
    record: ObjectRecord,
    ctx: &BuildContext,
    models: &mut ModelCache,
    resolver: &dyn ModelResolver,
) -> ConversionResult<SceneEntity> {
    let (position, orientation, dimension) = record.placement();
    let id = record.id();
    ensure_finite(record.category(), id, [
        position,
        &Vector3d::new(orientation.roll, orientation.pitch, orientation.yaw),
        &Vector3d::new(dimension.length, dimension.width, dimension.height),
    ])?;

    let mut entity = ctx.entity(record.category(), id);
    entity.metadata = record.metadata();

    if ctx.config.show_bounding_box {
        entity.cubes.push(CubePrimitive {
            pose: pose(position, orientation),
            size: Vector3::new(dimension.length, dimension.width, dimension.height),
            color: record.color(ctx.style),
        });
        if let Some(lights) = record.light_state() {
            entity.cubes.extend(vehicle_lights(position, orientation, dimension, lights));
        }
    }

    if ctx.config.show_axes {
        entity.arrows = axes(position, orientation);
    }

    if ctx.config.show_3d_models && !record.model_reference().is_empty() {
        let key = format!("{}{}", ctx.config.default_model_path, record.model_reference());
        let model_origin = Vector3d::new(position.x, position.y, position.z - dimension.height / 2f64);
        if let Some(model) = models.posed(&key, pose(&model_origin, orientation), resolver) {
            entity.models.push(model);
        }
    }

    Ok(entity)
}
