//! # 坐标系变换
//!
//! 每帧输出的变换构成一棵树：
//!
//! ```plain text
//! ego_vehicle_rear_axis
//!        |  (刚体求逆，见 `rear_axis_to_root`)
//!      <root>
//!        |  identity
//!      global
//!        |  host 车辆位姿
//! ego_vehicle_bb_center
//!        |  bbcenter_to_rear（纯平移）
//! ego_vehicle_rear_axle
//! ```
//!
//! 每个变换的 translation/rotation 都是 child 坐标系在 parent 坐标系下的位姿

use nalgebra as na;
use tracing::warn;

use crate::data::{Vector3d, input::{GroundTruth, MovingObject}, output::{FrameTransform, FrameTransforms, Quaternion, Time, Vector3}};
use crate::error::{ConversionError, ConversionResult};
use crate::geometry::{invert_quaternion, orientation_to_quaternion, rotate_point, to_na, to_vector3};

pub const ROOT_FRAME: &str = "<root>";
pub const GLOBAL_FRAME: &str = "global";
pub const EGO_BB_CENTER_FRAME: &str = "ego_vehicle_bb_center";
pub const EGO_REAR_AXLE_FRAME: &str = "ego_vehicle_rear_axle";
/// 与后轴中心重合、但以 <root> 为子节点的车身固定坐标系
pub const EGO_REAR_AXIS_FRAME: &str = "ego_vehicle_rear_axis";

fn transform(parent: &str, child: &str, time: Time, translation: Vector3, rotation: Quaternion) -> FrameTransform {
    FrameTransform {
        timestamp: time,
        parent_frame_id: parent.to_string(),
        child_frame_id: child.to_string(),
        translation,
        rotation,
    }
}

/// <root> 与 global 重合
pub fn root_to_global(time: Time) -> FrameTransform {
    transform(ROOT_FRAME, GLOBAL_FRAME, time, Vector3::default(), Quaternion::default())
}

pub fn global_to_bb_center(host: &MovingObject, time: Time) -> FrameTransform {
    transform(
        GLOBAL_FRAME,
        EGO_BB_CENTER_FRAME,
        time,
        host.base.position.into(),
        (&orientation_to_quaternion(&host.base.orientation)).into(),
    )
}

/// 车身坐标系下的纯平移
pub fn bb_center_to_rear_axle(bbcenter_to_rear: &Vector3d, time: Time) -> FrameTransform {
    transform(EGO_BB_CENTER_FRAME, EGO_REAR_AXLE_FRAME, time, (*bbcenter_to_rear).into(), Quaternion::default())
}

/// 带车身偏移的刚体求逆
///
/// 已知 bb-center 在 global 下为 (R, p)，参考点相对 bb-center 的偏移 o 在车身坐标系下给出（不旋转）。
/// global 原点在参考点坐标系下为：rotation' = R^-1 = conj(R)，translation' = -R^-1 * p - o
pub fn inverse_with_body_offset(
    rotation: &na::UnitQuaternion<f64>,
    translation: &na::Vector3<f64>,
    body_offset: &na::Vector3<f64>,
) -> (na::Vector3<f64>, na::UnitQuaternion<f64>) {
    let inverse_rotation = invert_quaternion(rotation);
    let inverse_translation = -rotate_point(translation, &inverse_rotation) - body_offset;
    (inverse_translation, inverse_rotation)
}

pub fn rear_axis_to_root(host: &MovingObject, bbcenter_to_rear: &Vector3d, time: Time) -> FrameTransform {
    let (translation, rotation) = inverse_with_body_offset(
        &orientation_to_quaternion(&host.base.orientation),
        &to_na(&host.base.position),
        &to_na(bbcenter_to_rear),
    );
    transform(EGO_REAR_AXIS_FRAME, ROOT_FRAME, time, to_vector3(&translation), (&rotation).into())
}

fn host_vehicle(frame: &GroundTruth) -> ConversionResult<&MovingObject> {
    let host_id = frame.host_vehicle_id.ok_or(ConversionError::MissingHostVehicle)?;
    frame.host_vehicle().ok_or(ConversionError::HostVehicleNotFound(host_id))
}

fn rear_offset(host: &MovingObject) -> ConversionResult<Vector3d> {
    host.bbcenter_to_rear().ok_or(ConversionError::MissingOptionalAttribute("bbcenter_to_rear"))
}

/// 按 root->global->bb-center->rear-axle、rear-axis->root 的顺序给出本帧的变换
///
/// host 车辆缺失时报错；缺少 bbcenter_to_rear 时只跳过依赖它的两个变换
pub fn derive(frame: &GroundTruth) -> ConversionResult<Vec<FrameTransform>> {
    let time: Time = frame.timestamp.into();
    let host = host_vehicle(frame)?;

    let mut transforms = vec![root_to_global(time), global_to_bb_center(host, time)];
    match rear_offset(host) {
        Ok(offset) => {
            transforms.push(bb_center_to_rear_axle(&offset, time));
            transforms.push(rear_axis_to_root(host, &offset, time));
        }
        Err(error) => warn!(%error, "skipping rear axle frame transforms"),
    }
    Ok(transforms)
}

/// 出错时返回空列表
pub fn frame_transforms(frame: &GroundTruth) -> FrameTransforms {
    match derive(frame) {
        Ok(transforms) => FrameTransforms { transforms },
        Err(error) => {
            warn!(%error, "can not build frame transforms");
            FrameTransforms::default()
        }
    }
}
