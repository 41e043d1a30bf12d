//! 四元数与向量运算，底层用 nalgebra

use nalgebra as na;

use crate::data::{Orientation3d, Vector3d, output::{Pose, Quaternion, Vector3}};

/// roll/pitch/yaw 转单位四元数，等价于 R = Rz(yaw) * Ry(pitch) * Rx(roll)
pub fn euler_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> na::UnitQuaternion<f64> {
    na::UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

pub fn orientation_to_quaternion(orientation: &Orientation3d) -> na::UnitQuaternion<f64> {
    euler_to_quaternion(orientation.roll, orientation.pitch, orientation.yaw)
}

/// 单位四元数的逆就是共轭
pub fn invert_quaternion(q: &na::UnitQuaternion<f64>) -> na::UnitQuaternion<f64> {
    q.conjugate()
}

pub fn rotate_point(point: &na::Vector3<f64>, q: &na::UnitQuaternion<f64>) -> na::Vector3<f64> {
    q.transform_vector(point)
}

pub fn to_na(v: &Vector3d) -> na::Vector3<f64> {
    na::Vector3::new(v.x, v.y, v.z)
}

pub fn to_vector3(v: &na::Vector3<f64>) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

impl From<Vector3d> for Vector3 {
    fn from(v: Vector3d) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<&na::UnitQuaternion<f64>> for Quaternion {
    fn from(q: &na::UnitQuaternion<f64>) -> Self {
        let q = q.quaternion();
        Self { x: q.i, y: q.j, z: q.k, w: q.w }
    }
}

impl From<&Quaternion> for na::UnitQuaternion<f64> {
    fn from(q: &Quaternion) -> Self {
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

/// 由位置与欧拉角组成位姿
pub fn pose(position: &Vector3d, orientation: &Orientation3d) -> Pose {
    Pose {
        position: (*position).into(),
        orientation: (&orientation_to_quaternion(orientation)).into(),
    }
}

/// 把父子变换 (translation, rotation) 转成 nalgebra 的刚体变换
pub fn isometry(translation: &Vector3, rotation: &Quaternion) -> na::Isometry3<f64> {
    na::Isometry3::from_parts(
        na::Translation3::new(translation.x, translation.y, translation.z),
        rotation.into(),
    )
}

/// 在物体局部坐标系下偏移 `local`，返回全局坐标
pub fn offset_in_body(
    position: &Vector3d,
    orientation: &Orientation3d,
    local: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    to_na(position) + rotate_point(local, &orientation_to_quaternion(orientation))
}
