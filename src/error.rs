//! 错误类型
//!
//! 所有错误都在单帧调用内部被处理，不会传给调用方

use thiserror::Error;

use crate::data::Identifier;

pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// ground truth 没有 host_vehicle_id
    #[error("ground truth carries no host vehicle id")]
    MissingHostVehicle,

    /// host_vehicle_id 在 moving objects 中找不到
    #[error("host vehicle {0} not found in moving objects")]
    HostVehicleNotFound(Identifier),

    /// 依赖该字段的变换被跳过
    #[error("optional attribute `{0}` missing on host vehicle")]
    MissingOptionalAttribute(&'static str),

    /// SensorView 没有内嵌的 ground truth
    #[error("sensor view carries no global ground truth")]
    MissingGroundTruth,

    /// 坐标或尺寸中有 NaN / inf
    #[error("non-finite geometry in {entity}")]
    NonFiniteGeometry { entity: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
