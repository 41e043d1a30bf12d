//! 每个 topic 的显示配置
//!
//! 配置由外部编辑，引擎只读。修改任何字段都必须换一个新的 `Arc<Config>`，
//! 引擎按指针判断配置是否变化，而不是比较字段

use std::path::Path;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// 车道与车道线的 hash 缓存
    #[derivative(Default(value = "true"))]
    pub caching: bool,
    #[derivative(Default(value = "true"))]
    pub show_axes: bool,
    #[derivative(Default(value = "true"))]
    pub show_physical_lanes: bool,
    pub show_logical_lanes: bool,
    #[derivative(Default(value = "true"))]
    pub show_bounding_box: bool,
    pub show_3d_models: bool,
    /// 与 model_reference 直接拼接，所以一般以 `/` 结尾
    #[derivative(Default(value = "String::from(\"/opt/models/vehicles/\")"))]
    pub default_model_path: String,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
