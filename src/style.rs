//! 颜色查表与渲染常量
//!
//! 所有表都按 OSI 枚举的整数编码查，越界时回退到下标 0

use derivative::Derivative;

use crate::data::{
    LaneBoundaryColor, LaneBoundaryType, MovingObjectType, OsiCode, RoadMarkingColor,
    StationaryObjectColor, TrafficLightColor, TrafficSignType, output::Color,
};

const fn rgb(r: f64, g: f64, b: f64) -> Color {
    Color::rgba(r, g, b, 1f64)
}

pub const RED: Color = rgb(1f64, 0f64, 0f64);
pub const GREEN: Color = rgb(0f64, 1f64, 0f64);
pub const BLUE: Color = rgb(0f64, 0f64, 1f64);
pub const AMBER: Color = rgb(1f64, 0.6, 0f64);
pub const DARK_RED: Color = rgb(0.35, 0f64, 0f64);
pub const DARK_AMBER: Color = rgb(0.35, 0.2, 0f64);
pub const WHITE: Color = rgb(1f64, 1f64, 1f64);

/// 按 `MovingObjectType` 编码
const MOVING_OBJECT_COLOR: [Color; 5] = [
    Color::rgba(0.5, 0.5, 0.5, 0.5),
    Color::rgba(0.5, 0.5, 0.5, 0.5),
    Color::rgba(0f64, 0.5, 1f64, 0.5),
    Color::rgba(1f64, 0.8, 0f64, 0.5),
    Color::rgba(0.6, 0.4, 0.2, 0.5),
];

/// 按 `StationaryObjectColor` 编码
const STATIONARY_OBJECT_COLOR: [Color; 11] = [
    Color::rgba(0.6, 0.6, 0.6, 0.5),
    Color::rgba(0.6, 0.6, 0.6, 0.5),
    Color::rgba(1f64, 1f64, 0f64, 0.5),
    Color::rgba(0f64, 1f64, 0f64, 0.5),
    Color::rgba(0f64, 0f64, 1f64, 0.5),
    Color::rgba(0.5, 0f64, 1f64, 0.5),
    Color::rgba(1f64, 0f64, 0f64, 0.5),
    Color::rgba(1f64, 0.5, 0f64, 0.5),
    Color::rgba(0f64, 0f64, 0f64, 0.5),
    Color::rgba(0.5, 0.5, 0.5, 0.5),
    Color::rgba(1f64, 1f64, 1f64, 0.5),
];

/// 按 `TrafficLightColor` 编码
const TRAFFIC_LIGHT_COLOR: [Color; 7] = [
    rgb(0.5, 0.5, 0.5),
    rgb(0.5, 0.5, 0.5),
    rgb(1f64, 0f64, 0f64),
    rgb(1f64, 1f64, 0f64),
    rgb(0f64, 1f64, 0f64),
    rgb(0f64, 0f64, 1f64),
    rgb(1f64, 1f64, 1f64),
];

/// 按 `RoadMarkingColor` 编码，4 在 OSI 里没有定义
const ROAD_MARKING_COLOR: [Color; 10] = [
    rgb(1f64, 1f64, 1f64),
    rgb(1f64, 1f64, 1f64),
    rgb(1f64, 1f64, 1f64),
    rgb(1f64, 1f64, 0f64),
    rgb(1f64, 1f64, 1f64),
    rgb(0f64, 0f64, 1f64),
    rgb(1f64, 0f64, 0f64),
    rgb(0f64, 1f64, 0f64),
    rgb(0.5, 0f64, 1f64),
    rgb(1f64, 0.5, 0f64),
];

/// 按 `LaneBoundaryColor` 编码
const LANE_BOUNDARY_COLOR: [Color; 10] = [
    rgb(1f64, 1f64, 1f64),
    rgb(1f64, 1f64, 1f64),
    rgb(0.3, 0.3, 0.3),
    rgb(1f64, 1f64, 1f64),
    rgb(1f64, 0.85, 0f64),
    rgb(1f64, 0f64, 0f64),
    rgb(0f64, 0f64, 1f64),
    rgb(0f64, 1f64, 0f64),
    rgb(0.5, 0f64, 1f64),
    rgb(1f64, 0.5, 0f64),
];

fn pick(table: &[Color], index: usize) -> Color {
    table.get(index).or_else(|| table.first()).copied().unwrap_or_default()
}

/// 渲染参数与查表，由宿主提供，默认值对应常用的可视化效果
#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
pub struct Style {
    #[derivative(Default(value = "Color::rgba(1f64, 0f64, 0.5, 0.5)"))]
    pub host_object_color: Color,
    #[derivative(Default(value = "MOVING_OBJECT_COLOR.to_vec()"))]
    pub moving_object_colors: Vec<Color>,
    #[derivative(Default(value = "STATIONARY_OBJECT_COLOR.to_vec()"))]
    pub stationary_object_colors: Vec<Color>,
    #[derivative(Default(value = "TRAFFIC_LIGHT_COLOR.to_vec()"))]
    pub traffic_light_colors: Vec<Color>,
    #[derivative(Default(value = "ROAD_MARKING_COLOR.to_vec()"))]
    pub road_marking_colors: Vec<Color>,
    #[derivative(Default(value = "LANE_BOUNDARY_COLOR.to_vec()"))]
    pub lane_boundary_colors: Vec<Color>,
    #[derivative(Default(value = "Color::rgba(0.2, 0.4, 0.8, 0.25)"))]
    pub lane_color: Color,
    #[derivative(Default(value = "Color::rgba(0.2, 0.8, 0.4, 0.25)"))]
    pub logical_lane_color: Color,
    #[derivative(Default(value = "Color::rgba(0.2, 0.8, 0.4, 0.8)"))]
    pub logical_lane_boundary_color: Color,
    /// 线宽为 0 的边界点用这个宽度渲染
    #[derivative(Default(value = "0.13"))]
    pub min_boundary_width: f64,
    #[derivative(Default(value = "0.1"))]
    pub centerline_width: f64,
    /// 虚线的实段与空段等长
    #[derivative(Default(value = "3f64"))]
    pub dash_length: f64,
    /// 车道线上是否画方向箭头
    pub boundary_arrows: bool,
    #[derivative(Default(value = "true"))]
    pub lane_centerline: bool,
    /// 交通标志模型目录，文件名为主标志类型编码，如 `206.glb`
    #[derivative(Default(value = "String::from(\"/opt/models/signs/\")"))]
    pub traffic_sign_model_path: String,
    #[derivative(Default(value = "String::from(\"/opt/models/traffic_light.glb\")"))]
    pub traffic_light_model: String,
}

impl Style {
    pub fn moving_object_color(&self, object_type: MovingObjectType) -> Color {
        pick(&self.moving_object_colors, object_type.index())
    }

    pub fn stationary_object_color(&self, color: StationaryObjectColor) -> Color {
        pick(&self.stationary_object_colors, color.index())
    }

    pub fn traffic_light_color(&self, color: TrafficLightColor) -> Color {
        pick(&self.traffic_light_colors, color.index())
    }

    pub fn road_marking_color(&self, color: RoadMarkingColor) -> Color {
        pick(&self.road_marking_colors, color.index())
    }

    /// 颜色由 color 决定，透明度由 type 决定：路沿、护栏这类非涂装边界更淡
    pub fn lane_boundary_color(&self, boundary_type: LaneBoundaryType, color: LaneBoundaryColor) -> Color {
        let opacity = match boundary_type {
            LaneBoundaryType::NoLine => 0.2,
            LaneBoundaryType::SolidLine | LaneBoundaryType::DashedLine | LaneBoundaryType::BottsDots => 1f64,
            _ => 0.5,
        };
        pick(&self.lane_boundary_colors, color.index()).with_alpha(opacity)
    }

    pub fn traffic_sign_model(&self, sign_type: OsiCode<TrafficSignType>) -> String {
        format!("{}{}.glb", self.traffic_sign_model_path, sign_type.code)
    }
}
