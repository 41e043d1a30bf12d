//! 交通标志、信号灯与停止线

use super::{BuildContext, Metadata, ensure_finite};
use crate::cache::ModelCache;
use crate::data::{
    Category, TrafficSignType, Vector3d,
    input::{RoadMarking, Sign, TrafficLight, TrafficSign},
    output::{ModelPrimitive, SceneEntity},
};
use crate::error::ConversionResult;
use crate::geometry::{offset_in_body, pose, to_na};
use crate::resolver::ModelResolver;
use crate::triangulation::{RibbonOptions, RibbonPoint, ribbon};

fn sign_model(sign: &Sign, ctx: &BuildContext, models: &mut ModelCache, resolver: &dyn ModelResolver) -> Option<ModelPrimitive> {
    let key = ctx.style.traffic_sign_model(sign.classification.sign_type);
    models.posed(&key, pose(&sign.base.position, &sign.base.orientation), resolver)
}

/// 主标志一个模型，每个附加标志再各一个
pub fn build_traffic_sign_entity(
    sign: &TrafficSign,
    ctx: &BuildContext,
    models: &mut ModelCache,
    resolver: &dyn ModelResolver,
) -> ConversionResult<SceneEntity> {
    ensure_finite(
        Category::TrafficSign,
        sign.id,
        std::iter::once(&sign.main_sign).chain(&sign.supplementary_sign).map(|x| &x.base.position),
    )?;

    let mut entity = ctx.entity(Category::TrafficSign, sign.id);
    entity.models = std::iter::once(&sign.main_sign)
        .chain(&sign.supplementary_sign)
        .filter_map(|x| sign_model(x, ctx, models, resolver))
        .collect();

    let mut metadata = Metadata::default();
    metadata.push("type", sign.main_sign.classification.sign_type);
    if !sign.supplementary_sign.is_empty() {
        metadata.push("supplementary_sign_count", sign.supplementary_sign.len());
    }
    entity.metadata = metadata.into_inner();
    Ok(entity)
}

/// 一个模型，颜色覆盖为信号灯当前颜色
pub fn build_traffic_light_entity(
    light: &TrafficLight,
    ctx: &BuildContext,
    models: &mut ModelCache,
    resolver: &dyn ModelResolver,
) -> ConversionResult<SceneEntity> {
    ensure_finite(Category::TrafficLight, light.id, [&light.base.position])?;

    let classification = &light.classification;
    let mut entity = ctx.entity(Category::TrafficLight, light.id);
    if let Some(mut model) = models.posed(&ctx.style.traffic_light_model, pose(&light.base.position, &light.base.orientation), resolver) {
        model.color = ctx.style.traffic_light_color(classification.color);
        model.override_color = true;
        entity.models.push(model);
    }

    let mut metadata = Metadata::default();
    metadata
        .push("color", classification.color)
        .push("icon", classification.icon)
        .push("mode", classification.mode);
    entity.metadata = metadata.into_inner();
    Ok(entity)
}

/// 只画停止线，其他标线返回 None
///
/// 从物体位置沿自身 x 轴画一条长为 length 的带子，宽度取 width（不大于 0 时用最小线宽）
pub fn build_road_marking_entity(marking: &RoadMarking, ctx: &BuildContext) -> ConversionResult<Option<SceneEntity>> {
    let classification = &marking.classification;
    if classification.traffic_main_sign_type.kind() != TrafficSignType::Stop {
        return Ok(None);
    }
    let base = &marking.base;
    ensure_finite(Category::RoadMarking, marking.id, [
        &base.position,
        &Vector3d::new(base.dimension.length, base.dimension.width, base.dimension.height),
    ])?;

    let width = if base.dimension.width > 0f64 { base.dimension.width } else { ctx.style.min_boundary_width };
    let start = to_na(&base.position);
    let end = offset_in_body(&base.position, &base.orientation, &nalgebra::Vector3::new(base.dimension.length, 0f64, 0f64));
    let color = ctx.style.road_marking_color(classification.monochrome_color);

    let mut entity = ctx.entity(Category::RoadMarking, marking.id);
    entity.triangles.push(ribbon(&[RibbonPoint::new(start, width), RibbonPoint::new(end, width)], color, &RibbonOptions::default()));

    let mut metadata = Metadata::default();
    metadata
        .push("type", classification.marking_type)
        .push("color", classification.monochrome_color)
        .push("width", base.dimension.width)
        .push("height", base.dimension.height);
    entity.metadata = metadata.into_inner();
    Ok(Some(entity))
}
