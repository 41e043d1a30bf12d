//! # 车道与车道线
//!
//! 车道面由左右边界拼成：边界 id 列表只作为集合使用，按本帧边界列表的顺序筛出成员，
//! 再把各成员的点依次连成一条折线

use std::collections::HashSet;

use nalgebra as na;

use super::{BuildContext, Metadata, ensure_finite};
use crate::data::{
    Category, Identifier, LaneBoundaryType,
    input::{Lane, LaneBoundary, LanePairing, LogicalLane, LogicalLaneBoundary},
    output::SceneEntity,
};
use crate::error::ConversionResult;
use crate::geometry::to_na;
use crate::triangulation::{RibbonOptions, RibbonPoint, lane_surface, ribbon};

const CENTERLINE_OPACITY: f64 = 0.6;

/// `(前驱,后继)`，缺失的一侧写 `-`
fn format_pairing(pairing: &LanePairing) -> String {
    let side = |x: Option<Identifier>| x.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    format!("({},{})", side(pairing.antecessor_lane_id), side(pairing.successor_lane_id))
}

/// 按 `all` 的顺序取出 id 在 `ids` 中的成员
fn select<'a, T>(all: &'a [T], ids: &[Identifier], id_of: impl Fn(&T) -> Identifier) -> impl Iterator<Item = &'a T> {
    let wanted: HashSet<Identifier> = ids.iter().copied().collect();
    all.iter().filter(move |x| wanted.contains(&id_of(*x)))
}

pub fn build_lane_boundary_entity(boundary: &LaneBoundary, ctx: &BuildContext) -> ConversionResult<SceneEntity> {
    ensure_finite(Category::LaneBoundary, boundary.id, boundary.boundary_line.iter().map(|x| &x.position))?;

    let classification = &boundary.classification;
    let points: Vec<RibbonPoint> = boundary
        .boundary_line
        .iter()
        .map(|x| {
            let width = if x.width > 0f64 { x.width } else { ctx.style.min_boundary_width };
            RibbonPoint::new(to_na(&x.position), width)
        })
        .collect();
    let options = RibbonOptions {
        dashed: classification.boundary_type == LaneBoundaryType::DashedLine,
        dash_length: ctx.style.dash_length,
        arrows: ctx.style.boundary_arrows,
        ..RibbonOptions::default()
    };
    let color = ctx.style.lane_boundary_color(classification.boundary_type, classification.color);

    let mut entity = ctx.entity(Category::LaneBoundary, boundary.id);
    entity.triangles.push(ribbon(&points, color, &options));
    let mut metadata = Metadata::default();
    metadata.push("type", classification.boundary_type).push("color", classification.color);
    entity.metadata = metadata.into_inner();
    Ok(entity)
}

/// 逻辑车道线没有线宽，统一用最小线宽
pub fn build_logical_lane_boundary_entity(boundary: &LogicalLaneBoundary, ctx: &BuildContext) -> ConversionResult<SceneEntity> {
    ensure_finite(Category::LogicalLaneBoundary, boundary.id, boundary.boundary_line.iter().map(|x| &x.position))?;

    let points: Vec<RibbonPoint> = boundary
        .boundary_line
        .iter()
        .map(|x| RibbonPoint::new(to_na(&x.position), ctx.style.min_boundary_width))
        .collect();
    let options = RibbonOptions { arrows: ctx.style.boundary_arrows, ..RibbonOptions::default() };

    let mut entity = ctx.entity(Category::LogicalLaneBoundary, boundary.id);
    entity.triangles.push(ribbon(&points, ctx.style.logical_lane_boundary_color, &options));
    let mut metadata = Metadata::default();
    metadata
        .push("passing_rule", boundary.passing_rule)
        .push_list("physical_boundary_id", &boundary.physical_boundary_id);
    entity.metadata = metadata.into_inner();
    Ok(entity)
}

fn boundary_polyline(boundaries: &[LaneBoundary], ids: &[Identifier]) -> Vec<na::Vector3<f64>> {
    select(boundaries, ids, |x| x.id)
        .flat_map(|x| x.boundary_line.iter().map(|p| to_na(&p.position)))
        .collect()
}

fn logical_boundary_polyline(boundaries: &[LogicalLaneBoundary], ids: &[Identifier]) -> Vec<na::Vector3<f64>> {
    select(boundaries, ids, |x| x.id)
        .flat_map(|x| x.boundary_line.iter().map(|p| to_na(&p.position)))
        .collect()
}

pub fn lane_metadata(lane: &Lane) -> Vec<crate::data::output::KeyValuePair> {
    let classification = &lane.classification;
    let mut metadata = Metadata::default();
    metadata
        .push("type", classification.lane_type)
        .push_opt("subtype", classification.subtype)
        .push_opt("is_host_vehicle_lane", classification.is_host_vehicle_lane)
        .push_list("left_adjacent_lane_id", &classification.left_adjacent_lane_id)
        .push_list("right_adjacent_lane_id", &classification.right_adjacent_lane_id)
        .push_list("lane_pairing", classification.lane_pairing.iter().map(format_pairing));
    metadata.into_inner()
}

/// 车道面 + 可选的中心线
///
/// 中心线方向与行驶方向相反时箭头反向，host 所在车道的中心线高亮
pub fn build_lane_entity(lane: &Lane, boundaries: &[LaneBoundary], ctx: &BuildContext) -> ConversionResult<SceneEntity> {
    let classification = &lane.classification;
    ensure_finite(Category::Lane, lane.id, &classification.centerline)?;

    let left = boundary_polyline(boundaries, &classification.left_lane_boundary_id);
    let right = boundary_polyline(boundaries, &classification.right_lane_boundary_id);

    let mut entity = ctx.entity(Category::Lane, lane.id);
    entity.triangles.push(lane_surface(&left, &right, ctx.style.lane_color));

    if ctx.style.lane_centerline && classification.centerline.len() > 1 {
        let points: Vec<RibbonPoint> = classification
            .centerline
            .iter()
            .map(|x| RibbonPoint::new(to_na(x), ctx.style.centerline_width))
            .collect();
        let options = RibbonOptions {
            arrows: true,
            invert_arrows: !classification.centerline_is_driving_direction,
            highlighted: classification.is_host_vehicle_lane.unwrap_or(false),
            ..RibbonOptions::default()
        };
        entity.triangles.push(ribbon(&points, ctx.style.lane_color.with_alpha(CENTERLINE_OPACITY), &options));
    }

    entity.metadata = lane_metadata(lane);
    Ok(entity)
}

pub fn build_logical_lane_entity(
    lane: &LogicalLane,
    boundaries: &[LogicalLaneBoundary],
    ctx: &BuildContext,
) -> ConversionResult<SceneEntity> {
    let left = logical_boundary_polyline(boundaries, &lane.left_boundary_id);
    let right = logical_boundary_polyline(boundaries, &lane.right_boundary_id);

    let mut entity = ctx.entity(Category::LogicalLane, lane.id);
    entity.triangles.push(lane_surface(&left, &right, ctx.style.logical_lane_color));

    let mut metadata = Metadata::default();
    metadata
        .push("type", lane.lane_type)
        .push("move_direction", lane.move_direction)
        .push_list("left_adjacent_lane", lane.left_adjacent_lane.iter().map(|x| x.other_lane_id))
        .push_list("right_adjacent_lane", lane.right_adjacent_lane.iter().map(|x| x.other_lane_id))
        .push_list("physical_lane_reference", lane.physical_lane_reference.iter().map(|x| x.physical_lane_id));
    entity.metadata = metadata.into_inner();
    Ok(entity)
}
