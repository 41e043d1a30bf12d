//! # OSI ground truth 转场景更新
//!
//! `SceneConverter` 持有跨帧状态（删除跟踪、各级缓存、统计），每来一帧调用一次，必须按到达顺序调用

pub mod builders;
pub mod cache;
pub mod config;
pub mod data;
pub mod deletion;
pub mod error;
pub mod geometry;
pub mod resolver;
pub mod style;
pub mod transforms;
pub mod triangulation;

use std::collections::BTreeMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, error, warn};

use crate::builders::{
    BuildContext,
    lanes::{build_lane_boundary_entity, build_lane_entity, build_logical_lane_boundary_entity, build_logical_lane_entity},
    objects::{ObjectRecord, build_object_entity},
    sensor::build_sensor_data_entity,
    traffic::{build_road_marking_entity, build_traffic_light_entity, build_traffic_sign_entity},
};
use crate::cache::{FrameCache, HashSlot, ModelCache, content_hash};
use crate::config::Config;
use crate::data::{
    Category, Identifier,
    input::{GroundTruth, SensorData, SensorView},
    output::{FrameTransforms, SceneEntity, SceneEntityDeletion, SceneUpdate, Time},
};
use crate::deletion::DeletionTracker;
use crate::error::{ConversionError, ConversionResult};
use crate::resolver::{FileUrlResolver, ModelResolver};
use crate::style::Style;
use crate::transforms::GLOBAL_FRAME;

/// 运行计数，测试里用来判断某个类别是否被重建
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames: usize,
    pub frame_cache_hits: usize,
    pub lane_boundary_cache_hits: usize,
    pub lane_cache_hits: usize,
    /// 构建阶段出错、只输出删除指令的帧数
    pub failures: usize,
    /// 各类别 builder 的调用次数
    pub builds: BTreeMap<Category, usize>,
}

impl Stats {
    pub fn builds(&self, category: Category) -> usize {
        self.builds.get(&category).copied().unwrap_or(0)
    }

    fn built(&mut self, category: Category, count: usize) {
        *self.builds.entry(category).or_insert(0) += count;
    }
}

/// 单槽 hash 缓存命中则直接取用，否则重建；关闭缓存时每次都重建且不写入
///
/// 返回的 bool 表示是否重建
fn reuse_or_build<F>(slot: &mut HashSlot, hash: u32, caching: bool, build: F) -> ConversionResult<(Vec<SceneEntity>, bool)>
where
    F: FnOnce() -> ConversionResult<Vec<SceneEntity>>,
{
    if caching {
        if let Some(cached) = slot.get(hash) {
            debug!(hash, "reusing cached entities");
            return Ok((cached.to_vec(), false));
        }
    }
    let built = build()?;
    if caching {
        slot.replace(hash, built.clone());
    }
    Ok((built, true))
}

pub struct SceneConverter {
    style: Style,
    resolver: Box<dyn ModelResolver>,
    tracker: DeletionTracker,
    frame_cache: FrameCache,
    lane_boundary_cache: HashSlot,
    lane_cache: HashSlot,
    model_cache: ModelCache,
    previous_config: Option<Arc<Config>>,
    stats: Stats,
}

impl Default for SceneConverter {
    fn default() -> Self {
        Self::new(Style::default(), Box::new(FileUrlResolver))
    }
}

impl SceneConverter {
    pub fn new(style: Style, resolver: Box<dyn ModelResolver>) -> Self {
        Self {
            style,
            resolver,
            tracker: DeletionTracker::new(),
            frame_cache: FrameCache::default(),
            lane_boundary_cache: HashSlot::default(),
            lane_cache: HashSlot::default(),
            model_cache: ModelCache::default(),
            previous_config: None,
            stats: Stats::default(),
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn deletion_tracker(&self) -> &DeletionTracker {
        &self.tracker
    }

    pub fn model_cache(&self) -> &ModelCache {
        &self.model_cache
    }

    /// 配置换了一个实例就清空所有缓存，删除跟踪的历史保留
    fn check_config(&mut self, config: &Arc<Config>) {
        let changed = match &self.previous_config {
            Some(previous) => !Arc::ptr_eq(previous, config),
            None => true,
        };
        if changed {
            if self.previous_config.is_some() {
                debug!("config changed, clearing caches");
            }
            self.frame_cache.clear();
            self.lane_boundary_cache.clear();
            self.lane_cache.clear();
            self.model_cache.clear();
            self.previous_config = Some(config.clone());
        }
    }

    /// 本帧各类别的 id，隐藏的车道类别按空集处理
    fn current_ids(frame: &GroundTruth, config: &Config, category: Category) -> Vec<Identifier> {
        match category {
            Category::MovingObject => frame.moving_object.iter().map(|x| x.id).collect(),
            Category::StationaryObject => frame.stationary_object.iter().map(|x| x.id).collect(),
            Category::TrafficSign => frame.traffic_sign.iter().map(|x| x.id).collect(),
            Category::TrafficLight => frame.traffic_light.iter().map(|x| x.id).collect(),
            Category::RoadMarking => frame.road_marking.iter().map(|x| x.id).collect(),
            Category::LaneBoundary if config.show_physical_lanes => frame.lane_boundary.iter().map(|x| x.id).collect(),
            Category::Lane if config.show_physical_lanes => frame.lane.iter().map(|x| x.id).collect(),
            Category::LogicalLaneBoundary if config.show_logical_lanes => {
                frame.logical_lane_boundary.iter().map(|x| x.id).collect()
            }
            Category::LogicalLane if config.show_logical_lanes => frame.logical_lane.iter().map(|x| x.id).collect(),
            _ => Vec::new(),
        }
    }

    fn track_deletions(&mut self, frame: &GroundTruth, config: &Config, time: Time) -> Vec<SceneEntityDeletion> {
        Category::iter()
            .flat_map(|category| self.tracker.track(category, Self::current_ids(frame, config, category), time))
            .collect()
    }

    fn build_entities(&mut self, frame: &GroundTruth, config: &Config) -> ConversionResult<Vec<SceneEntity>> {
        let ctx = BuildContext { frame_id: GLOBAL_FRAME, time: frame.timestamp.into(), style: &self.style, config };
        let resolver = self.resolver.as_ref();
        let models = &mut self.model_cache;
        let stats = &mut self.stats;
        let mut entities = Vec::new();

        for object in &frame.moving_object {
            entities.push(build_object_entity(ObjectRecord::moving(object, frame.host_vehicle_id), &ctx, models, resolver)?);
        }
        stats.built(Category::MovingObject, frame.moving_object.len());

        for object in &frame.stationary_object {
            entities.push(build_object_entity(ObjectRecord::Stationary(object), &ctx, models, resolver)?);
        }
        stats.built(Category::StationaryObject, frame.stationary_object.len());

        for sign in &frame.traffic_sign {
            entities.push(build_traffic_sign_entity(sign, &ctx, models, resolver)?);
        }
        stats.built(Category::TrafficSign, frame.traffic_sign.len());

        for light in &frame.traffic_light {
            entities.push(build_traffic_light_entity(light, &ctx, models, resolver)?);
        }
        stats.built(Category::TrafficLight, frame.traffic_light.len());

        for marking in &frame.road_marking {
            entities.extend(build_road_marking_entity(marking, &ctx)?);
        }
        stats.built(Category::RoadMarking, frame.road_marking.len());

        if config.show_physical_lanes {
            let hash = content_hash(frame.lane_boundary.iter().map(|x| x.id));
            let (built, rebuilt) = reuse_or_build(&mut self.lane_boundary_cache, hash, config.caching, || {
                frame.lane_boundary.iter().map(|x| build_lane_boundary_entity(x, &ctx)).collect()
            })?;
            if rebuilt {
                stats.built(Category::LaneBoundary, frame.lane_boundary.len());
            } else {
                stats.lane_boundary_cache_hits += 1;
            }
            entities.extend(built);
        }

        if config.show_logical_lanes {
            for boundary in &frame.logical_lane_boundary {
                entities.push(build_logical_lane_boundary_entity(boundary, &ctx)?);
            }
            stats.built(Category::LogicalLaneBoundary, frame.logical_lane_boundary.len());
        }

        if config.show_physical_lanes {
            let hash = content_hash(frame.lane.iter().map(|x| x.id));
            let (built, rebuilt) = reuse_or_build(&mut self.lane_cache, hash, config.caching, || {
                frame.lane.iter().map(|x| build_lane_entity(x, &frame.lane_boundary, &ctx)).collect()
            })?;
            if rebuilt {
                stats.built(Category::Lane, frame.lane.len());
            } else {
                stats.lane_cache_hits += 1;
            }
            entities.extend(built);
        }

        if config.show_logical_lanes {
            for lane in &frame.logical_lane {
                entities.push(build_logical_lane_entity(lane, &frame.logical_lane_boundary, &ctx)?);
            }
            stats.built(Category::LogicalLane, frame.logical_lane.len());
        }

        Ok(entities)
    }

    /// 转换一帧 ground truth
    ///
    /// 删除指令总是先算（整帧缓存命中也一样），构建出错时只返回删除指令
    pub fn convert_ground_truth(&mut self, frame: &Arc<GroundTruth>, config: &Arc<Config>) -> SceneUpdate {
        self.check_config(config);
        self.stats.frames += 1;

        let deletions = self.track_deletions(frame, config, frame.timestamp.into());

        if let Some(cached) = self.frame_cache.get(frame) {
            self.stats.frame_cache_hits += 1;
            debug!(entities = cached.len(), "ground truth frame served from frame cache");
            return SceneUpdate { deletions, entities: cached.to_vec() };
        }

        match self.build_entities(frame, config) {
            Ok(entities) => {
                self.frame_cache.insert(frame, Arc::new(entities.clone()));
                SceneUpdate { deletions, entities }
            }
            Err(error) => {
                self.stats.failures += 1;
                error!(%error, "error during ground truth conversion, skipping frame");
                SceneUpdate { deletions, entities: Vec::new() }
            }
        }
    }

    pub fn convert_sensor_view(&mut self, view: &SensorView, config: &Arc<Config>) -> SceneUpdate {
        match &view.global_ground_truth {
            Some(frame) => self.convert_ground_truth(frame, config),
            None => {
                warn!(error = %ConversionError::MissingGroundTruth, "skipping sensor view");
                SceneUpdate::default()
            }
        }
    }

    /// SensorData 走预览路径，不参与删除跟踪和缓存
    pub fn convert_sensor_data(&mut self, data: &SensorData) -> SceneUpdate {
        match build_sensor_data_entity(data) {
            Ok(entity) => SceneUpdate { deletions: Vec::new(), entities: vec![entity] },
            Err(error) => {
                self.stats.failures += 1;
                error!(%error, "error during sensor data conversion, skipping message");
                SceneUpdate::default()
            }
        }
    }

    pub fn frame_transforms(&self, frame: &GroundTruth) -> FrameTransforms {
        transforms::frame_transforms(frame)
    }

    pub fn sensor_view_frame_transforms(&self, view: &SensorView) -> FrameTransforms {
        match &view.global_ground_truth {
            Some(frame) => transforms::frame_transforms(frame),
            None => {
                warn!(error = %ConversionError::MissingGroundTruth, "no frame transforms for sensor view");
                FrameTransforms::default()
            }
        }
    }
}
