//! # 缓存
//!
//! 1. `FrameCache`：以输入帧的身份（Arc 地址）为键保存整帧结果，帧被释放后条目随之失效
//! 2. `HashSlot`：以 id 序列的 32 位 hash 为键，只保留一个条目
//! 3. `ModelCache`：以模型路径为键保存模型模板，每帧原地更新位姿
//!
//! `HashSlot` 假设 id 序列相同则几何相同。hash 碰撞或同 id 几何变化时会复用过期结果，
//! 运行时不做检测

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::data::{Identifier, input::GroundTruth, output::{Color, ModelPrimitive, Pose, SceneEntity, Vector3}};
use crate::resolver::{ModelResolver, media_type};

/// 与 `HashSlot` 配套的 id 序列 hash：把各 id 的十进制串首尾相接，再逐字符做 h = h * 31 + c（32 位回绕）
///
/// 只用作廉价的相等判断，不是加密 hash
pub fn content_hash<I>(ids: I) -> u32
where
    I: IntoIterator<Item = Identifier>,
{
    ids.into_iter().fold(0u32, |hash, id| {
        id.value.to_string().bytes().fold(hash, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u32))
    })
}

/// 弱引用键的整帧缓存
#[derive(Debug, Default)]
pub struct FrameCache {
    entries: Vec<(Weak<GroundTruth>, Arc<Vec<SceneEntity>>)>,
}

impl FrameCache {
    pub fn get(&mut self, frame: &Arc<GroundTruth>) -> Option<Arc<Vec<SceneEntity>>> {
        self.prune();
        self.entries
            .iter()
            .find(|(key, _)| std::ptr::eq(key.as_ptr(), Arc::as_ptr(frame)))
            .map(|(_, entities)| entities.clone())
    }

    pub fn insert(&mut self, frame: &Arc<GroundTruth>, entities: Arc<Vec<SceneEntity>>) {
        self.prune();
        self.entries.retain(|(key, _)| !std::ptr::eq(key.as_ptr(), Arc::as_ptr(frame)));
        self.entries.push((Arc::downgrade(frame), entities));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&mut self) -> usize {
        self.prune();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// 帧被释放后，Weak 仍占着那块分配，所以地址不会被新帧复用
    fn prune(&mut self) {
        self.entries.retain(|(key, _)| key.strong_count() > 0);
    }
}

/// 单槽 hash 缓存，新 hash 写入时挤掉旧条目
#[derive(Debug, Default)]
pub struct HashSlot {
    slot: Option<(u32, Vec<SceneEntity>)>,
}

impl HashSlot {
    pub fn get(&self, hash: u32) -> Option<&[SceneEntity]> {
        match &self.slot {
            Some((key, entities)) if *key == hash => Some(entities.as_slice()),
            _ => None,
        }
    }

    pub fn replace(&mut self, hash: u32, entities: Vec<SceneEntity>) {
        self.slot = Some((hash, entities));
    }

    pub fn key(&self) -> Option<u32> {
        self.slot.as_ref().map(|(key, _)| *key)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// 模型模板缓存
#[derive(Debug, Default)]
pub struct ModelCache {
    templates: HashMap<String, ModelPrimitive>,
}

impl ModelCache {
    /// 取 `key` 对应的模板，原地写入本帧位姿后返回一份拷贝
    ///
    /// 第一次遇到 `key` 时同步创建位姿归零、全透明的模板；路径解析失败则返回 None 且不缓存
    pub fn posed(&mut self, key: &str, pose: Pose, resolver: &dyn ModelResolver) -> Option<ModelPrimitive> {
        if !self.templates.contains_key(key) {
            let url = resolver.resolve(key)?;
            self.templates.insert(key.to_string(), ModelPrimitive {
                pose: Pose::default(),
                scale: Vector3::new(1f64, 1f64, 1f64),
                color: Color::rgba(0f64, 0f64, 0f64, 0f64),
                override_color: false,
                media_type: media_type(&url).to_string(),
                url,
            });
        }
        let template = self.templates.get_mut(key)?;
        template.pose = pose;
        Some(template.clone())
    }

    pub fn template(&self, key: &str) -> Option<&ModelPrimitive> {
        self.templates.get(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FileUrlResolver;

    fn ids(raw: &[u64]) -> Vec<Identifier> {
        raw.iter().copied().map(Identifier::from).collect()
    }

    #[test]
    fn content_hash_is_order_dependent() -> () {
        assert_eq!(content_hash(ids(&[])), 0);
        assert_eq!(content_hash(ids(&[1, 2])), content_hash(ids(&[1, 2])));
        assert_ne!(content_hash(ids(&[1, 2])), content_hash(ids(&[2, 1])));
        // "1" -> 49, "12" -> 49 * 31 + 50
        assert_eq!(content_hash(ids(&[1])), 49);
        assert_eq!(content_hash(ids(&[12])), 49 * 31 + 50);
    }

    #[test]
    fn content_hash_folds_concatenated_digits() -> () {
        // 拼接后同为 "123"
        assert_eq!(content_hash(ids(&[1, 23])), content_hash(ids(&[12, 3])));
    }

    #[test]
    fn frame_cache_forgets_dropped_frames() -> () {
        let mut cache = FrameCache::default();
        let frame = Arc::new(GroundTruth::default());
        let other = Arc::new(GroundTruth::default());
        cache.insert(&frame, Arc::new(Vec::new()));
        assert!(cache.get(&frame).is_some());
        assert!(cache.get(&other).is_none());

        drop(frame);
        assert!(cache.is_empty());
    }

    #[test]
    fn hash_slot_keeps_one_entry() -> () {
        let mut slot = HashSlot::default();
        slot.replace(1, Vec::new());
        assert!(slot.get(1).is_some());
        slot.replace(2, Vec::new());
        assert!(slot.get(1).is_none());
        assert_eq!(slot.key(), Some(2));
    }

    #[test]
    fn model_template_is_created_once_and_reposed() -> () {
        let mut cache = ModelCache::default();
        let mut pose = Pose::default();
        pose.position.x = 3f64;
        let first = cache.posed("/models/car.glb", pose, &FileUrlResolver).unwrap();
        assert_eq!(first.color.a, 0f64);
        assert_eq!(first.url, "file:///models/car.glb");

        pose.position.x = 5f64;
        let second = cache.posed("/models/car.glb", pose, &FileUrlResolver).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(second.pose.position.x, 5f64);
        // 之前返回的拷贝不受影响
        assert_eq!(first.pose.position.x, 3f64);
        assert_eq!(cache.template("/models/car.glb").map(|x| x.pose.position.x), Some(5f64));
    }

    #[test]
    fn unresolvable_model_is_not_cached() -> () {
        let mut cache = ModelCache::default();
        assert!(cache.posed("relative/car.glb", Pose::default(), &FileUrlResolver).is_none());
        assert!(cache.is_empty());
    }
}
