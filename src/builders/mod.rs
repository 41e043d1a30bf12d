//! # 实体构建
//!
//! 每个类别一个纯映射：输入一条已确定所有可选字段的 OSI 记录和样式参数，输出一个场景实体
//! （道路标线可能没有输出）。缺失的可选字段不写进 metadata

pub mod lanes;
pub mod objects;
pub mod sensor;
pub mod traffic;

use itertools::Itertools;

use crate::config::Config;
use crate::data::{Category, Identifier, Vector3d, output::{KeyValuePair, SceneEntity, Time}};
use crate::error::{ConversionError, ConversionResult};
use crate::style::Style;

/// 一帧内所有 builder 共享的参数
#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    pub frame_id: &'a str,
    pub time: Time,
    pub style: &'a Style,
    pub config: &'a Config,
}

impl<'a> BuildContext<'a> {
    pub fn entity(&self, category: Category, id: Identifier) -> SceneEntity {
        SceneEntity::new(category.entity_id(id), self.frame_id, self.time)
    }
}

/// 有序的 metadata 键值对
#[derive(Debug, Default)]
pub(crate) struct Metadata(Vec<KeyValuePair>);

impl Metadata {
    pub fn push<V: ToString>(&mut self, key: &str, value: V) -> &mut Self {
        self.0.push(KeyValuePair { key: key.to_string(), value: value.to_string() });
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// 逗号连接，列表为空时不写
    pub fn push_list<I>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        let joined = values.into_iter().join(",");
        if !joined.is_empty() {
            self.push(key, joined);
        }
        self
    }

    pub fn into_inner(self) -> Vec<KeyValuePair> {
        self.0
    }
}

pub(crate) fn ensure_finite<'v, I>(category: Category, id: Identifier, values: I) -> ConversionResult<()>
where
    I: IntoIterator<Item = &'v Vector3d>,
{
    if values.into_iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(ConversionError::NonFiniteGeometry { entity: category.entity_id(id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_skips_absent_values() -> () {
        let mut metadata = Metadata::default();
        metadata
            .push("type", "CAR")
            .push_opt::<String>("velocity", None)
            .push_list("assigned_lane_id", Vec::<u64>::new())
            .push_list("adjacent", vec![3, 4]);
        let keys: Vec<_> = metadata.into_inner().into_iter().map(|x| (x.key, x.value)).collect();
        assert_eq!(keys, vec![("type".to_string(), "CAR".to_string()), ("adjacent".to_string(), "3,4".to_string())]);
    }

    #[test]
    fn non_finite_geometry_is_rejected() -> () {
        let good = Vector3d::new(1f64, 2f64, 3f64);
        let bad = Vector3d::new(f64::NAN, 0f64, 0f64);
        assert!(ensure_finite(Category::Lane, Identifier::from(1), [&good]).is_ok());
        assert_eq!(
            ensure_finite(Category::Lane, Identifier::from(1), [&good, &bad]),
            Err(ConversionError::NonFiniteGeometry { entity: "lane_1".to_string() })
        );
    }
}
