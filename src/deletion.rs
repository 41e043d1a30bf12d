//! 跨帧删除跟踪
//!
//! 每个类别保存上一帧出现过的 id 集合，与本帧做差得到需要删除的实体，然后用本帧的集合覆盖

use std::collections::{BTreeSet, HashMap};

use crate::data::{Category, Identifier, output::{DeletionType, SceneEntityDeletion, Time}};

#[derive(Clone, Debug, Default)]
pub struct DeletionTracker {
    previous: HashMap<Category, BTreeSet<Identifier>>,
}

impl DeletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回 previous - current 中每个 id 的删除指令（按 id 升序），并把 previous 换成 current
    pub fn track<I>(&mut self, category: Category, current: I, timestamp: Time) -> Vec<SceneEntityDeletion>
    where
        I: IntoIterator<Item = Identifier>,
    {
        let current: BTreeSet<Identifier> = current.into_iter().collect();
        let previous = self.previous.entry(category).or_default();
        let deletions = previous
            .difference(&current)
            .map(|id| SceneEntityDeletion {
                timestamp,
                deletion_type: DeletionType::MatchingId,
                id: category.entity_id(*id),
            })
            .collect();
        *previous = current;
        deletions
    }

    pub fn previous_ids(&self, category: Category) -> Option<&BTreeSet<Identifier>> {
        self.previous.get(&category)
    }
}
