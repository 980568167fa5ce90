// ==========================================
// 影视拍摄排程系统 - 地点/时段排序引擎
// ==========================================
// 职责: 地点分组 -> 组内按时段分桶 -> 桶内按权重排序
// 输入: 已计算权重的场景
// 输出: 扁平有序场景列表
// ==========================================

use crate::domain::types::TimeSlot;
use crate::domain::weight::WeightedScene;
use std::cmp::Ordering;
use std::collections::HashMap;

// ==========================================
// LocationSlotSorter - 地点/时段排序引擎
// ==========================================
pub struct LocationSlotSorter {
    // 无状态引擎，不需要注入依赖
}

impl LocationSlotSorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序场景列表
    ///
    /// 排序键:
    /// 1) 地点组（按首次出现顺序,缺失地点归入 "unspecified"）
    /// 2) 时段桶 [day, night, unspecified]
    /// 3) 权重元组降序
    /// 4) 场次号升序
    pub fn sort(&self, scenes: Vec<WeightedScene>) -> Vec<WeightedScene> {
        let groups = self.group_by_location(scenes);

        let mut ordered = Vec::new();
        for (_location, members) in groups {
            let mut buckets: HashMap<TimeSlot, Vec<WeightedScene>> = HashMap::new();
            for scene in members {
                buckets.entry(scene.time_slot).or_default().push(scene);
            }

            for slot in TimeSlot::ORDER {
                if let Some(mut bucket) = buckets.remove(&slot) {
                    bucket.sort_by(|a, b| self.compare(a, b));
                    ordered.extend(bucket);
                }
            }
        }
        ordered
    }

    /// 按地点分组（保持首次出现顺序）
    ///
    /// # 返回
    /// Vec<(地点名, 组内场景)>
    pub fn group_by_location(
        &self,
        scenes: Vec<WeightedScene>,
    ) -> Vec<(String, Vec<WeightedScene>)> {
        let mut groups: Vec<(String, Vec<WeightedScene>)> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for scene in scenes {
            let key = scene.location_name.clone();
            match position.get(&key) {
                Some(&idx) => groups[idx].1.push(scene),
                None => {
                    position.insert(key.clone(), groups.len());
                    groups.push((key, vec![scene]));
                }
            }
        }
        groups
    }

    /// 比较两个场景
    ///
    /// # 返回
    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &WeightedScene, b: &WeightedScene) -> Ordering {
        // 1. 权重元组（降序，越重越优先）
        match b.weight.cmp_rank(&a.weight) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 场次号（升序）
        a.scene_number().cmp(&b.scene_number())
    }
}

impl Default for LocationSlotSorter {
    fn default() -> Self {
        Self::new()
    }
}
