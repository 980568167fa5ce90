// ==========================================
// 影视拍摄排程系统 - 场景权重引擎
// ==========================================
// 职责: 按六项因子对场景相对全体场景打分
// 输入: 单个场景 + 全体场景
// 输出: SceneWeight (六项 + 合计)
// ==========================================
// 说明: 计数一次性预聚合到 SceneIndex,避免两两比较 O(n²)
// ==========================================

use crate::domain::scene::Scene;
use crate::domain::types::TimeOfDay;
use crate::domain::weight::{SceneWeight, WeightedScene};
use crate::engine::duration::DurationEstimator;
use std::collections::HashMap;

// 权重因子
pub const LOCATION_FACTOR: i64 = 1000;
pub const ACTOR_SCENE_FACTOR: i64 = 300;
pub const ACTOR_FREQUENT_BONUS: i64 = 200;
pub const ACTOR_FREQUENT_THRESHOLD: usize = 3;
pub const ACTOR_SAME_LOCATION_FACTOR: i64 = 100;
pub const ACTOR_SAME_TIME_FACTOR: i64 = 50;
pub const TIME_SLOT_FACTOR: i64 = 200;
pub const EQUIPMENT_FACTOR: i64 = 100;
pub const COMPLEXITY_FACTOR: i64 = 10;
pub const PRIORITY_BASE: i64 = 100;

// ==========================================
// SceneIndex - 场景计数索引
// ==========================================
#[derive(Debug, Default)]
pub struct SceneIndex {
    location: HashMap<String, usize>,
    time_of_day: HashMap<TimeOfDay, usize>,
    equipment: HashMap<String, usize>,
    actor: HashMap<String, usize>,
    actor_location: HashMap<(String, String), usize>,
    actor_time_of_day: HashMap<(String, TimeOfDay), usize>,
}

impl SceneIndex {
    /// 单次遍历构建全部计数
    pub fn build(scenes: &[Scene]) -> Self {
        let mut index = SceneIndex::default();
        for scene in scenes {
            let location = scene.location_name().to_string();
            let tod = scene.normalized_time_of_day();

            *index.location.entry(location.clone()).or_insert(0) += 1;
            *index.time_of_day.entry(tod).or_insert(0) += 1;
            *index.equipment.entry(scene.equipment_signature()).or_insert(0) += 1;

            for actor in scene.actor_names() {
                *index.actor.entry(actor.to_string()).or_insert(0) += 1;
                *index
                    .actor_location
                    .entry((actor.to_string(), location.clone()))
                    .or_insert(0) += 1;
                *index
                    .actor_time_of_day
                    .entry((actor.to_string(), tod))
                    .or_insert(0) += 1;
            }
        }
        index
    }

    fn location_count(&self, location: &str) -> usize {
        self.location.get(location).copied().unwrap_or(0)
    }

    fn time_of_day_count(&self, tod: TimeOfDay) -> usize {
        self.time_of_day.get(&tod).copied().unwrap_or(0)
    }

    fn equipment_count(&self, signature: &str) -> usize {
        self.equipment.get(signature).copied().unwrap_or(0)
    }

    fn actor_count(&self, actor: &str) -> usize {
        self.actor.get(actor).copied().unwrap_or(0)
    }

    fn actor_location_count(&self, actor: &str, location: &str) -> usize {
        self.actor_location
            .get(&(actor.to_string(), location.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn actor_time_of_day_count(&self, actor: &str, tod: TimeOfDay) -> usize {
        self.actor_time_of_day
            .get(&(actor.to_string(), tod))
            .copied()
            .unwrap_or(0)
    }
}

// ==========================================
// WeightCalculator - 场景权重引擎
// ==========================================
pub struct WeightCalculator<'a> {
    estimator: &'a DurationEstimator,
}

impl<'a> WeightCalculator<'a> {
    pub fn new(estimator: &'a DurationEstimator) -> Self {
        Self { estimator }
    }

    /// 计算单个场景相对全体场景的权重
    ///
    /// 批量计算请使用 `weigh_all`（索引只构建一次）。
    pub fn calculate(&self, scene: &Scene, all_scenes: &[Scene]) -> SceneWeight {
        let index = SceneIndex::build(all_scenes);
        self.calculate_with_index(scene, &index)
    }

    /// 基于预构建索引计算权重
    ///
    /// | 项 | 公式 |
    /// |---|---|
    /// | location | 同地点场景数 × 1000 |
    /// | actor | Σ演员: 出场数×300 (+200 若 ≥3) + 同地点出场×100 + 同时段出场×50 |
    /// | timeSlot | 同时段场景数 × 200 |
    /// | equipment | 同器材签名场景数 × 100 |
    /// | complexity | 实际拍摄时长 × 10 |
    /// | priority | 100 − 场次号 |
    pub fn calculate_with_index(&self, scene: &Scene, index: &SceneIndex) -> SceneWeight {
        let location = scene.location_name();
        let tod = scene.normalized_time_of_day();

        let location_term = index.location_count(location) as i64 * LOCATION_FACTOR;

        let mut actor_term: i64 = 0;
        for actor in scene.actor_names() {
            let appearances = index.actor_count(actor);
            actor_term += appearances as i64 * ACTOR_SCENE_FACTOR;
            if appearances >= ACTOR_FREQUENT_THRESHOLD {
                actor_term += ACTOR_FREQUENT_BONUS;
            }
            actor_term += index.actor_location_count(actor, location) as i64
                * ACTOR_SAME_LOCATION_FACTOR;
            actor_term += index.actor_time_of_day_count(actor, tod) as i64 * ACTOR_SAME_TIME_FACTOR;
        }

        let time_slot_term = index.time_of_day_count(tod) as i64 * TIME_SLOT_FACTOR;
        let equipment_term =
            index.equipment_count(&scene.equipment_signature()) as i64 * EQUIPMENT_FACTOR;

        let actual = self
            .estimator
            .estimate(scene.nominal_duration.as_ref())
            .actual_minutes;
        let complexity_term = actual as i64 * COMPLEXITY_FACTOR;
        let priority_term = PRIORITY_BASE - scene.scene_number as i64;

        SceneWeight::new(
            location_term,
            actor_term,
            time_slot_term,
            equipment_term,
            complexity_term,
            priority_term,
        )
    }

    /// 批量计算（保持输入顺序）
    pub fn weigh_all(&self, scenes: &[Scene]) -> Vec<WeightedScene> {
        let index = SceneIndex::build(scenes);
        scenes
            .iter()
            .map(|scene| {
                let tod = scene.normalized_time_of_day();
                WeightedScene {
                    scene: scene.clone(),
                    location_name: scene.location_name().to_string(),
                    location_group: scene.location_group().to_string(),
                    time_of_day: tod,
                    time_slot: tod.slot(),
                    actual_duration: self
                        .estimator
                        .estimate(scene.nominal_duration.as_ref())
                        .actual_minutes,
                    weight: self.calculate_with_index(scene, &index),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::{CastMember, Location, NominalDuration};
    use crate::domain::types::Department;
    use std::collections::BTreeMap;

    fn scene(id: &str, number: i32, location: &str, tod: &str, cast: &[&str]) -> Scene {
        Scene {
            id: id.to_string(),
            scene_number: number,
            title: None,
            description: None,
            location: Some(Location {
                name: location.to_string(),
                group_name: None,
            }),
            time_of_day: Some(tod.to_string()),
            cast: cast
                .iter()
                .map(|n| CastMember {
                    role: format!("role-{}", n),
                    name: n.to_string(),
                })
                .collect(),
            nominal_duration: Some(NominalDuration::Number(5.0)),
            equipment: BTreeMap::new(),
            crew: BTreeMap::new(),
            props: vec![],
            costumes: vec![],
            cameras: vec![],
        }
    }

    #[test]
    fn test_weight_terms() {
        let scenes = vec![
            scene("1", 1, "Studio A", "day", &["Kim", "Lee"]),
            scene("2", 2, "Studio A", "night", &["Kim"]),
            scene("3", 3, "Park", "day", &["Kim"]),
            scene("4", 4, "Studio A", "day", &[]),
        ];
        let estimator = DurationEstimator::default();
        let calc = WeightCalculator::new(&estimator);
        let w = calc.calculate(&scenes[0], &scenes);

        assert_eq!(w.location, 3 * 1000);
        // Kim: 3 场 ×300 + 200 + 同地点 2 ×100 + 同时段(morning) 2 ×50 = 1400
        // Lee: 1 场 ×300 + 同地点 1 ×100 + 同时段 1 ×50 = 450
        assert_eq!(w.actor, 1400 + 450);
        assert_eq!(w.time_slot, 3 * 200);
        assert_eq!(w.equipment, 4 * 100);
        assert_eq!(w.complexity, 100 * 10);
        assert_eq!(w.priority, 99);
        assert_eq!(
            w.total_weight,
            w.location + w.actor + w.time_slot + w.equipment + w.complexity + w.priority
        );
    }

    #[test]
    fn test_duplicate_cast_counted_once() {
        let scenes = vec![scene("1", 1, "A", "day", &["Kim", "Kim"])];
        let estimator = DurationEstimator::default();
        let w = WeightCalculator::new(&estimator).calculate(&scenes[0], &scenes);
        assert_eq!(w.actor, 300 + 100 + 50);
    }

    #[test]
    fn test_equipment_signature_grouping() {
        let mut a = scene("1", 1, "A", "day", &[]);
        a.equipment.insert(Department::Lighting, vec!["HMI".into()]);
        let mut b = scene("2", 2, "B", "day", &[]);
        b.equipment.insert(Department::Lighting, vec!["HMI".into()]);
        let c = scene("3", 3, "C", "day", &[]);
        let scenes = vec![a, b, c];

        let estimator = DurationEstimator::default();
        let calc = WeightCalculator::new(&estimator);
        assert_eq!(calc.calculate(&scenes[0], &scenes).equipment, 200);
        assert_eq!(calc.calculate(&scenes[2], &scenes).equipment, 100);
    }

    #[test]
    fn test_weigh_all_is_deterministic() {
        let scenes = vec![
            scene("1", 1, "Studio A", "day", &["Kim"]),
            scene("2", 2, "Park", "밤", &["Kim", "Park"]),
        ];
        let estimator = DurationEstimator::default();
        let calc = WeightCalculator::new(&estimator);
        let first = calc.weigh_all(&scenes);
        let second = calc.weigh_all(&scenes);
        assert_eq!(first, second);
        assert_eq!(first[1].time_of_day, TimeOfDay::Night);
        assert_eq!(first[1].actual_duration, 100);
    }
}
