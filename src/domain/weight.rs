// ==========================================
// 影视拍摄排程系统 - 场景权重模型
// ==========================================
// 职责: 六项权重记录 + 派生场景（归一化后的排程输入）
// ==========================================

use crate::domain::scene::Scene;
use crate::domain::types::{TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ==========================================
// SceneWeight - 场景权重
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneWeight {
    pub location: i64,
    pub actor: i64,
    pub time_slot: i64,
    pub equipment: i64,
    pub complexity: i64,
    pub priority: i64,
    pub total_weight: i64,
}

impl SceneWeight {
    pub fn new(
        location: i64,
        actor: i64,
        time_slot: i64,
        equipment: i64,
        complexity: i64,
        priority: i64,
    ) -> Self {
        Self {
            location,
            actor,
            time_slot,
            equipment,
            complexity,
            priority,
            total_weight: location + actor + time_slot + equipment + complexity + priority,
        }
    }

    /// 字典序比较键 (location, actor, timeSlot, equipment, complexity, priority)
    ///
    /// 大常数分层在规模较大时会出现层级反转,排序一律使用此元组。
    pub fn rank_key(&self) -> (i64, i64, i64, i64, i64, i64) {
        (
            self.location,
            self.actor,
            self.time_slot,
            self.equipment,
            self.complexity,
            self.priority,
        )
    }

    /// 按字典序比较（Greater 表示 self 更重）
    pub fn cmp_rank(&self, other: &SceneWeight) -> Ordering {
        self.rank_key().cmp(&other.rank_key())
    }
}

// ==========================================
// WeightedScene - 派生场景
// ==========================================
// 场景 + 归一化字段 + 实际拍摄时长 + 权重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedScene {
    pub scene: Scene,
    pub location_name: String,
    pub location_group: String,
    pub time_of_day: TimeOfDay,
    pub time_slot: TimeSlot,
    /// 实际拍摄时长（分钟）
    pub actual_duration: u32,
    pub weight: SceneWeight,
}

impl WeightedScene {
    pub fn scene_id(&self) -> &str {
        &self.scene.id
    }

    pub fn scene_number(&self) -> i32 {
        self.scene.scene_number
    }
}
