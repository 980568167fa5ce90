// ==========================================
// 影视拍摄排程系统 - 拍摄日领域模型
// ==========================================
// 红线: total_duration <= max_duration
// 红线: 日内场景按时间排序,相邻场景间隔 >= 场间休息
// ==========================================

use crate::domain::scene::Scene;
use crate::domain::types::{ActivityKind, ClockTime, Department, TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ShootingDay - 拍摄日
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootingDay {
    /// 从 1 开始连续编号
    pub day_number: u32,

    /// 强制休息日（动态策略）,不含场景
    #[serde(default)]
    pub rest_day: bool,

    pub scenes: Vec<ScheduledScene>,
    pub time_range: TimeRange,

    /// 场景时长 + 场间休息（分钟）
    pub total_duration: u32,

    /// 当日适用上限（分钟）
    pub max_duration: u32,

    #[serde(default)]
    pub timeline: Vec<TimelineBlock>,

    #[serde(default)]
    pub summary: DaySummary,
}

impl ShootingDay {
    /// 休息日
    pub fn rest(day_number: u32) -> Self {
        Self {
            day_number,
            rest_day: true,
            scenes: Vec::new(),
            time_range: TimeRange::default(),
            total_duration: 0,
            max_duration: 0,
            timeline: Vec::new(),
            summary: DaySummary::default(),
        }
    }

    pub fn night_scenes(&self) -> impl Iterator<Item = &ScheduledScene> {
        self.scenes.iter().filter(|s| s.time_slot.is_night())
    }
}

// ==========================================
// ScheduledScene - 已排场景
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledScene {
    pub scene: Scene,
    pub location_name: String,
    pub location_group: String,
    pub time_of_day: TimeOfDay,
    pub time_slot: TimeSlot,
    pub actual_duration: u32,
    pub total_weight: i64,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

// ==========================================
// TimelineBlock - 时间线活动块
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBlock {
    pub kind: ActivityKind,
    pub start: ClockTime,
    pub end: ClockTime,
    pub duration_minutes: u32,
    #[serde(default)]
    pub scene_id: Option<String>,
    pub label: String,
}

// ==========================================
// DaySummary - 当日人员/器材汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub cast: Vec<String>,
    pub locations: Vec<String>,
    pub equipment: BTreeMap<Department, Vec<String>>,
    pub crew: BTreeMap<Department, Vec<String>>,
}
