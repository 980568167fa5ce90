// ==========================================
// 影视拍摄排程系统 - 排程结果领域模型
// ==========================================
// 职责: 待排队列、提示信息、未排场景、排程结果与持久化记录
// 红线: 任何场景不得静默丢失 (已排 + 未排 == 输入)
// ==========================================

use crate::domain::day::ShootingDay;
use crate::domain::types::{MessageCode, PackingPolicy, TimeSlot};
use crate::domain::weight::WeightedScene;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ==========================================
// PendingQueue - 待排队列
// ==========================================
// 两个 FIFO: 日间（含未指定）与夜间
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    pub day: VecDeque<WeightedScene>,
    pub night: VecDeque<WeightedScene>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按时段入队
    pub fn push(&mut self, scene: WeightedScene) {
        if scene.time_slot == TimeSlot::Night {
            self.night.push_back(scene);
        } else {
            self.day.push_back(scene);
        }
    }

    pub fn len(&self) -> usize {
        self.day.len() + self.night.len()
    }

    pub fn is_empty(&self) -> bool {
        self.day.is_empty() && self.night.is_empty()
    }

    /// 按 day -> night 顺序取出剩余场景
    pub fn drain_all(&mut self) -> Vec<WeightedScene> {
        self.day.drain(..).chain(self.night.drain(..)).collect()
    }
}

// ==========================================
// ScheduleMessage - 非致命提示
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMessage {
    pub code: MessageCode,
    #[serde(default)]
    pub scene_id: Option<String>,
    pub detail: String,
}

impl ScheduleMessage {
    pub fn new(code: MessageCode, scene_id: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            code,
            scene_id: scene_id.map(str::to_string),
            detail: detail.into(),
        }
    }
}

// ==========================================
// UnplacedScene - 未能落位的场景
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedScene {
    pub scene_id: String,
    pub scene_number: i32,
    pub time_slot: TimeSlot,
    pub actual_duration: u32,
    pub reason: String,
}

// ==========================================
// GeneratedSchedule - 排程结果（纯计算产物）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    pub policy: PackingPolicy,
    pub days: Vec<ShootingDay>,
    pub total_days: u32,
    pub total_scenes: u32,
    pub total_duration: u32,
    /// 存在未排场景
    pub incomplete: bool,
    pub unplaced: Vec<UnplacedScene>,
    pub messages: Vec<ScheduleMessage>,
}

impl GeneratedSchedule {
    /// 空排程（输入为空时的显式结果）
    pub fn empty(policy: PackingPolicy, message: ScheduleMessage) -> Self {
        Self {
            policy,
            days: Vec::new(),
            total_days: 0,
            total_scenes: 0,
            total_duration: 0,
            incomplete: false,
            unplaced: Vec::new(),
            messages: vec![message],
        }
    }

    /// 根据 days 重新计算汇总字段
    pub fn recompute_totals(&mut self) {
        self.total_days = self.days.len() as u32;
        self.total_scenes = self.days.iter().map(|d| d.scenes.len() as u32).sum();
        self.total_duration = self.days.iter().map(|d| d.total_duration).sum();
    }

    pub fn find_day(&self, day_number: u32) -> Option<&ShootingDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }
}

// ==========================================
// ScheduleRecord - 持久化排程（归属项目）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub schedule_id: String,
    pub project_id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub schedule: GeneratedSchedule,
    /// 生成时的配置快照（JSON）
    pub config_snapshot: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ==========================================
// SchedulePatch - 部分更新
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// 人工调整后的拍摄日（整体替换,汇总字段随之重算）
    #[serde(default)]
    pub days: Option<Vec<ShootingDay>>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.days.is_none()
    }
}
