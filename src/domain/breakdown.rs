// ==========================================
// 影视拍摄排程系统 - 分解表领域模型
// ==========================================
// 职责: 单日分解表（地点/演员/时段/器材/人员/道具/服装/摄影机索引）
// 红线: 分解表只由拍摄日派生,不独立修改
// ==========================================

use crate::domain::types::{ClockTime, Department, TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 分解表中的场景引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRef {
    pub scene_id: String,
    pub scene_number: i32,
}

/// 演员出场（带角色）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub scene_id: String,
    pub scene_number: i32,
    pub role: String,
}

// ==========================================
// Breakdown - 单日分解表
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub day_number: u32,
    pub locations: BTreeMap<String, Vec<SceneRef>>,
    pub actors: BTreeMap<String, Vec<RoleRef>>,
    pub time_slots: BTreeMap<TimeSlot, Vec<SceneRef>>,
    pub equipment: BTreeMap<Department, BTreeMap<String, Vec<SceneRef>>>,
    pub crew: BTreeMap<Department, BTreeMap<String, Vec<RoleRef>>>,
    pub props: BTreeMap<String, Vec<SceneRef>>,
    pub costumes: BTreeMap<String, Vec<SceneRef>>,
    pub cameras: BTreeMap<String, Vec<SceneRef>>,
    pub meeting_points: Vec<MeetingPoint>,
    pub time_table: TimeTable,
}

// ==========================================
// MeetingPoint - 集合点
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPoint {
    /// 第几个地点组（从 1 开始）
    pub sequence: u32,
    pub location_group: String,
    pub locations: Vec<String>,
    pub time: ClockTime,
    pub scene_ids: Vec<String>,
    /// 该组场景时长 + 组内休息
    pub group_duration: u32,
}

// ==========================================
// TimeTable - 详细时间表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTable {
    pub entries: Vec<TimeTableEntry>,
    /// 在时段窗口内未能放下的场景（仅本表,不顺延）
    pub dropped: Vec<SceneRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTableEntry {
    pub time_slot: TimeSlot,
    pub time_of_day: TimeOfDay,
    pub scene_id: String,
    pub scene_number: i32,
    pub location: String,
    pub cast: Vec<String>,
    pub start: ClockTime,
    pub end: ClockTime,
    pub duration_minutes: u32,
}
