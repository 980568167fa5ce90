// ==========================================
// 影视拍摄排程系统 - 场景领域模型
// ==========================================
// 职责: 外部场景库输入结构 (camelCase JSON)
// 红线: 输入字段缺失/非法时只做默认值修正,不报错
// ==========================================

use crate::domain::types::{Department, TimeOfDay, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 未指定地点/地点组时使用的键
pub const UNSPECIFIED_LOCATION: &str = "unspecified";

// ==========================================
// Scene - 场景
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,

    /// 剧本顺序号
    #[serde(default)]
    pub scene_number: i32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub location: Option<Location>,

    /// 自由文本时段,经 TimeOfDay::normalize 归一化
    #[serde(default)]
    pub time_of_day: Option<String>,

    #[serde(default)]
    pub cast: Vec<CastMember>,

    /// 内容时长（分钟）,可能是数字或文本
    #[serde(default)]
    pub nominal_duration: Option<NominalDuration>,

    /// 部门 -> 器材列表
    #[serde(default)]
    pub equipment: BTreeMap<Department, Vec<String>>,

    /// 部门 -> 人员列表
    #[serde(default)]
    pub crew: BTreeMap<Department, Vec<CrewMember>>,

    #[serde(default)]
    pub props: Vec<String>,

    #[serde(default)]
    pub costumes: Vec<String>,

    #[serde(default)]
    pub cameras: Vec<CameraSetup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub name: String,

    /// 地点组（同一片场的多个拍摄点）
    #[serde(default)]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSetup {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub lens: String,
}

impl CameraSetup {
    /// 分解表键: "model - lens"
    pub fn key(&self) -> String {
        format!("{} - {}", self.model.trim(), self.lens.trim())
    }
}

/// 内容时长原始值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NominalDuration {
    Number(f64),
    Text(String),
}

impl Scene {
    /// 地点名（缺失/空白时为 "unspecified"）
    pub fn location_name(&self) -> &str {
        self.location
            .as_ref()
            .map(|l| l.name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNSPECIFIED_LOCATION)
    }

    /// 地点组名（缺失时回落到地点名）
    pub fn location_group(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.group_name.as_deref())
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| self.location_name())
    }

    pub fn normalized_time_of_day(&self) -> TimeOfDay {
        TimeOfDay::normalize(self.time_of_day.as_deref())
    }

    pub fn time_slot(&self) -> TimeSlot {
        self.normalized_time_of_day().slot()
    }

    /// 去重后的演员名（保持出场顺序,忽略空名）
    pub fn actor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.cast.len());
        for member in &self.cast {
            let name = member.name.trim();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// 器材签名: 部门:器材 排序去重后拼接
    ///
    /// 相同签名的场景视为"无需换装",参与器材权重计数。
    pub fn equipment_signature(&self) -> String {
        let mut items: Vec<String> = self
            .equipment
            .iter()
            .flat_map(|(dept, list)| {
                list.iter()
                    .map(|i| i.trim())
                    .filter(|i| !i.is_empty())
                    .map(move |i| format!("{}:{}", dept, i))
            })
            .collect();
        items.sort();
        items.dedup();
        items.join("|")
    }
}
