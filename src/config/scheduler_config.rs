// ==========================================
// 影视拍摄排程系统 - 排程参数
// ==========================================
// 职责: 排程引擎全部可调参数及默认值
// 说明: 由 ConfigManager 从 config_kv 覆写,缺省取 Default
// ==========================================

use crate::domain::types::{ClockTime, PackingPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置校验错误
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("配置值非法 (key={key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置解析失败 (key={key}): {message}")]
    ParseError { key: String, message: String },

    #[error("配置存储失败: {0}")]
    StorageError(String),
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

// ==========================================
// SchedulerConfig - 排程总配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchedulerConfig {
    pub duration: DurationConfig,
    pub packing: PackingConfig,
    pub call_times: CallTimeConfig,
    pub timeline: TimelineConfig,
    pub slot_windows: SlotWindowConfig,
}

impl SchedulerConfig {
    /// 固定 8 小时策略的便捷构造
    pub fn fixed() -> Self {
        let mut cfg = Self::default();
        cfg.packing.policy = PackingPolicy::Fixed;
        cfg
    }

    /// 校验参数范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.ratio == 0 {
            return Err(invalid("duration_ratio", "必须大于 0"));
        }
        if self.duration.default_nominal_minutes == 0 {
            return Err(invalid("default_nominal_minutes", "必须大于 0"));
        }
        let p = &self.packing;
        if p.fixed_daily_minutes == 0 {
            return Err(invalid("fixed_daily_minutes", "必须大于 0"));
        }
        if p.dynamic_daily_max_minutes == 0 {
            return Err(invalid("dynamic_daily_max_minutes", "必须大于 0"));
        }
        if p.weekly_cap_minutes < p.dynamic_daily_max_minutes {
            return Err(invalid(
                "weekly_cap_minutes",
                format!(
                    "周上限 {} 小于动态日上限 {}",
                    p.weekly_cap_minutes, p.dynamic_daily_max_minutes
                ),
            ));
        }
        if p.max_scenes_per_day == 0 {
            return Err(invalid("max_scenes_per_day", "必须大于 0"));
        }
        if p.rest_day_every == 1 {
            return Err(invalid("rest_day_every", "不能每天都是休息日"));
        }
        if p.location_continuity_limit == 0 {
            return Err(invalid("location_continuity_limit", "必须大于 0"));
        }
        Ok(())
    }
}

// ==========================================
// DurationConfig - 时长估算
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    /// 内容时长 -> 拍摄时长 倍率
    pub ratio: u32,
    /// 内容时长缺失/非法时的默认值（分钟）
    pub default_nominal_minutes: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            ratio: 20,
            default_nominal_minutes: 5,
        }
    }
}

// ==========================================
// PackingConfig - 日装箱约束
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    pub policy: PackingPolicy,
    /// 固定策略日上限（分钟）
    pub fixed_daily_minutes: u32,
    /// 动态策略日上限（分钟）
    pub dynamic_daily_max_minutes: u32,
    /// 动态策略周上限（分钟）
    pub weekly_cap_minutes: u32,
    /// 场间休息（分钟）
    pub scene_break_minutes: u32,
    pub max_scenes_per_day: usize,
    /// 每 N 天一个休息日（0 表示不设休息日,仅动态策略生效）
    pub rest_day_every: u32,
    /// 同一地点连续场景数达到该值后,换地点即换日
    pub location_continuity_limit: usize,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            policy: PackingPolicy::Dynamic,
            fixed_daily_minutes: 480,
            dynamic_daily_max_minutes: 720,
            weekly_cap_minutes: 52 * 60,
            scene_break_minutes: 30,
            max_scenes_per_day: 6,
            rest_day_every: 7,
            location_continuity_limit: 3,
        }
    }
}

// ==========================================
// CallTimeConfig - 开机时间
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallTimeConfig {
    /// 仅日戏 / 日戏为主
    pub day_start: ClockTime,
    /// 日夜混合且夜戏为主
    pub mixed_night_heavy_start: ClockTime,
    /// 仅夜戏
    pub night_start: ClockTime,
    /// 无场景
    pub default_start: ClockTime,
}

impl Default for CallTimeConfig {
    fn default() -> Self {
        Self {
            day_start: ClockTime::from_hm(6, 0),
            mixed_night_heavy_start: ClockTime::from_hm(14, 0),
            night_start: ClockTime::from_hm(18, 0),
            default_start: ClockTime::from_hm(9, 0),
        }
    }
}

// ==========================================
// TimelineConfig - 时间线活动时长
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// 全剧组集合地点
    pub meeting_location: String,
    pub travel_minutes: u32,
    pub breakfast_minutes: u32,
    pub setup_minutes: u32,
    pub rehearsal_minutes: u32,
    pub lunch_minutes: u32,
    /// 开工后多少分钟插入午餐
    pub lunch_after_minutes: u32,
    pub dinner_minutes: u32,
    /// 地点组之间的转场缓冲
    pub move_buffer_minutes: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            meeting_location: "Production Office".to_string(),
            travel_minutes: 60,
            breakfast_minutes: 40,
            setup_minutes: 80,
            rehearsal_minutes: 30,
            lunch_minutes: 60,
            lunch_after_minutes: 240,
            dinner_minutes: 60,
            move_buffer_minutes: 30,
        }
    }
}

// ==========================================
// SlotWindowConfig - 时段窗口（详细时间表用）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotWindowConfig {
    pub day: SlotWindow,
    pub night: SlotWindow,
    pub unspecified: SlotWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub start: ClockTime,
    pub available_minutes: u32,
}

impl Default for SlotWindowConfig {
    fn default() -> Self {
        Self {
            day: SlotWindow {
                start: ClockTime::from_hm(6, 0),
                available_minutes: 720,
            },
            night: SlotWindow {
                start: ClockTime::from_hm(18, 0),
                available_minutes: 480,
            },
            unspecified: SlotWindow {
                start: ClockTime::from_hm(9, 0),
                available_minutes: 480,
            },
        }
    }
}
