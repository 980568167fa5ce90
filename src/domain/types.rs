// ==========================================
// 影视拍摄排程系统 - 领域类型定义
// ==========================================
// 职责: 时段归一化、部门、排程策略、时钟时间等基础类型
// 红线: 时段同义词只在 TimeOfDay::normalize 中维护
// ==========================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ==========================================
// 时段 (Time Of Day)
// ==========================================
// 剧本中自由填写的时段文本,归一化为封闭枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,     // 早晨/上午
    Afternoon,   // 下午
    Night,       // 夜
    Dawn,        // 凌晨
    Unspecified, // 未指定
}

impl TimeOfDay {
    /// 归一化自由文本时段
    ///
    /// 支持英文、韩文及单字母代码 (D/N)。
    /// 无法识别或为空时返回 `Unspecified`。
    pub fn normalize(raw: Option<&str>) -> Self {
        let value = match raw {
            Some(v) => v.trim().to_lowercase(),
            None => return TimeOfDay::Unspecified,
        };
        if value.is_empty() {
            return TimeOfDay::Unspecified;
        }

        // 1) 精确匹配（含单字母代码）
        match value.as_str() {
            "d" | "day" | "daytime" | "am" | "m" | "morning" | "낮" | "주간" | "아침" | "오전" => {
                return TimeOfDay::Morning
            }
            "a" | "pm" | "afternoon" | "오후" => return TimeOfDay::Afternoon,
            "n" | "night" | "evening" | "nite" | "밤" | "야간" | "저녁" => {
                return TimeOfDay::Night
            }
            "dawn" | "sunrise" | "daybreak" | "새벽" | "여명" => return TimeOfDay::Dawn,
            _ => {}
        }

        // 2) 包含匹配（如 "late night" / "S#3 거실 - 밤"）
        // 顺序敏感: 凌晨 > 夜 > 下午 > 上午 > 泛日间
        const DAWN: &[&str] = &["dawn", "sunrise", "daybreak", "새벽", "여명"];
        const NIGHT: &[&str] = &["night", "evening", "dusk", "밤", "야간", "저녁"];
        const AFTERNOON: &[&str] = &["afternoon", "오후"];
        const MORNING: &[&str] = &["morning", "아침", "오전"];
        const DAY: &[&str] = &["day", "낮", "주간"];

        let contains_any = |keys: &[&str]| keys.iter().any(|k| value.contains(k));
        if contains_any(DAWN) {
            TimeOfDay::Dawn
        } else if contains_any(NIGHT) {
            TimeOfDay::Night
        } else if contains_any(AFTERNOON) {
            TimeOfDay::Afternoon
        } else if contains_any(MORNING) || contains_any(DAY) {
            TimeOfDay::Morning
        } else {
            TimeOfDay::Unspecified
        }
    }

    /// 所属时段桶
    pub fn slot(self) -> TimeSlot {
        match self {
            TimeOfDay::Morning | TimeOfDay::Afternoon => TimeSlot::Day,
            TimeOfDay::Night | TimeOfDay::Dawn => TimeSlot::Night,
            TimeOfDay::Unspecified => TimeSlot::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Night => "night",
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 时段桶 (Time Slot)
// ==========================================
// 排序顺序: Day < Night < Unspecified (用于组内分桶)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Day,
    Night,
    Unspecified,
}

impl TimeSlot {
    /// 组内分桶的固定顺序
    pub const ORDER: [TimeSlot; 3] = [TimeSlot::Day, TimeSlot::Night, TimeSlot::Unspecified];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Day => "day",
            TimeSlot::Night => "night",
            TimeSlot::Unspecified => "unspecified",
        }
    }

    /// 是否归入夜间桶（未指定归入日间）
    pub fn is_night(self) -> bool {
        self == TimeSlot::Night
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 部门 (Department)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Direction,      // 导演组
    Production,     // 制片组
    Cinematography, // 摄影组
    Lighting,       // 灯光组
    Sound,          // 录音组
    Art,            // 美术组
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Direction => "direction",
            Department::Production => "production",
            Department::Cinematography => "cinematography",
            Department::Lighting => "lighting",
            Department::Sound => "sound",
            Department::Art => "art",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 装箱策略 (Packing Policy)
// ==========================================
// Fixed: 固定 8 小时日上限,无周上限/休息日
// Dynamic: 日上限 12 小时,受 52 小时周预算约束,每 7 天一个休息日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingPolicy {
    Fixed,
    Dynamic,
}

impl Default for PackingPolicy {
    fn default() -> Self {
        PackingPolicy::Dynamic
    }
}

impl PackingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackingPolicy::Fixed => "fixed",
            PackingPolicy::Dynamic => "dynamic",
        }
    }
}

impl std::str::FromStr for PackingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(PackingPolicy::Fixed),
            "dynamic" => Ok(PackingPolicy::Dynamic),
            other => Err(format!("未知装箱策略: {}", other)),
        }
    }
}

// ==========================================
// 时间线活动类型 (Activity Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Gather,
    Travel,
    Breakfast,
    Setup,
    Rehearsal,
    Shooting,
    Break,
    Lunch,
    Dinner,
    Wrap,
}

// ==========================================
// 提示代码 (Message Code)
// ==========================================
// 所有字段修正均为非致命提示,不抛错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCode {
    EmptyInput,
    DurationDefaulted,
    LocationDefaulted,
    TimeOfDayDefaulted,
    CastMissing,
    SceneDeferred,
    IncompleteSchedule,
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageCode::EmptyInput => "EMPTY_INPUT",
            MessageCode::DurationDefaulted => "DURATION_DEFAULTED",
            MessageCode::LocationDefaulted => "LOCATION_DEFAULTED",
            MessageCode::TimeOfDayDefaulted => "TIME_OF_DAY_DEFAULTED",
            MessageCode::CastMissing => "CAST_MISSING",
            MessageCode::SceneDeferred => "SCENE_DEFERRED",
            MessageCode::IncompleteSchedule => "INCOMPLETE_SCHEDULE",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 时钟时间 (Clock Time)
// ==========================================
// 以拍摄日零点起的分钟数存储,允许超过 24:00;
// 显示按 24 小时取模为 "HH:MM";序列化对跨日时间追加 "+N" 天数后缀,保证存取无损
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(pub u32);

impl ClockTime {
    pub const MINUTES_PER_DAY: u32 = 24 * 60;

    pub fn from_hm(hour: u32, minute: u32) -> Self {
        ClockTime(hour.saturating_mul(60).saturating_add(minute))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn plus(self, minutes: u32) -> Self {
        ClockTime(self.0.saturating_add(minutes))
    }

    /// 解析 "HH:MM" 或 "HH:MM+N"
    pub fn parse(s: &str) -> Option<Self> {
        let (clock, days) = match s.trim().split_once('+') {
            Some((clock, days)) => (clock, days.trim().parse::<u32>().ok()?),
            None => (s.trim(), 0),
        };
        let (h, m) = clock.split_once(':')?;
        let hour: u32 = h.trim().parse().ok()?;
        let minute: u32 = m.trim().parse().ok()?;
        if minute >= 60 {
            return None;
        }
        let minutes = hour
            .checked_mul(60)?
            .checked_add(minute)?
            .checked_add(days.checked_mul(Self::MINUTES_PER_DAY)?)?;
        Some(ClockTime(minutes))
    }

    /// 序列化形式: 当日 "HH:MM",跨日 "HH:MM+N"
    pub fn to_serialized(self) -> String {
        let days = self.0 / Self::MINUTES_PER_DAY;
        if days == 0 {
            self.to_string()
        } else {
            format!("{}+{}", self, days)
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrapped = self.0 % Self::MINUTES_PER_DAY;
        write!(f, "{:02}:{:02}", wrapped / 60, wrapped % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_serialized())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("无效时钟时间: {}", raw)))
    }
}
