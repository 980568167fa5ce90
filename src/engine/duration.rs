// ==========================================
// 影视拍摄排程系统 - 时长估算引擎
// ==========================================
// 职责: 内容时长 -> 实际拍摄时长
// 规则: 取文本中第一段数字;缺失/非法/<=0 取默认值
// ==========================================

use crate::config::DurationConfig;
use crate::domain::scene::NominalDuration;

/// 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationEstimate {
    /// 归一化后的内容时长（分钟）
    pub nominal_minutes: u32,
    /// 实际拍摄时长（分钟）
    pub actual_minutes: u32,
    /// 是否使用了默认值
    pub defaulted: bool,
}

// ==========================================
// DurationEstimator - 时长估算引擎
// ==========================================
pub struct DurationEstimator {
    ratio: u32,
    default_nominal_minutes: u32,
}

impl DurationEstimator {
    pub fn new(config: &DurationConfig) -> Self {
        Self {
            ratio: config.ratio,
            default_nominal_minutes: config.default_nominal_minutes,
        }
    }

    /// 解析内容时长
    ///
    /// # 返回
    /// - Some(minutes): 有效正整数
    /// - None: 缺失/无数字/<=0
    pub fn parse_nominal(raw: Option<&NominalDuration>) -> Option<u32> {
        match raw? {
            NominalDuration::Number(n) => {
                if !n.is_finite() {
                    return None;
                }
                let rounded = n.round();
                if rounded <= 0.0 || rounded > u32::MAX as f64 {
                    None
                } else {
                    Some(rounded as u32)
                }
            }
            NominalDuration::Text(text) => {
                let digits: String = text
                    .chars()
                    .skip_while(|c| !c.is_ascii_digit())
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                match digits.parse::<u32>() {
                    Ok(v) if v > 0 => Some(v),
                    _ => None,
                }
            }
        }
    }

    /// 内容时长（带默认值）
    pub fn nominal_or_default(&self, raw: Option<&NominalDuration>) -> u32 {
        Self::parse_nominal(raw).unwrap_or(self.default_nominal_minutes)
    }

    /// 估算实际拍摄时长
    pub fn estimate(&self, raw: Option<&NominalDuration>) -> DurationEstimate {
        let parsed = Self::parse_nominal(raw);
        let nominal_minutes = parsed.unwrap_or(self.default_nominal_minutes);
        DurationEstimate {
            nominal_minutes,
            actual_minutes: nominal_minutes.saturating_mul(self.ratio),
            defaulted: parsed.is_none(),
        }
    }
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new(&DurationConfig::default())
    }
}
