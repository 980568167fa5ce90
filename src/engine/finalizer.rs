// ==========================================
// 影视拍摄排程系统 - 拍摄日定稿引擎
// ==========================================
// 职责: 选择开机时间,为每个场景分配起止时间,生成当日汇总
// 红线: 日内场景不重叠,相邻场景至少间隔场间休息
// ==========================================

use crate::config::{CallTimeConfig, PackingConfig};
use crate::domain::day::{DaySummary, ScheduledScene, ShootingDay, TimeRange};
use crate::domain::types::ClockTime;
use crate::domain::weight::WeightedScene;

// ==========================================
// DayFinalizer - 拍摄日定稿引擎
// ==========================================
pub struct DayFinalizer<'a> {
    call_times: &'a CallTimeConfig,
    scene_break_minutes: u32,
}

impl<'a> DayFinalizer<'a> {
    pub fn new(call_times: &'a CallTimeConfig, packing: &PackingConfig) -> Self {
        Self {
            call_times,
            scene_break_minutes: packing.scene_break_minutes,
        }
    }

    /// 选择开机时间
    ///
    /// | 日戏 | 夜戏 | 开机 |
    /// |---|---|---|
    /// | 有 | 有,夜戏总时长更长 | 14:00 |
    /// | 有 | 有,日戏总时长 >= 夜戏 | 06:00 |
    /// | 有 | 无 | 06:00 |
    /// | 无 | 有 | 18:00 |
    /// | 无 | 无 | 09:00 |
    pub fn choose_start(&self, day_total: u32, night_total: u32, has_day: bool, has_night: bool) -> ClockTime {
        match (has_day, has_night) {
            (true, true) if night_total > day_total => self.call_times.mixed_night_heavy_start,
            (true, _) => self.call_times.day_start,
            (false, true) => self.call_times.night_start,
            (false, false) => self.call_times.default_start,
        }
    }

    /// 场景时长 + 场间休息
    pub fn total_duration(&self, durations: &[u32]) -> u32 {
        let work = durations.iter().fold(0u32, |acc, d| acc.saturating_add(*d));
        let breaks = (durations.len().saturating_sub(1) as u32).saturating_mul(self.scene_break_minutes);
        work.saturating_add(breaks)
    }

    /// 定稿拍摄日
    pub fn finalize(&self, day_number: u32, scenes: Vec<WeightedScene>, max_duration: u32) -> ShootingDay {
        let scenes = scenes.into_iter().map(unscheduled).collect();
        self.reflow(day_number, scenes, max_duration)
    }

    /// 按给定顺序重排拍摄日内的起止时间
    ///
    /// 日间桶（含未指定时段）在前,夜间桶在后,桶内保持输入顺序;
    /// 相邻场景之间插入场间休息,首个场景无休息。
    pub fn reflow(&self, day_number: u32, scenes: Vec<ScheduledScene>, max_duration: u32) -> ShootingDay {
        let durations: Vec<u32> = scenes.iter().map(|s| s.actual_duration).collect();
        let total_duration = self.total_duration(&durations);

        let (day_bucket, night_bucket): (Vec<ScheduledScene>, Vec<ScheduledScene>) =
            scenes.into_iter().partition(|s| !s.time_slot.is_night());

        let bucket_total = |bucket: &[ScheduledScene]| {
            bucket
                .iter()
                .fold(0u32, |acc, s| acc.saturating_add(s.actual_duration))
        };
        let start = self.choose_start(
            bucket_total(&day_bucket),
            bucket_total(&night_bucket),
            !day_bucket.is_empty(),
            !night_bucket.is_empty(),
        );

        let mut cursor = start;
        let mut scheduled = Vec::with_capacity(day_bucket.len() + night_bucket.len());
        for (idx, mut scene) in day_bucket.into_iter().chain(night_bucket).enumerate() {
            if idx > 0 {
                cursor = cursor.plus(self.scene_break_minutes);
            }
            scene.start_time = cursor;
            scene.end_time = cursor.plus(scene.actual_duration);
            cursor = scene.end_time;
            scheduled.push(scene);
        }

        let summary = summarize(&scheduled);
        ShootingDay {
            day_number,
            rest_day: false,
            scenes: scheduled,
            time_range: TimeRange {
                start,
                end: start.plus(total_duration),
            },
            total_duration,
            max_duration,
            timeline: Vec::new(),
            summary,
        }
    }
}

/// 尚未分配时间的已排场景
fn unscheduled(scene: WeightedScene) -> ScheduledScene {
    ScheduledScene {
        location_name: scene.location_name,
        location_group: scene.location_group,
        time_of_day: scene.time_of_day,
        time_slot: scene.time_slot,
        actual_duration: scene.actual_duration,
        total_weight: scene.weight.total_weight,
        start_time: ClockTime::default(),
        end_time: ClockTime::default(),
        scene: scene.scene,
    }
}

/// 汇总当日演员/地点/器材/人员（去重,保持出现顺序）
pub fn summarize(scenes: &[ScheduledScene]) -> DaySummary {
    let mut summary = DaySummary::default();

    fn push_unique(list: &mut Vec<String>, value: &str) {
        let value = value.trim();
        if !value.is_empty() && !list.iter().any(|v| v == value) {
            list.push(value.to_string());
        }
    }

    for s in scenes {
        push_unique(&mut summary.locations, &s.location_name);
        for actor in s.scene.actor_names() {
            push_unique(&mut summary.cast, actor);
        }
        for (dept, items) in &s.scene.equipment {
            let list = summary.equipment.entry(*dept).or_default();
            for item in items {
                push_unique(list, item);
            }
        }
        for (dept, members) in &s.scene.crew {
            let list = summary.crew.entry(*dept).or_default();
            for member in members {
                push_unique(list, &member.name);
            }
        }
    }

    summary.equipment.retain(|_, v| !v.is_empty());
    summary.crew.retain(|_, v| !v.is_empty());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::{CastMember, Scene};
    use crate::domain::types::TimeOfDay;
    use crate::domain::weight::SceneWeight;
    use std::collections::BTreeMap;

    fn weighted(id: &str, tod: TimeOfDay, duration: u32) -> WeightedScene {
        WeightedScene {
            scene: Scene {
                id: id.to_string(),
                scene_number: 1,
                title: None,
                description: None,
                location: None,
                time_of_day: None,
                cast: vec![CastMember {
                    role: "lead".into(),
                    name: "Kim".into(),
                }],
                nominal_duration: None,
                equipment: BTreeMap::new(),
                crew: BTreeMap::new(),
                props: vec![],
                costumes: vec![],
                cameras: vec![],
            },
            location_name: "Studio A".to_string(),
            location_group: "Studio A".to_string(),
            time_of_day: tod,
            time_slot: tod.slot(),
            actual_duration: duration,
            weight: SceneWeight::default(),
        }
    }

    fn finalizer_fixture() -> (CallTimeConfig, PackingConfig) {
        (CallTimeConfig::default(), PackingConfig::default())
    }

    #[test]
    fn test_start_time_rules() {
        let (calls, packing) = finalizer_fixture();
        let f = DayFinalizer::new(&calls, &packing);
        assert_eq!(f.choose_start(100, 200, true, true).to_string(), "14:00");
        assert_eq!(f.choose_start(200, 200, true, true).to_string(), "06:00");
        assert_eq!(f.choose_start(300, 200, true, true).to_string(), "06:00");
        assert_eq!(f.choose_start(100, 0, true, false).to_string(), "06:00");
        assert_eq!(f.choose_start(0, 100, false, true).to_string(), "18:00");
        assert_eq!(f.choose_start(0, 0, false, false).to_string(), "09:00");
    }

    #[test]
    fn test_sequential_times_with_breaks() {
        let (calls, packing) = finalizer_fixture();
        let f = DayFinalizer::new(&calls, &packing);
        let day = f.finalize(
            1,
            vec![
                weighted("n1", TimeOfDay::Night, 100),
                weighted("d1", TimeOfDay::Morning, 100),
                weighted("d2", TimeOfDay::Unspecified, 60),
            ],
            720,
        );

        let order: Vec<&str> = day.scenes.iter().map(|s| s.scene.id.as_str()).collect();
        assert_eq!(order, vec!["d1", "d2", "n1"]);
        assert_eq!(day.total_duration, 260 + 60);
        assert_eq!(day.time_range.start.to_string(), "06:00");
        assert_eq!(day.time_range.end.to_string(), "11:20");
        assert_eq!(day.scenes[0].start_time.to_string(), "06:00");
        assert_eq!(day.scenes[0].end_time.to_string(), "07:40");
        assert_eq!(day.scenes[1].start_time.to_string(), "08:10");
        assert_eq!(day.scenes[2].start_time.to_string(), "09:40");
        for pair in day.scenes.windows(2) {
            assert!(pair[0].end_time.plus(30) <= pair[1].start_time);
        }
        assert_eq!(day.summary.cast, vec!["Kim".to_string()]);
    }

    #[test]
    fn test_night_only_day_wraps_past_midnight() {
        let (calls, packing) = finalizer_fixture();
        let f = DayFinalizer::new(&calls, &packing);
        let day = f.finalize(
            2,
            vec![
                weighted("n1", TimeOfDay::Night, 200),
                weighted("n2", TimeOfDay::Dawn, 200),
            ],
            720,
        );
        assert_eq!(day.time_range.start.to_string(), "18:00");
        assert_eq!(day.time_range.end.to_string(), "01:10");
        assert!(day.scenes[1].start_time > day.scenes[0].end_time);
    }

    #[test]
    fn test_reflow_recomputes_stale_times() {
        let (calls, packing) = finalizer_fixture();
        let f = DayFinalizer::new(&calls, &packing);
        let day = f.finalize(
            1,
            vec![
                weighted("d1", TimeOfDay::Morning, 100),
                weighted("d2", TimeOfDay::Morning, 100),
            ],
            720,
        );

        // 人工调换顺序,保留旧的起止时间
        let mut scenes = day.scenes.clone();
        scenes.reverse();
        let reflowed = f.reflow(1, scenes, 720);

        let order: Vec<&str> = reflowed.scenes.iter().map(|s| s.scene.id.as_str()).collect();
        assert_eq!(order, vec!["d2", "d1"]);
        assert_eq!(reflowed.scenes[0].start_time.to_string(), "06:00");
        assert_eq!(reflowed.scenes[1].start_time.to_string(), "08:10");
        assert_eq!(reflowed.total_duration, 230);
    }

    #[test]
    fn test_total_duration_saturates() {
        let (calls, packing) = finalizer_fixture();
        let f = DayFinalizer::new(&calls, &packing);
        assert_eq!(f.total_duration(&[]), 0);
        assert_eq!(f.total_duration(&[100, 100]), 230);
        assert_eq!(f.total_duration(&[u32::MAX, 10]), u32::MAX);
    }
}
