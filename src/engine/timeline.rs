// ==========================================
// 影视拍摄排程系统 - 时间线构建引擎
// ==========================================
// 职责: 将定稿拍摄日展开为有序活动块
// 顺序: 集合 -> (转场) -> [日戏: 早餐 -> 布景 -> 彩排 -> 拍摄/休息, 午餐插入]
//       -> [夜戏: 晚餐 -> 拍摄/休息] -> 收工
// 说明: 只依赖场景列表 + 开机时间,可随时重建
// ==========================================

use crate::config::{PackingConfig, TimelineConfig};
use crate::domain::day::{ScheduledScene, ShootingDay, TimelineBlock};
use crate::domain::types::{ActivityKind, ClockTime};

// ==========================================
// TimelineBuilder - 时间线构建引擎
// ==========================================
pub struct TimelineBuilder<'a> {
    config: &'a TimelineConfig,
    scene_break_minutes: u32,
}

/// 构建过程中的游标
struct Cursor {
    start: ClockTime,
    now: ClockTime,
    blocks: Vec<TimelineBlock>,
    lunch_taken: bool,
}

impl Cursor {
    fn push(&mut self, kind: ActivityKind, minutes: u32, label: impl Into<String>, scene_id: Option<String>) {
        let end = self.now.plus(minutes);
        self.blocks.push(TimelineBlock {
            kind,
            start: self.now,
            end,
            duration_minutes: minutes,
            scene_id,
            label: label.into(),
        });
        self.now = end;
    }

    fn elapsed(&self) -> u32 {
        self.now.minutes() - self.start.minutes()
    }
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a TimelineConfig, packing: &PackingConfig) -> Self {
        Self {
            config,
            scene_break_minutes: packing.scene_break_minutes,
        }
    }

    /// 为拍摄日构建时间线
    pub fn build_for_day(&self, day: &ShootingDay) -> Vec<TimelineBlock> {
        if day.rest_day {
            return Vec::new();
        }
        self.build(&day.scenes, day.time_range.start)
    }

    /// 由场景列表 + 开机时间构建时间线
    pub fn build(&self, scenes: &[ScheduledScene], start: ClockTime) -> Vec<TimelineBlock> {
        let day_scenes: Vec<&ScheduledScene> =
            scenes.iter().filter(|s| !s.time_slot.is_night()).collect();
        let night_scenes: Vec<&ScheduledScene> =
            scenes.iter().filter(|s| s.time_slot.is_night()).collect();

        let mut cursor = Cursor {
            start,
            now: start,
            blocks: Vec::new(),
            lunch_taken: false,
        };

        cursor.push(ActivityKind::Gather, 0, "集合", None);

        if let Some(first) = scenes.first() {
            if !same_location(&first.location_name, &self.config.meeting_location) {
                cursor.push(
                    ActivityKind::Travel,
                    self.config.travel_minutes,
                    format!("转场: {} -> {}", self.config.meeting_location, first.location_name),
                    None,
                );
            }
        }

        if !day_scenes.is_empty() {
            cursor.push(ActivityKind::Breakfast, self.config.breakfast_minutes, "早餐", None);
            cursor.push(ActivityKind::Setup, self.config.setup_minutes, "布景/灯光准备", None);
            cursor.push(ActivityKind::Rehearsal, self.config.rehearsal_minutes, "彩排", None);
            self.push_shooting(&mut cursor, &day_scenes, true);
        }

        if !night_scenes.is_empty() {
            cursor.push(ActivityKind::Dinner, self.config.dinner_minutes, "晚餐", None);
            self.push_shooting(&mut cursor, &night_scenes, false);
        }

        cursor.push(ActivityKind::Wrap, 0, "收工", None);
        cursor.blocks
    }

    /// 连续拍摄块;除最后一个外每块后接场间休息
    ///
    /// 日戏段落中累计时长达到 lunch_after_minutes 时插入一次午餐。
    fn push_shooting(&self, cursor: &mut Cursor, scenes: &[&ScheduledScene], allow_lunch: bool) {
        for (idx, scene) in scenes.iter().enumerate() {
            if allow_lunch && !cursor.lunch_taken && cursor.elapsed() >= self.config.lunch_after_minutes {
                cursor.push(ActivityKind::Lunch, self.config.lunch_minutes, "午餐", None);
                cursor.lunch_taken = true;
            }

            let label = match scene.scene.title.as_deref() {
                Some(title) if !title.trim().is_empty() => {
                    format!("S#{} {}", scene.scene.scene_number, title.trim())
                }
                _ => format!("S#{}", scene.scene.scene_number),
            };
            cursor.push(
                ActivityKind::Shooting,
                scene.actual_duration,
                label,
                Some(scene.scene.id.clone()),
            );

            if idx + 1 < scenes.len() {
                cursor.push(ActivityKind::Break, self.scene_break_minutes, "休息", None);
            }
        }
    }
}

fn same_location(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::Scene;
    use crate::domain::types::{TimeOfDay, TimeSlot};
    use std::collections::BTreeMap;

    fn scheduled(id: &str, number: i32, location: &str, tod: TimeOfDay, duration: u32) -> ScheduledScene {
        ScheduledScene {
            scene: Scene {
                id: id.to_string(),
                scene_number: number,
                title: None,
                description: None,
                location: None,
                time_of_day: None,
                cast: vec![],
                nominal_duration: None,
                equipment: BTreeMap::new(),
                crew: BTreeMap::new(),
                props: vec![],
                costumes: vec![],
                cameras: vec![],
            },
            location_name: location.to_string(),
            location_group: location.to_string(),
            time_of_day: tod,
            time_slot: tod.slot(),
            actual_duration: duration,
            total_weight: 0,
            start_time: ClockTime::default(),
            end_time: ClockTime::default(),
        }
    }

    fn kinds(blocks: &[TimelineBlock]) -> Vec<ActivityKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_day_and_night_sequence() {
        let config = TimelineConfig::default();
        let packing = PackingConfig::default();
        let builder = TimelineBuilder::new(&config, &packing);
        let scenes = vec![
            scheduled("d1", 1, "Studio A", TimeOfDay::Morning, 100),
            scheduled("d2", 2, "Studio A", TimeOfDay::Morning, 100),
            scheduled("n1", 3, "Studio A", TimeOfDay::Night, 100),
        ];
        let blocks = builder.build(&scenes, ClockTime::from_hm(6, 0));

        use ActivityKind::*;
        // 06:00 集合, 转场 60, 早餐 40, 布景 80, 彩排 30 => 已过 210
        // 拍摄 100 (310), 休息 30 (340) -> 达到 240 插入午餐
        assert_eq!(
            kinds(&blocks),
            vec![
                Gather, Travel, Breakfast, Setup, Rehearsal, Shooting, Break, Lunch, Shooting,
                Dinner, Shooting, Wrap
            ]
        );
        let lunch = blocks.iter().find(|b| b.kind == Lunch).unwrap();
        assert_eq!(lunch.start.to_string(), "11:40");
        assert_eq!(blocks.last().unwrap().end.to_string(), "17:00");
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_no_travel_at_meeting_location_and_night_only() {
        let config = TimelineConfig::default();
        let packing = PackingConfig::default();
        let builder = TimelineBuilder::new(&config, &packing);
        let scenes = vec![scheduled("n1", 1, "production office", TimeOfDay::Dawn, 60)];
        let blocks = builder.build(&scenes, ClockTime::from_hm(18, 0));

        use ActivityKind::*;
        assert_eq!(kinds(&blocks), vec![Gather, Dinner, Shooting, Wrap]);
        assert_eq!(blocks[2].scene_id.as_deref(), Some("n1"));
        assert_eq!(scenes[0].time_slot, TimeSlot::Night);
    }

    #[test]
    fn test_empty_scene_list() {
        let config = TimelineConfig::default();
        let packing = PackingConfig::default();
        let builder = TimelineBuilder::new(&config, &packing);
        let blocks = builder.build(&[], ClockTime::from_hm(9, 0));
        assert_eq!(kinds(&blocks), vec![ActivityKind::Gather, ActivityKind::Wrap]);
    }
}
