// ==========================================
// 影视拍摄排程系统 - 时段内微排程
// ==========================================
// 职责: 在单一时段窗口内为场景分配钟点（详细时间表用）
// 规则: 时长降序贪心,每场占用 时长 + 场间休息
// 说明: 放不下的场景仅在本表记为 dropped,不回到待排队列
// ==========================================

use crate::config::SlotWindow;
use crate::domain::day::ScheduledScene;
use crate::domain::types::ClockTime;

/// 单场落位结果
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlacement<'s> {
    pub scene: &'s ScheduledScene,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// 单一时段的落位结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotPlan<'s> {
    pub placed: Vec<SlotPlacement<'s>>,
    pub dropped: Vec<&'s ScheduledScene>,
}

// ==========================================
// SlotOptimizer - 时段内微排程
// ==========================================
pub struct SlotOptimizer {
    scene_break_minutes: u32,
}

impl SlotOptimizer {
    pub fn new(scene_break_minutes: u32) -> Self {
        Self { scene_break_minutes }
    }

    /// 在窗口内落位
    ///
    /// - 0/1 个场景: 直接放在窗口起点,不计休息
    /// - 多个场景: 时长降序（同时长按场次号升序）,剩余预算不足的场景跳过
    pub fn place<'s>(&self, scenes: &[&'s ScheduledScene], window: SlotWindow) -> SlotPlan<'s> {
        let mut plan = SlotPlan::default();

        if scenes.len() <= 1 {
            if let Some(&scene) = scenes.first() {
                plan.placed.push(SlotPlacement {
                    scene,
                    start: window.start,
                    end: window.start.plus(scene.actual_duration),
                });
            }
            return plan;
        }

        let mut ordered: Vec<&'s ScheduledScene> = scenes.to_vec();
        ordered.sort_by(|a, b| {
            b.actual_duration
                .cmp(&a.actual_duration)
                .then_with(|| a.scene.scene_number.cmp(&b.scene.scene_number))
        });

        let mut remaining = window.available_minutes;
        let mut cursor = window.start;
        for scene in ordered {
            let cost = scene.actual_duration.saturating_add(self.scene_break_minutes);
            if cost > remaining {
                plan.dropped.push(scene);
                continue;
            }
            let end = cursor.plus(scene.actual_duration);
            plan.placed.push(SlotPlacement {
                scene,
                start: cursor,
                end,
            });
            cursor = cursor.plus(cost);
            remaining -= cost;
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::Scene;
    use crate::domain::types::TimeOfDay;
    use std::collections::BTreeMap;

    fn scheduled(id: &str, number: i32, duration: u32) -> ScheduledScene {
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
            location_name: "A".to_string(),
            location_group: "A".to_string(),
            time_of_day: TimeOfDay::Morning,
            time_slot: TimeOfDay::Morning.slot(),
            actual_duration: duration,
            total_weight: 0,
            start_time: ClockTime::default(),
            end_time: ClockTime::default(),
        }
    }

    fn window(hour: u32, minutes: u32) -> SlotWindow {
        SlotWindow {
            start: ClockTime::from_hm(hour, 0),
            available_minutes: minutes,
        }
    }

    #[test]
    fn test_single_scene_at_window_start() {
        let s = scheduled("a", 1, 900);
        let plan = SlotOptimizer::new(30).place(&[&s], window(18, 480));
        assert_eq!(plan.placed.len(), 1);
        assert!(plan.dropped.is_empty());
        assert_eq!(plan.placed[0].start.to_string(), "18:00");
        assert_eq!(plan.placed[0].end.to_string(), "09:00");
    }

    #[test]
    fn test_longest_first_with_breaks() {
        let a = scheduled("a", 1, 60);
        let b = scheduled("b", 2, 120);
        let c = scheduled("c", 3, 60);
        let plan = SlotOptimizer::new(30).place(&[&a, &b, &c], window(6, 720));

        let order: Vec<&str> = plan.placed.iter().map(|p| p.scene.scene.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(plan.placed[0].start.to_string(), "06:00");
        assert_eq!(plan.placed[1].start.to_string(), "08:30");
        assert_eq!(plan.placed[2].start.to_string(), "10:00");
    }

    #[test]
    fn test_misfits_reported_as_dropped() {
        let a = scheduled("a", 1, 300);
        let b = scheduled("b", 2, 200);
        let c = scheduled("c", 3, 100);
        // 330 + 230 > 480, 330 + 130 <= 480
        let plan = SlotOptimizer::new(30).place(&[&a, &b, &c], window(9, 480));

        let placed: Vec<&str> = plan.placed.iter().map(|p| p.scene.scene.id.as_str()).collect();
        assert_eq!(placed, vec!["a", "c"]);
        assert_eq!(plan.dropped.len(), 1);
        assert_eq!(plan.dropped[0].scene.id, "b");
    }

    #[test]
    fn test_empty_input() {
        let plan = SlotOptimizer::new(30).place(&[], window(9, 480));
        assert!(plan.placed.is_empty());
        assert!(plan.dropped.is_empty());
    }
}
