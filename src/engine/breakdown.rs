// ==========================================
// 影视拍摄排程系统 - 分解表生成引擎
// ==========================================
// 职责: 由单个拍摄日派生分解表
// 输出: 各类索引 + 集合点 + 详细时间表
// 红线: 只读拍摄日,不修改
// ==========================================

use crate::config::{CallTimeConfig, SchedulerConfig, SlotWindow, SlotWindowConfig, TimelineConfig};
use crate::domain::breakdown::{
    Breakdown, MeetingPoint, RoleRef, SceneRef, TimeTable, TimeTableEntry,
};
use crate::domain::day::{ScheduledScene, ShootingDay};
use crate::domain::types::TimeSlot;
use crate::engine::slot_optimizer::SlotOptimizer;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// BreakdownGenerator - 分解表生成引擎
// ==========================================
pub struct BreakdownGenerator<'a> {
    timeline: &'a TimelineConfig,
    call_times: &'a CallTimeConfig,
    windows: &'a SlotWindowConfig,
    scene_break_minutes: u32,
}

impl<'a> BreakdownGenerator<'a> {
    pub fn new(config: &'a SchedulerConfig) -> Self {
        Self {
            timeline: &config.timeline,
            call_times: &config.call_times,
            windows: &config.slot_windows,
            scene_break_minutes: config.packing.scene_break_minutes,
        }
    }

    /// 生成单日分解表
    pub fn generate(&self, day: &ShootingDay) -> Breakdown {
        let mut breakdown = Breakdown {
            day_number: day.day_number,
            ..Breakdown::default()
        };

        for s in &day.scenes {
            let scene = &s.scene;

            push_scene(&mut breakdown.locations, &s.location_name, s);
            breakdown
                .time_slots
                .entry(s.time_slot)
                .or_default()
                .push(scene_ref(s));

            for member in &scene.cast {
                push_role(&mut breakdown.actors, &member.name, s, &member.role);
            }

            for (dept, items) in &scene.equipment {
                let index = breakdown.equipment.entry(*dept).or_default();
                for item in items {
                    push_scene(index, item, s);
                }
            }

            for (dept, members) in &scene.crew {
                let index = breakdown.crew.entry(*dept).or_default();
                for member in members {
                    push_role(index, &member.name, s, &member.role);
                }
            }

            for prop in &scene.props {
                push_scene(&mut breakdown.props, prop, s);
            }
            for costume in &scene.costumes {
                push_scene(&mut breakdown.costumes, costume, s);
            }
            for camera in &scene.cameras {
                push_scene(&mut breakdown.cameras, &camera.key(), s);
            }
        }

        breakdown.equipment.retain(|_, v| !v.is_empty());
        breakdown.crew.retain(|_, v| !v.is_empty());

        breakdown.meeting_points = self.meeting_points(day);
        breakdown.time_table = self.time_table(day);

        debug!(
            day_number = day.day_number,
            locations = breakdown.locations.len(),
            actors = breakdown.actors.len(),
            meeting_points = breakdown.meeting_points.len(),
            dropped = breakdown.time_table.dropped.len(),
            "分解表生成完成"
        );

        breakdown
    }

    /// 集合点（每个地点组一个,按首次出现顺序）
    ///
    /// - 第 1 组: 开机时间
    /// - 第 2 组: 开机 + max(午餐前时长, 第 1 组时长) + 午餐
    /// - 第 3 组: 有夜戏时不早于夜戏开机时间
    /// - 其后: 上一组集合 + 上一组时长 + 转场缓冲
    pub fn meeting_points(&self, day: &ShootingDay) -> Vec<MeetingPoint> {
        let mut groups: Vec<(String, Vec<&ScheduledScene>)> = Vec::new();
        for s in &day.scenes {
            match groups.iter_mut().find(|(g, _)| g == &s.location_group) {
                Some((_, members)) => members.push(s),
                None => groups.push((s.location_group.clone(), vec![s])),
            }
        }

        let has_night = day.night_scenes().next().is_some();
        let start = day.time_range.start;

        let mut points: Vec<MeetingPoint> = Vec::with_capacity(groups.len());
        for (idx, (group, members)) in groups.into_iter().enumerate() {
            let time = match points.last() {
                None => start,
                Some(prev) if idx == 1 => start.plus(
                    prev.group_duration.max(self.timeline.lunch_after_minutes)
                        + self.timeline.lunch_minutes,
                ),
                Some(prev) => {
                    let after_move = prev
                        .time
                        .plus(prev.group_duration + self.timeline.move_buffer_minutes);
                    if idx == 2 && has_night {
                        after_move.max(self.call_times.night_start)
                    } else {
                        after_move
                    }
                }
            };

            let mut locations: Vec<String> = Vec::new();
            for m in &members {
                if !locations.contains(&m.location_name) {
                    locations.push(m.location_name.clone());
                }
            }

            points.push(MeetingPoint {
                sequence: idx as u32 + 1,
                location_group: group,
                locations,
                time,
                scene_ids: members.iter().map(|m| m.scene.id.clone()).collect(),
                group_duration: self.group_duration(&members),
            });
        }
        points
    }

    /// 详细时间表: 每个出现的时段在各自窗口内做一次微排程
    pub fn time_table(&self, day: &ShootingDay) -> TimeTable {
        let optimizer = SlotOptimizer::new(self.scene_break_minutes);
        let mut table = TimeTable::default();

        for slot in TimeSlot::ORDER {
            let subset: Vec<&ScheduledScene> =
                day.scenes.iter().filter(|s| s.time_slot == slot).collect();
            if subset.is_empty() {
                continue;
            }

            let plan = optimizer.place(&subset, self.window_for(slot));
            for placed in plan.placed {
                let s = placed.scene;
                table.entries.push(TimeTableEntry {
                    time_slot: slot,
                    time_of_day: s.time_of_day,
                    scene_id: s.scene.id.clone(),
                    scene_number: s.scene.scene_number,
                    location: s.location_name.clone(),
                    cast: s.scene.actor_names().into_iter().map(String::from).collect(),
                    start: placed.start,
                    end: placed.end,
                    duration_minutes: s.actual_duration,
                });
            }
            table.dropped.extend(plan.dropped.into_iter().map(scene_ref));
        }
        table
    }

    fn window_for(&self, slot: TimeSlot) -> SlotWindow {
        match slot {
            TimeSlot::Day => self.windows.day,
            TimeSlot::Night => self.windows.night,
            TimeSlot::Unspecified => self.windows.unspecified,
        }
    }

    fn group_duration(&self, members: &[&ScheduledScene]) -> u32 {
        let work = members
            .iter()
            .fold(0u32, |acc, m| acc.saturating_add(m.actual_duration));
        work.saturating_add((members.len().saturating_sub(1) as u32).saturating_mul(self.scene_break_minutes))
    }
}

fn scene_ref(s: &ScheduledScene) -> SceneRef {
    SceneRef {
        scene_id: s.scene.id.clone(),
        scene_number: s.scene.scene_number,
    }
}

/// 同一场景在同一键下只记录一次;空键忽略
fn push_scene(index: &mut BTreeMap<String, Vec<SceneRef>>, key: &str, s: &ScheduledScene) {
    let key = key.trim();
    if key.is_empty() {
        return;
    }
    let refs = index.entry(key.to_string()).or_default();
    if !refs.iter().any(|r| r.scene_id == s.scene.id) {
        refs.push(scene_ref(s));
    }
}

fn push_role(index: &mut BTreeMap<String, Vec<RoleRef>>, key: &str, s: &ScheduledScene, role: &str) {
    let key = key.trim();
    if key.is_empty() {
        return;
    }
    let refs = index.entry(key.to_string()).or_default();
    if !refs.iter().any(|r| r.scene_id == s.scene.id && r.role == role) {
        refs.push(RoleRef {
            scene_id: s.scene.id.clone(),
            scene_number: s.scene.scene_number,
            role: role.to_string(),
        });
    }
}
