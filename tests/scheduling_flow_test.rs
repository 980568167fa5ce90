// ==========================================
// 完整排程流程端到端测试
// ==========================================
// 职责: 验证从场景输入到拍摄日输出的完整引擎链
// ==========================================

mod test_helpers;

use shoot_schedule::config::{DurationConfig, SchedulerConfig};
use shoot_schedule::domain::schedule::GeneratedSchedule;
use shoot_schedule::domain::scene::Scene;
use shoot_schedule::domain::types::{ActivityKind, MessageCode, PackingPolicy, TimeOfDay, TimeSlot};
use shoot_schedule::engine::{
    DurationEstimator, LocationSlotSorter, ScheduleOrchestrator, WeightCalculator,
};
use std::collections::HashSet;
use test_helpers::{mixed_scenes, SceneBuilder};

// ==========================================
// 测试辅助函数
// ==========================================

fn generate(config: SchedulerConfig, scenes: &[Scene]) -> GeneratedSchedule {
    ScheduleOrchestrator::new(config).generate(scenes)
}

/// 已排 + 未排 == 输入,且每个场景只出现一次
fn assert_complete(schedule: &GeneratedSchedule, scenes: &[Scene]) {
    let mut seen = HashSet::new();
    for day in &schedule.days {
        for s in &day.scenes {
            assert!(seen.insert(s.scene.id.clone()), "场景重复: {}", s.scene.id);
        }
    }
    for u in &schedule.unplaced {
        assert!(seen.insert(u.scene_id.clone()), "场景重复: {}", u.scene_id);
    }
    let expected: HashSet<String> = scenes.iter().map(|s| s.id.clone()).collect();
    assert_eq!(seen, expected);
    assert_eq!(schedule.incomplete, !schedule.unplaced.is_empty());
}

fn assert_contiguous_and_ordered(schedule: &GeneratedSchedule, scene_break: u32) {
    for (idx, day) in schedule.days.iter().enumerate() {
        assert_eq!(day.day_number, idx as u32 + 1);
        assert!(day.total_duration <= day.max_duration || day.rest_day);

        for pair in day.scenes.windows(2) {
            assert!(pair[0].end_time.plus(scene_break) <= pair[1].start_time);
        }

        // 夜戏在日戏之后
        let first_night = day.scenes.iter().position(|s| s.time_slot == TimeSlot::Night);
        if let Some(pos) = first_night {
            assert!(day.scenes[pos..].iter().all(|s| s.time_slot == TimeSlot::Night));
        }
    }
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_studio_a_four_scenes_single_day() {
    let scenes: Vec<Scene> = (1..=4)
        .map(|i| {
            SceneBuilder::new(&format!("s{}", i), i)
                .location("Studio A")
                .time_of_day("DAY")
                .duration_text("5분")
                .actor("Kim", "Detective")
                .build()
        })
        .collect();

    let schedule = generate(SchedulerConfig::default(), &scenes);

    assert_eq!(schedule.policy, PackingPolicy::Dynamic);
    assert_eq!(schedule.total_days, 1);
    assert_eq!(schedule.total_scenes, 4);
    let day = &schedule.days[0];
    assert_eq!(day.time_range.start.to_string(), "06:00");
    assert_eq!(day.total_duration, 4 * 100 + 3 * 30);
    assert_eq!(day.scenes[0].start_time.to_string(), "06:00");
    assert_complete(&schedule, &scenes);

    // 时间线: 集合 -> 转场 -> 早餐 ... -> 收工
    assert_eq!(day.timeline.first().map(|b| b.kind), Some(ActivityKind::Gather));
    assert_eq!(day.timeline.get(1).map(|b| b.kind), Some(ActivityKind::Travel));
    assert_eq!(day.timeline.last().map(|b| b.kind), Some(ActivityKind::Wrap));
    let shooting = day
        .timeline
        .iter()
        .filter(|b| b.kind == ActivityKind::Shooting)
        .count();
    assert_eq!(shooting, 4);
    assert_eq!(
        day.timeline
            .iter()
            .filter(|b| b.kind == ActivityKind::Lunch)
            .count(),
        1
    );
}

#[test]
fn test_balanced_day_and_night_starts_morning() {
    let scenes: Vec<Scene> = [("d1", "DAY"), ("n1", "NIGHT"), ("d2", "DAY"), ("n2", "NIGHT")]
        .iter()
        .zip(1..)
        .map(|((id, tod), number)| {
            SceneBuilder::new(id, number)
                .location("Studio A")
                .time_of_day(tod)
                .duration_text("5분")
                .build()
        })
        .collect();

    let schedule = generate(SchedulerConfig::default(), &scenes);

    // 日戏与夜戏总时长相等时按早班开工
    assert_eq!(schedule.total_days, 1);
    let day = &schedule.days[0];
    assert_eq!(day.time_range.start.to_string(), "06:00");
    let slots: Vec<TimeSlot> = day.scenes.iter().map(|s| s.time_slot).collect();
    assert_eq!(
        slots,
        vec![TimeSlot::Day, TimeSlot::Day, TimeSlot::Night, TimeSlot::Night]
    );
    assert_complete(&schedule, &scenes);
}

#[test]
fn test_missing_location_and_time_of_day() {
    let scenes = vec![
        SceneBuilder::new("bare", 3).minutes(5.0).build(),
        SceneBuilder::new("night", 2).location("unspecified").time_of_day("N").minutes(5.0).build(),
        SceneBuilder::new("day", 1).location("unspecified").time_of_day("D").minutes(5.0).build(),
    ];

    // 排序: 同一地点组内 day -> night -> unspecified
    let estimator = DurationEstimator::new(&DurationConfig::default());
    let weighted = WeightCalculator::new(&estimator).weigh_all(&scenes);
    let sorted = LocationSlotSorter::new().sort(weighted);
    let order: Vec<&str> = sorted.iter().map(|s| s.scene_id()).collect();
    assert_eq!(order, vec!["day", "night", "bare"]);

    let schedule = generate(SchedulerConfig::default(), &scenes);
    assert_complete(&schedule, &scenes);

    let bare = schedule
        .days
        .iter()
        .flat_map(|d| d.scenes.iter())
        .find(|s| s.scene.id == "bare")
        .unwrap();
    assert_eq!(bare.location_name, "unspecified");
    assert_eq!(bare.time_of_day, TimeOfDay::Unspecified);
    assert_eq!(bare.time_slot, TimeSlot::Unspecified);

    let codes: Vec<(MessageCode, Option<String>)> = schedule
        .messages
        .iter()
        .map(|m| (m.code, m.scene_id.clone()))
        .collect();
    assert!(codes.contains(&(MessageCode::LocationDefaulted, Some("bare".to_string()))));
    assert!(codes.contains(&(MessageCode::TimeOfDayDefaulted, Some("bare".to_string()))));
    assert!(codes.contains(&(MessageCode::CastMissing, Some("bare".to_string()))));
}

#[test]
fn test_mixed_scenes_invariants_dynamic() {
    let scenes = mixed_scenes(60);
    let config = SchedulerConfig::default();
    let schedule = generate(config.clone(), &scenes);

    assert_complete(&schedule, &scenes);
    assert_contiguous_and_ordered(&schedule, config.packing.scene_break_minutes);
    assert!(!schedule.incomplete);

    // 每 7 天一周,周累计不超过周预算
    for week in schedule.days.chunks(7) {
        let total: u32 = week.iter().map(|d| d.total_duration).sum();
        assert!(total <= config.packing.weekly_cap_minutes);
    }

    // 第 7 天是休息日
    if schedule.days.len() >= 7 {
        assert!(schedule.days[6].rest_day);
        assert!(schedule.days[6].scenes.is_empty());
        assert!(schedule.days[6].timeline.is_empty());
    }

    for day in schedule.days.iter().filter(|d| !d.rest_day) {
        assert!(day.scenes.len() <= config.packing.max_scenes_per_day);
        assert!(day.total_duration <= config.packing.dynamic_daily_max_minutes);
    }
}

#[test]
fn test_mixed_scenes_invariants_fixed() {
    let scenes = mixed_scenes(40);
    let config = SchedulerConfig::fixed();
    let schedule = generate(config.clone(), &scenes);

    assert_eq!(schedule.policy, PackingPolicy::Fixed);
    assert_complete(&schedule, &scenes);
    assert_contiguous_and_ordered(&schedule, config.packing.scene_break_minutes);
    assert!(schedule.days.iter().all(|d| !d.rest_day));
    assert!(schedule.days.iter().all(|d| d.total_duration <= 480));
}

#[test]
fn test_generation_is_deterministic() {
    let scenes = mixed_scenes(30);
    let first = generate(SchedulerConfig::default(), &scenes);
    let second = generate(SchedulerConfig::default(), &scenes);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_oversize_scene_is_reported_not_dropped() {
    let scenes = vec![
        SceneBuilder::new("epic", 1).location("Desert").time_of_day("day").minutes(60.0).build(),
        SceneBuilder::new("short", 2).location("Desert").time_of_day("day").minutes(3.0).build(),
    ];
    let schedule = generate(SchedulerConfig::default(), &scenes);

    assert_complete(&schedule, &scenes);
    assert!(schedule.incomplete);
    assert_eq!(schedule.unplaced.len(), 1);
    assert_eq!(schedule.unplaced[0].scene_id, "epic");
    assert_eq!(schedule.unplaced[0].actual_duration, 1200);
    assert!(schedule
        .messages
        .iter()
        .any(|m| m.code == MessageCode::IncompleteSchedule));
}

#[test]
fn test_empty_input_returns_empty_schedule() {
    let schedule = generate(SchedulerConfig::default(), &[]);
    assert!(schedule.days.is_empty());
    assert_eq!(schedule.messages.len(), 1);
    assert_eq!(schedule.messages[0].code, MessageCode::EmptyInput);
}

#[test]
fn test_night_heavy_day_starts_afternoon() {
    let scenes = vec![
        SceneBuilder::new("d", 1).location("Bar").time_of_day("day").minutes(3.0).build(),
        SceneBuilder::new("n", 2).location("Bar").time_of_day("밤").minutes(6.0).build(),
    ];
    let schedule = generate(SchedulerConfig::default(), &scenes);

    assert_eq!(schedule.total_days, 1);
    let day = &schedule.days[0];
    assert_eq!(day.time_range.start.to_string(), "14:00");
    let ids: Vec<&str> = day.scenes.iter().map(|s| s.scene.id.as_str()).collect();
    assert_eq!(ids, vec!["d", "n"]);
    assert!(day.timeline.iter().any(|b| b.kind == ActivityKind::Dinner));
}

#[test]
fn test_breakdown_from_generated_day() {
    use shoot_schedule::domain::types::Department;

    let scenes = vec![
        SceneBuilder::new("a", 1)
            .location_in_group("Hospital Lobby", "Hospital")
            .time_of_day("morning")
            .minutes(4.0)
            .actor("Kim", "Doctor")
            .equipment(Department::Sound, "Boom")
            .crew(Department::Sound, "Choi", "Mixer")
            .prop("stethoscope")
            .costume("white coat")
            .camera("Alexa Mini", "50mm")
            .build(),
        SceneBuilder::new("b", 2)
            .location_in_group("Hospital Room", "Hospital")
            .time_of_day("afternoon")
            .minutes(4.0)
            .actor("Kim", "Doctor")
            .actor("Lee", "Patient")
            .build(),
    ];
    let orchestrator = ScheduleOrchestrator::new(SchedulerConfig::default());
    let schedule = orchestrator.generate(&scenes);
    let breakdown = orchestrator.generate_breakdown(&schedule, 1).unwrap();

    assert_eq!(breakdown.locations.len(), 2);
    assert_eq!(breakdown.actors["Kim"].len(), 2);
    assert_eq!(breakdown.crew[&Department::Sound]["Choi"][0].role, "Mixer");
    assert!(breakdown.cameras.contains_key("Alexa Mini - 50mm"));
    assert_eq!(breakdown.meeting_points.len(), 1);
    assert_eq!(breakdown.meeting_points[0].location_group, "Hospital");
    assert_eq!(breakdown.meeting_points[0].locations.len(), 2);
    assert_eq!(breakdown.time_table.entries.len(), 2);
    assert!(breakdown.time_table.dropped.is_empty());
}
