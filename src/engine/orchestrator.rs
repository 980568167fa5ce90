// ==========================================
// 影视拍摄排程系统 - 引擎编排器
// ==========================================
// 用途: 协调各引擎的执行顺序
// 流程: 输入校正 -> 权重 -> 排序 -> 装箱/定稿 -> 时间线 -> 汇总
// ==========================================
// 红线: 已排 + 未排 == 输入,任何场景不得静默丢失
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::breakdown::Breakdown;
use crate::domain::day::ShootingDay;
use crate::domain::scene::Scene;
use crate::domain::schedule::{GeneratedSchedule, ScheduleMessage, UnplacedScene};
use crate::domain::types::{MessageCode, TimeOfDay};
use crate::engine::{
    BreakdownGenerator, DayPacker, DurationEstimator, LocationSlotSorter, TimelineBuilder,
    WeightCalculator,
};
use tracing::{debug, info, instrument, warn};

// ==========================================
// ScheduleOrchestrator - 引擎编排器
// ==========================================
pub struct ScheduleOrchestrator {
    config: SchedulerConfig,
    sorter: LocationSlotSorter,
}

impl ScheduleOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 已校验的排程配置
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            sorter: LocationSlotSorter::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// 执行完整排程流程
    ///
    /// # 参数
    /// - scenes: 场景列表（任意顺序）
    ///
    /// # 返回
    /// 排程结果; 输入为空时返回带 EMPTY_INPUT 提示的空排程
    #[instrument(skip(self, scenes), fields(
        scene_count = scenes.len(),
        policy = self.config.packing.policy.as_str()
    ))]
    pub fn generate(&self, scenes: &[Scene]) -> GeneratedSchedule {
        let policy = self.config.packing.policy;

        if scenes.is_empty() {
            warn!("场景列表为空，返回空排程");
            return GeneratedSchedule::empty(
                policy,
                ScheduleMessage::new(MessageCode::EmptyInput, None, "没有可排程的场景"),
            );
        }

        info!("开始执行排程流程");

        let estimator = DurationEstimator::new(&self.config.duration);

        // ==========================================
        // 步骤1: 输入校正（只提示,不报错）
        // ==========================================
        let mut messages = self.collect_coercions(scenes, &estimator);
        debug!(messages = messages.len(), "输入校正完成");

        // ==========================================
        // 步骤2: Weight Calculator - 场景权重
        // ==========================================
        let weighted = WeightCalculator::new(&estimator).weigh_all(scenes);
        debug!(weighted = weighted.len(), "场景权重计算完成");

        // ==========================================
        // 步骤3: Location/Slot Sorter - 地点/时段排序
        // ==========================================
        let sorted = self.sorter.sort(weighted);
        debug!(sorted = sorted.len(), "地点/时段排序完成");

        // ==========================================
        // 步骤4: Day Packer - 拍摄日装箱与定稿
        // ==========================================
        let packer = DayPacker::new(&self.config.packing, &self.config.call_times);
        let daily_cap = packer.daily_cap();
        let mut outcome = packer.pack(sorted);

        // ==========================================
        // 步骤5: Timeline Builder - 时间线
        // ==========================================
        let mut days = outcome.days;
        self.rebuild_timelines(&mut days);

        // ==========================================
        // 步骤6: 汇总未排场景与提示
        // ==========================================
        let unplaced: Vec<UnplacedScene> = outcome
            .pending
            .drain_all()
            .into_iter()
            .map(|s| UnplacedScene {
                scene_id: s.scene_id().to_string(),
                scene_number: s.scene_number(),
                time_slot: s.time_slot,
                actual_duration: s.actual_duration,
                reason: if s.actual_duration > daily_cap {
                    format!("实际拍摄时长 {} 分钟超过单日上限 {} 分钟", s.actual_duration, daily_cap)
                } else {
                    "待排队列回填中止，未能落位".to_string()
                },
            })
            .collect();

        for scene_id in &outcome.deferred_scene_ids {
            if !unplaced.iter().any(|u| &u.scene_id == scene_id) {
                messages.push(ScheduleMessage::new(
                    MessageCode::SceneDeferred,
                    Some(scene_id),
                    "场景经待排队列回填后落位",
                ));
            }
        }

        let incomplete = !unplaced.is_empty();
        for u in &unplaced {
            messages.push(ScheduleMessage::new(
                MessageCode::IncompleteSchedule,
                Some(&u.scene_id),
                u.reason.clone(),
            ));
        }

        let mut schedule = GeneratedSchedule {
            policy,
            days,
            total_days: 0,
            total_scenes: 0,
            total_duration: 0,
            incomplete,
            unplaced,
            messages,
        };
        schedule.recompute_totals();

        let accounted = schedule.total_scenes as usize + schedule.unplaced.len();
        if accounted != scenes.len() {
            warn!(
                input = scenes.len(),
                accounted, "已排 + 未排 与输入数量不一致"
            );
        }

        info!(
            total_days = schedule.total_days,
            total_scenes = schedule.total_scenes,
            total_duration = schedule.total_duration,
            unplaced = schedule.unplaced.len(),
            incomplete = schedule.incomplete,
            "排程流程完成"
        );

        schedule
    }

    /// 重建拍摄日时间线（人工调整拍摄日后同样适用）
    pub fn rebuild_timelines(&self, days: &mut [ShootingDay]) {
        let builder = TimelineBuilder::new(&self.config.timeline, &self.config.packing);
        for day in days.iter_mut() {
            day.timeline = builder.build_for_day(day);
        }
    }

    /// 生成指定拍摄日的分解表
    ///
    /// # 返回
    /// 拍摄日不存在时返回 None
    #[instrument(skip(self, schedule))]
    pub fn generate_breakdown(&self, schedule: &GeneratedSchedule, day_number: u32) -> Option<Breakdown> {
        let day = schedule.find_day(day_number)?;
        Some(BreakdownGenerator::new(&self.config).generate(day))
    }

    /// 收集输入校正提示
    ///
    /// 时长缺失/非法、地点缺失、时段缺失/无法识别、无演员,均按默认值处理并记录。
    fn collect_coercions(&self, scenes: &[Scene], estimator: &DurationEstimator) -> Vec<ScheduleMessage> {
        let mut messages = Vec::new();

        for scene in scenes {
            let id = Some(scene.id.as_str());

            let estimate = estimator.estimate(scene.nominal_duration.as_ref());
            if estimate.defaulted {
                messages.push(ScheduleMessage::new(
                    MessageCode::DurationDefaulted,
                    id,
                    format!("内容时长缺失或无效，按 {} 分钟计", estimate.nominal_minutes),
                ));
            }

            if scene.location.as_ref().map_or(true, |l| l.name.trim().is_empty()) {
                messages.push(ScheduleMessage::new(
                    MessageCode::LocationDefaulted,
                    id,
                    format!("地点缺失，归入 \"{}\"", scene.location_name()),
                ));
            }

            if scene.normalized_time_of_day() == TimeOfDay::Unspecified {
                messages.push(ScheduleMessage::new(
                    MessageCode::TimeOfDayDefaulted,
                    id,
                    format!(
                        "时段缺失或无法识别: {:?}",
                        scene.time_of_day.as_deref().unwrap_or("")
                    ),
                ));
            }

            if scene.actor_names().is_empty() {
                messages.push(ScheduleMessage::new(MessageCode::CastMissing, id, "无演员信息"));
            }
        }

        messages
    }
}
