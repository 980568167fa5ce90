// ==========================================
// 影视拍摄排程系统 - 拍摄日装箱引擎
// ==========================================
// 职责: 贪心地将有序场景装入拍摄日
// 输入: 排序后场景列表
// 输出: 拍摄日列表 + 待排队列（未能落位的场景）
// ==========================================
// 换日条件（当日非空时任一成立）:
// 1) 换地点且当日在当前地点已拍满连续上限
// 2) 当日场景数已达上限
// 3) 加入后超出日上限（含场间休息）
// 4) 加入后超出剩余周预算（动态策略）
// 新日仍放不下的场景进入待排队列,主循环后按 day -> night 依次回填
// ==========================================

use crate::config::{CallTimeConfig, PackingConfig};
use crate::domain::day::ShootingDay;
use crate::domain::schedule::PendingQueue;
use crate::domain::types::PackingPolicy;
use crate::domain::weight::WeightedScene;
use crate::engine::finalizer::DayFinalizer;
use std::fmt;
use tracing::{debug, info, instrument};

/// 一周天数（周预算与休息日的周期）
pub const DAYS_PER_WEEK: u32 = 7;

/// 换日原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    LocationContinuity,
    MaxScenes,
    DailyCap,
    WeeklyBudget,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::LocationContinuity => "LOCATION_CONTINUITY",
            CloseReason::MaxScenes => "MAX_SCENES_PER_DAY",
            CloseReason::DailyCap => "DAILY_CAP_EXCEEDED",
            CloseReason::WeeklyBudget => "WEEKLY_BUDGET_EXCEEDED",
        };
        write!(f, "{}", s)
    }
}

/// 人工调整后的拍摄日超出适用上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapExceeded {
    pub day_number: u32,
    pub total_duration: u32,
    pub max_duration: u32,
}

impl fmt::Display for CapExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "第 {} 个拍摄日总时长 {} 分钟超出上限 {} 分钟",
            self.day_number, self.total_duration, self.max_duration
        )
    }
}

/// 装箱结果
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub days: Vec<ShootingDay>,
    /// 回填后仍留在队列中的场景（非空即排程不完整）
    pub pending: PendingQueue,
    /// 主循环中曾进入待排队列的场景
    pub deferred_scene_ids: Vec<String>,
}

// ==========================================
// PackState - 装箱过程状态
// ==========================================
struct PackState {
    day_number: u32,
    scenes: Vec<WeightedScene>,
    duration: u32,
    location: Option<String>,
    week_index: u32,
    /// 本周已关闭拍摄日累计时长
    weekly_used: u32,
    days: Vec<ShootingDay>,
}

impl PackState {
    fn new() -> Self {
        Self {
            day_number: 1,
            scenes: Vec::new(),
            duration: 0,
            location: None,
            week_index: 0,
            weekly_used: 0,
            days: Vec::new(),
        }
    }

    /// 当日在当前地点的场景数
    fn scenes_at_current_location(&self) -> usize {
        match &self.location {
            Some(loc) => self.scenes.iter().filter(|s| &s.location_name == loc).count(),
            None => 0,
        }
    }
}

// ==========================================
// DayPacker - 拍摄日装箱引擎
// ==========================================
pub struct DayPacker<'a> {
    packing: &'a PackingConfig,
    finalizer: DayFinalizer<'a>,
}

impl<'a> DayPacker<'a> {
    pub fn new(packing: &'a PackingConfig, call_times: &'a CallTimeConfig) -> Self {
        Self {
            packing,
            finalizer: DayFinalizer::new(call_times, packing),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 装箱
    ///
    /// # 参数
    /// - `sorted`: 已按地点/时段/权重排序的场景
    ///
    /// # 返回
    /// PackOutcome（拍摄日 + 剩余待排队列）
    #[instrument(skip(self, sorted), fields(
        scene_count = sorted.len(),
        policy = self.packing.policy.as_str()
    ))]
    pub fn pack(&self, sorted: Vec<WeightedScene>) -> PackOutcome {
        let mut state = PackState::new();
        let mut pending = PendingQueue::new();
        let mut deferred_scene_ids = Vec::new();

        self.skip_rest_days(&mut state);

        // 1. 主循环
        for scene in sorted {
            if let Err(scene) = self.try_place(&mut state, scene) {
                debug!(
                    scene_id = %scene.scene_id(),
                    time_slot = %scene.time_slot,
                    actual_duration = scene.actual_duration,
                    day_number = state.day_number,
                    "新拍摄日无法容纳，进入待排队列"
                );
                deferred_scene_ids.push(scene.scene_id().to_string());
                pending.push(scene);
            }
        }

        // 2. 回填待排队列 (day -> night, FIFO)
        if !pending.is_empty() {
            self.drain_pending(&mut state, &mut pending);
        }

        // 3. 收尾当前拍摄日（不再推进日序号）
        self.emit_day(&mut state);

        info!(
            days = state.days.len(),
            deferred = deferred_scene_ids.len(),
            unplaced = pending.len(),
            "拍摄日装箱完成"
        );

        PackOutcome {
            days: state.days,
            pending,
            deferred_scene_ids,
        }
    }

    /// 回填待排队列
    ///
    /// 周预算耗尽时跳到下一周重试一次;
    /// 新的一周仍放不下（单场超过日上限）则停止回填,剩余场景留在队列。
    fn drain_pending(&self, state: &mut PackState, pending: &mut PendingQueue) {
        for night in [false, true] {
            loop {
                let queue = if night { &mut pending.night } else { &mut pending.day };
                let scene = match queue.pop_front() {
                    Some(s) => s,
                    None => break,
                };

                let scene = match self.try_place(state, scene) {
                    Ok(()) => continue,
                    Err(scene) => scene,
                };

                let retried = if self.policy() == PackingPolicy::Dynamic
                    && scene.actual_duration <= self.daily_cap()
                {
                    self.skip_to_next_week(state);
                    self.try_place(state, scene)
                } else {
                    Err(scene)
                };

                if let Err(scene) = retried {
                    debug!(
                        scene_id = %scene.scene_id(),
                        actual_duration = scene.actual_duration,
                        daily_cap = self.daily_cap(),
                        "场景超出单日上限，停止回填"
                    );
                    let queue = if night { &mut pending.night } else { &mut pending.day };
                    queue.push_front(scene);
                    return;
                }
            }
        }
    }

    /// 尝试放入当前拍摄日（必要时先换日）
    ///
    /// # 返回
    /// - Ok(()): 已放入
    /// - Err(scene): 新拍摄日也无法容纳
    fn try_place(&self, state: &mut PackState, scene: WeightedScene) -> Result<(), WeightedScene> {
        if let Some(reason) = self.close_reason(state, &scene) {
            debug!(
                day_number = state.day_number,
                scene_id = %scene.scene_id(),
                reason = %reason,
                "换日"
            );
            self.close_day(state);
        }

        if state.scenes.is_empty() && !self.fits_fresh_day(state, &scene) {
            return Err(scene);
        }

        if !state.scenes.is_empty() {
            state.duration = state.duration.saturating_add(self.packing.scene_break_minutes);
        }
        state.duration = state.duration.saturating_add(scene.actual_duration);
        state.location = Some(scene.location_name.clone());
        state.scenes.push(scene);
        Ok(())
    }

    /// 重新定稿人工调整后的拍摄日
    ///
    /// 场景保持给定顺序,起止时间与适用上限按周累计重算;无场景的日视为休息日。
    ///
    /// # 返回
    /// - Err(CapExceeded): 某日总时长超出适用上限
    pub fn refinalize(&self, days: Vec<ShootingDay>) -> Result<Vec<ShootingDay>, CapExceeded> {
        let mut week_index = 0;
        let mut weekly_used = 0u32;
        let mut out = Vec::with_capacity(days.len());

        for day in days {
            let week = day.day_number.saturating_sub(1) / DAYS_PER_WEEK;
            if week != week_index {
                week_index = week;
                weekly_used = 0;
            }
            if day.scenes.is_empty() {
                out.push(ShootingDay::rest(day.day_number));
                continue;
            }

            let max_duration = self.applicable_max(weekly_used);
            let reflowed = self.finalizer.reflow(day.day_number, day.scenes, max_duration);
            if reflowed.total_duration > max_duration {
                return Err(CapExceeded {
                    day_number: reflowed.day_number,
                    total_duration: reflowed.total_duration,
                    max_duration,
                });
            }
            weekly_used = weekly_used.saturating_add(reflowed.total_duration);
            out.push(reflowed);
        }

        Ok(out)
    }

    // ==========================================
    // 约束判定
    // ==========================================

    /// 判定放入该场景前是否需要换日
    fn close_reason(&self, state: &PackState, scene: &WeightedScene) -> Option<CloseReason> {
        if state.scenes.is_empty() {
            return None;
        }

        if let Some(current) = &state.location {
            if current != &scene.location_name
                && state.scenes_at_current_location() >= self.packing.location_continuity_limit
            {
                return Some(CloseReason::LocationContinuity);
            }
        }

        if state.scenes.len() >= self.packing.max_scenes_per_day {
            return Some(CloseReason::MaxScenes);
        }

        let projected = state
            .duration
            .saturating_add(scene.actual_duration)
            .saturating_add(self.packing.scene_break_minutes);
        if projected > self.daily_cap() {
            return Some(CloseReason::DailyCap);
        }

        if let Some(weekly_cap) = self.weekly_cap() {
            if state.weekly_used.saturating_add(projected) > weekly_cap {
                return Some(CloseReason::WeeklyBudget);
            }
        }

        None
    }

    /// 空拍摄日能否容纳该场景
    fn fits_fresh_day(&self, state: &PackState, scene: &WeightedScene) -> bool {
        if scene.actual_duration > self.daily_cap() {
            return false;
        }
        match self.weekly_cap() {
            Some(cap) => state.weekly_used.saturating_add(scene.actual_duration) <= cap,
            None => true,
        }
    }

    fn policy(&self) -> PackingPolicy {
        self.packing.policy
    }

    /// 日上限
    pub fn daily_cap(&self) -> u32 {
        match self.policy() {
            PackingPolicy::Fixed => self.packing.fixed_daily_minutes,
            PackingPolicy::Dynamic => self.packing.dynamic_daily_max_minutes,
        }
    }

    /// 周上限（固定策略无周上限）
    fn weekly_cap(&self) -> Option<u32> {
        match self.policy() {
            PackingPolicy::Fixed => None,
            PackingPolicy::Dynamic => Some(self.packing.weekly_cap_minutes),
        }
    }

    /// 适用上限: 日上限与本周剩余预算取小
    fn applicable_max(&self, weekly_used: u32) -> u32 {
        match self.weekly_cap() {
            Some(cap) => self.daily_cap().min(cap.saturating_sub(weekly_used)),
            None => self.daily_cap(),
        }
    }

    /// 是否为强制休息日（仅动态策略）
    pub fn is_rest_day(&self, day_number: u32) -> bool {
        self.policy() == PackingPolicy::Dynamic
            && self.packing.rest_day_every > 1
            && day_number % self.packing.rest_day_every == 0
    }

    // ==========================================
    // 日序推进
    // ==========================================

    /// 定稿并输出当前拍摄日（空日为 no-op）
    ///
    /// 之前跳过的日序号在此补为休息日,末尾不会出现空休息日。
    fn emit_day(&self, state: &mut PackState) {
        if state.scenes.is_empty() {
            return;
        }
        while (state.days.len() as u32) + 1 < state.day_number {
            let rest_number = state.days.len() as u32 + 1;
            debug!(day_number = rest_number, "休息日");
            state.days.push(ShootingDay::rest(rest_number));
        }
        let scenes = std::mem::take(&mut state.scenes);
        let max_duration = self.applicable_max(state.weekly_used);
        let day = self.finalizer.finalize(state.day_number, scenes, max_duration);

        debug!(
            day_number = day.day_number,
            scenes = day.scenes.len(),
            total_duration = day.total_duration,
            max_duration,
            start = %day.time_range.start,
            "拍摄日定稿"
        );

        state.weekly_used += day.total_duration;
        state.days.push(day);
    }

    /// 关闭当前拍摄日并推进到下一个可拍摄日
    fn close_day(&self, state: &mut PackState) {
        if state.scenes.is_empty() {
            return;
        }
        self.emit_day(state);
        self.advance(state);
    }

    fn advance(&self, state: &mut PackState) {
        state.day_number += 1;
        state.duration = 0;
        state.location = None;
        self.roll_week(state);
        self.skip_rest_days(state);
    }

    /// 跨周时重置周累计
    fn roll_week(&self, state: &mut PackState) {
        let week = (state.day_number - 1) / DAYS_PER_WEEK;
        if week != state.week_index {
            state.week_index = week;
            state.weekly_used = 0;
        }
    }

    /// 跳过强制休息日（由 emit_day 补输出,保持日序连续）
    fn skip_rest_days(&self, state: &mut PackState) {
        while self.is_rest_day(state.day_number) {
            state.day_number += 1;
            self.roll_week(state);
        }
    }

    /// 周预算耗尽: 当前空日至周末均不排戏
    fn skip_to_next_week(&self, state: &mut PackState) {
        self.close_day(state);
        state.day_number = (state.week_index + 1) * DAYS_PER_WEEK + 1;
        state.duration = 0;
        state.location = None;
        self.roll_week(state);
        self.skip_rest_days(state);
    }
}
