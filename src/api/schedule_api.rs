// ==========================================
// 影视拍摄排程系统 - 排程 API
// ==========================================
// 职责: 排程生成/查询/修改/删除,分解表生成
// 流程: 读取项目配置 -> 引擎计算 -> 仓储持久化
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ConfigScope, SchedulerConfig};
use crate::domain::breakdown::Breakdown;
use crate::domain::scene::Scene;
use crate::domain::day::ShootingDay;
use crate::domain::schedule::{
    GeneratedSchedule, ScheduleMessage, SchedulePatch, ScheduleRecord, UnplacedScene,
};
use crate::domain::types::MessageCode;
use crate::engine::{DayPacker, ScheduleOrchestrator};
use crate::repository::ScheduleRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 创建排程请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub project_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

// ==========================================
// ScheduleApi - 排程 API
// ==========================================
pub struct ScheduleApi {
    schedule_repo: Arc<ScheduleRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(schedule_repo: Arc<ScheduleRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            schedule_repo,
            config_manager,
        }
    }

    /// 生成并保存排程
    ///
    /// # 参数
    /// - request: 项目ID + 场景列表（空列表得到带 EMPTY_INPUT 提示的空排程）
    ///
    /// # 返回
    /// - Ok(ScheduleRecord): 已保存的排程
    /// - Err(ApiError): 项目ID为空、配置非法或存储失败
    pub fn create_schedule(&self, request: CreateScheduleRequest) -> ApiResult<ScheduleRecord> {
        let project_id = request.project_id.trim();
        if project_id.is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }

        // 快照即本次生成所用配置
        let config_snapshot = self
            .config_manager
            .get_config_snapshot(&ConfigScope::project(project_id))?;
        let config: SchedulerConfig = serde_json::from_str(&config_snapshot)
            .map_err(|e| ApiError::InternalError(format!("配置快照解析失败: {}", e)))?;

        let schedule = ScheduleOrchestrator::new(config).generate(&request.scenes);

        let now = Utc::now();
        let record = ScheduleRecord {
            schedule_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            title: request.title,
            notes: request.notes,
            schedule,
            config_snapshot: Some(config_snapshot),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.schedule_repo.create(&record)?;

        info!(
            schedule_id = %record.schedule_id,
            project_id = %record.project_id,
            total_days = record.schedule.total_days,
            incomplete = record.schedule.incomplete,
            "排程已创建"
        );
        Ok(record)
    }

    /// 查询项目下的排程（按创建时间降序）
    pub fn list_schedules(&self, project_id: &str) -> ApiResult<Vec<ScheduleRecord>> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }
        Ok(self.schedule_repo.list_by_project(project_id.trim())?)
    }

    /// 查询单个排程
    ///
    /// # 返回
    /// - Err(NotFound): 不存在或已删除
    pub fn get_schedule(&self, schedule_id: &str) -> ApiResult<ScheduleRecord> {
        self.schedule_repo
            .find_by_id(schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排程(id={})不存在", schedule_id)))
    }

    /// 部分更新排程
    ///
    /// 提交拍摄日时:
    /// - 日序号必须从 1 连续编号,场景只能来自本排程且不得重复
    /// - 按生成时配置重新定稿（起止时间、适用上限、汇总、时间线）,超出上限时拒绝
    /// - 移出拍摄日的场景进入未排列表,重新排入的场景从未排列表移除
    pub fn update_schedule(&self, schedule_id: &str, patch: SchedulePatch) -> ApiResult<ScheduleRecord> {
        if patch.is_empty() {
            return Err(ApiError::InvalidInput("更新内容不能为空".to_string()));
        }

        let mut record = self.get_schedule(schedule_id)?;

        if let Some(title) = patch.title {
            record.title = Some(title);
        }
        if let Some(notes) = patch.notes {
            record.notes = Some(notes);
        }
        if let Some(days) = patch.days {
            let config = self.config_for(&record)?;
            apply_day_edits(&config, &mut record.schedule, days)?;
        }

        record.updated_at = Utc::now();
        self.schedule_repo.update(&record)?;

        info!(schedule_id = %record.schedule_id, "排程已更新");
        Ok(record)
    }

    /// 软删除排程
    pub fn delete_schedule(&self, schedule_id: &str) -> ApiResult<()> {
        self.schedule_repo.soft_delete(schedule_id, Utc::now())?;
        info!(schedule_id = %schedule_id, "排程已删除");
        Ok(())
    }

    /// 生成指定拍摄日的分解表
    ///
    /// # 返回
    /// - Err(NotFound): 排程或拍摄日不存在
    pub fn generate_breakdown(&self, schedule_id: &str, day_number: u32) -> ApiResult<Breakdown> {
        let record = self.get_schedule(schedule_id)?;
        let orchestrator = ScheduleOrchestrator::new(self.config_for(&record)?);

        orchestrator
            .generate_breakdown(&record.schedule, day_number)
            .ok_or_else(|| {
                ApiError::NotFound(format!("排程(id={})中不存在第 {} 个拍摄日", schedule_id, day_number))
            })
    }

    /// 排程生成时的配置（快照缺失或损坏时回落到当前项目配置）
    fn config_for(&self, record: &ScheduleRecord) -> ApiResult<SchedulerConfig> {
        if let Some(snapshot) = &record.config_snapshot {
            match serde_json::from_str::<SchedulerConfig>(snapshot) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => warn!(
                    schedule_id = %record.schedule_id,
                    error = %e,
                    "配置快照解析失败，使用当前项目配置"
                ),
            }
        }
        Ok(self
            .config_manager
            .load_scheduler_config(&ConfigScope::project(record.project_id.as_str()))?)
    }
}

// ==========================================
// 人工调整拍摄日
// ==========================================

const MOVED_OUT_REASON: &str = "人工调整后移出拍摄日";

/// 校验并应用人工调整后的拍摄日
fn apply_day_edits(
    config: &SchedulerConfig,
    schedule: &mut GeneratedSchedule,
    days: Vec<ShootingDay>,
) -> ApiResult<()> {
    // 本排程内的全部场景（已排 + 未排）
    let mut known: HashMap<String, UnplacedScene> = schedule
        .unplaced
        .iter()
        .map(|u| (u.scene_id.clone(), u.clone()))
        .collect();
    for s in schedule.days.iter().flat_map(|d| d.scenes.iter()) {
        known.insert(
            s.scene.id.clone(),
            UnplacedScene {
                scene_id: s.scene.id.clone(),
                scene_number: s.scene.scene_number,
                time_slot: s.time_slot,
                actual_duration: s.actual_duration,
                reason: MOVED_OUT_REASON.to_string(),
            },
        );
    }

    let mut placed: HashSet<String> = HashSet::new();
    for (idx, day) in days.iter().enumerate() {
        if day.day_number != idx as u32 + 1 {
            return Err(ApiError::InvalidInput(format!(
                "拍摄日序号必须从 1 连续编号: 第 {} 个拍摄日的序号为 {}",
                idx + 1,
                day.day_number
            )));
        }
        if day.rest_day && !day.scenes.is_empty() {
            return Err(ApiError::InvalidInput(format!(
                "休息日(第 {} 天)不能安排场景",
                day.day_number
            )));
        }
        for s in &day.scenes {
            if !known.contains_key(&s.scene.id) {
                return Err(ApiError::InvalidInput(format!("场景(id={})不属于该排程", s.scene.id)));
            }
            if !placed.insert(s.scene.id.clone()) {
                return Err(ApiError::InvalidInput(format!("场景(id={})重复排入", s.scene.id)));
            }
        }
    }

    let packer = DayPacker::new(&config.packing, &config.call_times);
    let mut days = packer
        .refinalize(days)
        .map_err(|e| ApiError::BusinessRuleViolation(e.to_string()))?;
    ScheduleOrchestrator::new(config.clone()).rebuild_timelines(&mut days);

    // 未排列表按场次号排序,保证结果稳定
    let mut unplaced: Vec<UnplacedScene> = known
        .into_values()
        .filter(|u| !placed.contains(&u.scene_id))
        .collect();
    unplaced.sort_by(|a, b| {
        a.scene_number
            .cmp(&b.scene_number)
            .then_with(|| a.scene_id.cmp(&b.scene_id))
    });

    schedule
        .messages
        .retain(|m| m.code != MessageCode::IncompleteSchedule);
    for u in &unplaced {
        schedule.messages.push(ScheduleMessage::new(
            MessageCode::IncompleteSchedule,
            Some(&u.scene_id),
            u.reason.clone(),
        ));
    }

    schedule.days = days;
    schedule.incomplete = !unplaced.is_empty();
    schedule.unplaced = unplaced;
    schedule.recompute_totals();
    Ok(())
}
