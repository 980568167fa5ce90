// ==========================================
// 影视拍摄排程系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ScheduleApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::ScheduleRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHOOT_SCHEDULE_DB_PATH";

/// 应用状态
///
/// 所有仓储与 API 共享同一个连接（单写者）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 排程API
    pub schedule_api: Arc<ScheduleApi>,

    /// 配置管理器（读写 config_kv）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 为内存库）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::new(conn));
        let schedule_api = Arc::new(ScheduleApi::new(schedule_repo, config_manager.clone()));

        tracing::info!("AppState初始化成功");
        Ok(Self {
            db_path,
            schedule_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SHOOT_SCHEDULE_DB_PATH（若设置）
/// - 开发环境: 用户数据目录/shoot-schedule-dev/shoot_schedule.db
/// - 生产环境: 用户数据目录/shoot-schedule/shoot_schedule.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shoot_schedule.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("shoot-schedule-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("shoot-schedule");
        }

        // 目录创建失败时由打开数据库时报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("shoot_schedule.db");
    }

    path.to_string_lossy().to_string()
}
