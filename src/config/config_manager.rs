// ==========================================
// 影视拍摄排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 优先级: 项目作用域 > global > 代码默认值
// ==========================================

use crate::config::scheduler_config::{ConfigError, SchedulerConfig};
use crate::db::open_sqlite_connection;
use crate::domain::types::{ClockTime, PackingPolicy};
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    Global,                          // 全局
    Project { project_id: String },  // 项目
}

impl ConfigScope {
    pub fn project(project_id: impl Into<String>) -> Self {
        ConfigScope::Project {
            project_id: project_id.into(),
        }
    }

    /// config_kv.scope_id 取值
    pub fn scope_id(&self) -> String {
        match self {
            ConfigScope::Global => "global".to_string(),
            ConfigScope::Project { project_id } => format!("project/{}", project_id),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path).map_err(storage_err)?;
        crate::db::init_schema(&conn).map_err(storage_err)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取单个作用域内的配置值
    fn get_scoped_value(&self, scope_id: &str, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::StorageError(format!("锁获取失败: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope_id, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// 读取配置值（项目作用域回落到 global）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 两个作用域均未配置
    pub fn get_value(&self, scope: &ConfigScope, key: &str) -> Result<Option<String>, ConfigError> {
        if let ConfigScope::Project { .. } = scope {
            if let Some(v) = self.get_scoped_value(&scope.scope_id(), key)? {
                return Ok(Some(v));
            }
        }
        self.get_scoped_value(&ConfigScope::Global.scope_id(), key)
    }

    /// 写入配置值（UPSERT）
    pub fn set_value(&self, scope: &ConfigScope, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::StorageError(format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![scope.scope_id(), key, value],
        )
        .map_err(storage_err)?;

        tracing::debug!(scope_id = %scope.scope_id(), key, value, "配置已写入");
        Ok(())
    }

    /// 删除作用域内的配置值
    pub fn remove_value(&self, scope: &ConfigScope, key: &str) -> Result<bool, ConfigError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::StorageError(format!("锁获取失败: {}", e)))?;

        let affected = conn
            .execute(
                "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope.scope_id(), key],
            )
            .map_err(storage_err)?;
        Ok(affected > 0)
    }

    /// 读取值并解析,格式错误时保留默认值并告警
    fn apply<T>(&self, scope: &ConfigScope, key: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
    {
        if let Some(raw) = self.get_value(scope, key)? {
            match raw.trim().parse::<T>() {
                Ok(v) => *target = v,
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                }
            }
        }
        Ok(())
    }

    fn apply_clock(
        &self,
        scope: &ConfigScope,
        key: &str,
        target: &mut ClockTime,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = self.get_value(scope, key)? {
            match ClockTime::parse(&raw) {
                Some(t) => *target = t,
                None => {
                    tracing::warn!(config_key = key, raw_value = %raw, "时间配置格式错误，使用默认值");
                }
            }
        }
        Ok(())
    }

    // ==========================================
    // 排程参数
    // ==========================================

    /// 加载作用域内生效的排程参数
    ///
    /// 未配置的键取 `SchedulerConfig::default()`;结果必须通过校验。
    pub fn load_scheduler_config(&self, scope: &ConfigScope) -> Result<SchedulerConfig, ConfigError> {
        use config_keys::*;

        let mut cfg = SchedulerConfig::default();

        self.apply(scope, DURATION_RATIO, &mut cfg.duration.ratio)?;
        self.apply(scope, DEFAULT_NOMINAL_MINUTES, &mut cfg.duration.default_nominal_minutes)?;

        let mut policy = cfg.packing.policy;
        self.apply::<PackingPolicy>(scope, PACKING_POLICY, &mut policy)?;
        cfg.packing.policy = policy;
        self.apply(scope, FIXED_DAILY_MINUTES, &mut cfg.packing.fixed_daily_minutes)?;
        self.apply(scope, DYNAMIC_DAILY_MAX_MINUTES, &mut cfg.packing.dynamic_daily_max_minutes)?;
        self.apply(scope, WEEKLY_CAP_MINUTES, &mut cfg.packing.weekly_cap_minutes)?;
        self.apply(scope, SCENE_BREAK_MINUTES, &mut cfg.packing.scene_break_minutes)?;
        self.apply(scope, MAX_SCENES_PER_DAY, &mut cfg.packing.max_scenes_per_day)?;
        self.apply(scope, REST_DAY_EVERY, &mut cfg.packing.rest_day_every)?;
        self.apply(scope, LOCATION_CONTINUITY_LIMIT, &mut cfg.packing.location_continuity_limit)?;

        self.apply_clock(scope, CALL_TIME_DAY, &mut cfg.call_times.day_start)?;
        self.apply_clock(scope, CALL_TIME_MIXED_NIGHT_HEAVY, &mut cfg.call_times.mixed_night_heavy_start)?;
        self.apply_clock(scope, CALL_TIME_NIGHT, &mut cfg.call_times.night_start)?;
        self.apply_clock(scope, CALL_TIME_DEFAULT, &mut cfg.call_times.default_start)?;

        if let Some(loc) = self.get_value(scope, MEETING_LOCATION)? {
            if !loc.trim().is_empty() {
                cfg.timeline.meeting_location = loc.trim().to_string();
            }
        }
        self.apply(scope, TRAVEL_MINUTES, &mut cfg.timeline.travel_minutes)?;
        self.apply(scope, LUNCH_AFTER_MINUTES, &mut cfg.timeline.lunch_after_minutes)?;
        self.apply(scope, MOVE_BUFFER_MINUTES, &mut cfg.timeline.move_buffer_minutes)?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// 获取生效配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 生成排程时随结果一起保存,保证结果可复现
    pub fn get_config_snapshot(&self, scope: &ConfigScope) -> Result<String, ConfigError> {
        let cfg = self.load_scheduler_config(scope)?;
        serde_json::to_string(&cfg).map_err(|e| ConfigError::ParseError {
            key: "snapshot".to_string(),
            message: e.to_string(),
        })
    }
}

fn storage_err(e: rusqlite::Error) -> ConfigError {
    ConfigError::StorageError(e.to_string())
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 时长估算
    pub const DURATION_RATIO: &str = "duration_ratio";
    pub const DEFAULT_NOMINAL_MINUTES: &str = "default_nominal_minutes";

    // 日装箱
    pub const PACKING_POLICY: &str = "packing_policy"; // fixed / dynamic
    pub const FIXED_DAILY_MINUTES: &str = "fixed_daily_minutes";
    pub const DYNAMIC_DAILY_MAX_MINUTES: &str = "dynamic_daily_max_minutes";
    pub const WEEKLY_CAP_MINUTES: &str = "weekly_cap_minutes";
    pub const SCENE_BREAK_MINUTES: &str = "scene_break_minutes";
    pub const MAX_SCENES_PER_DAY: &str = "max_scenes_per_day";
    pub const REST_DAY_EVERY: &str = "rest_day_every";
    pub const LOCATION_CONTINUITY_LIMIT: &str = "location_continuity_limit";

    // 开机时间 (HH:MM)
    pub const CALL_TIME_DAY: &str = "call_time_day";
    pub const CALL_TIME_MIXED_NIGHT_HEAVY: &str = "call_time_mixed_night_heavy";
    pub const CALL_TIME_NIGHT: &str = "call_time_night";
    pub const CALL_TIME_DEFAULT: &str = "call_time_default";

    // 时间线
    pub const MEETING_LOCATION: &str = "meeting_location";
    pub const TRAVEL_MINUTES: &str = "travel_minutes";
    pub const LUNCH_AFTER_MINUTES: &str = "lunch_after_minutes";
    pub const MOVE_BUFFER_MINUTES: &str = "move_buffer_minutes";
}
