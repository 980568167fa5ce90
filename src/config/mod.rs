// ==========================================
// 影视拍摄排程系统 - 配置层
// ==========================================
// 职责: 排程参数定义与多级覆写 (global / 项目)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod scheduler_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager, ConfigScope};
pub use scheduler_config::{
    CallTimeConfig, ConfigError, DurationConfig, PackingConfig, SchedulerConfig, SlotWindow,
    SlotWindowConfig, TimelineConfig,
};
