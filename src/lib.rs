// ==========================================
// 影视拍摄排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排程辅助工具 (贪心启发式,人工可调整结果)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程规则
pub mod engine;

// 配置层 - 排程参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActivityKind, ClockTime, Department, MessageCode, PackingPolicy, TimeOfDay, TimeSlot,
};

// 领域实体
pub use domain::{Breakdown, GeneratedSchedule, Scene, ScheduleRecord, ShootingDay};

// 配置
pub use config::{ConfigManager, ConfigScope, SchedulerConfig};

// 引擎
pub use engine::{BreakdownGenerator, DayPacker, ScheduleOrchestrator, TimelineBuilder};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "影视拍摄排程系统";
