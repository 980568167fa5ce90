// ==========================================
// 影视拍摄排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod breakdown;
pub mod day;
pub mod scene;
pub mod schedule;
pub mod types;
pub mod weight;

// 重导出核心类型
pub use breakdown::{Breakdown, MeetingPoint, RoleRef, SceneRef, TimeTable, TimeTableEntry};
pub use day::{DaySummary, ScheduledScene, ShootingDay, TimeRange, TimelineBlock};
pub use scene::{CameraSetup, CastMember, CrewMember, Location, NominalDuration, Scene};
pub use schedule::{
    GeneratedSchedule, PendingQueue, ScheduleMessage, SchedulePatch, ScheduleRecord,
    UnplacedScene,
};
pub use types::{
    ActivityKind, ClockTime, Department, MessageCode, PackingPolicy, TimeOfDay, TimeSlot,
};
pub use weight::{SceneWeight, WeightedScene};
