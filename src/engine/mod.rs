// ==========================================
// 影视拍摄排程系统 - 引擎层
// ==========================================
// 职责: 实现排程规则,不访问存储
// 红线: 引擎是纯计算,输入校正只产生提示,不报错
// ==========================================

pub mod breakdown;
pub mod duration;
pub mod finalizer;
pub mod orchestrator;
pub mod packer;
pub mod slot_optimizer;
pub mod sorter;
pub mod timeline;
pub mod weight;

// 重导出核心引擎
pub use breakdown::BreakdownGenerator;
pub use duration::{DurationEstimate, DurationEstimator};
pub use finalizer::DayFinalizer;
pub use orchestrator::ScheduleOrchestrator;
pub use packer::{CapExceeded, CloseReason, DayPacker, PackOutcome};
pub use slot_optimizer::{SlotOptimizer, SlotPlacement, SlotPlan};
pub use sorter::LocationSlotSorter;
pub use timeline::TimelineBuilder;
pub use weight::{SceneIndex, WeightCalculator};
