// ==========================================
// 影视拍摄排程系统 - 命令行入口
// ==========================================
// 用法:
//   shoot-schedule <scenes.json> [--project <id>] [--db <path>] [--dry-run]
//                  [--breakdown <day>] [--json-log]
//
// - scenes.json: 场景数组,或 {"scenes": [...]} 对象
// - 默认保存到用户数据目录下的 SQLite 文件,--dry-run 只计算不保存
// - 排程 JSON 输出到 stdout,日志输出到 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use shoot_schedule::api::CreateScheduleRequest;
use shoot_schedule::app::{get_default_db_path, AppState};
use shoot_schedule::config::SchedulerConfig;
use shoot_schedule::domain::Scene;
use shoot_schedule::engine::ScheduleOrchestrator;
use shoot_schedule::{logging, APP_NAME, VERSION};

#[derive(Deserialize)]
#[serde(untagged)]
enum SceneInput {
    List(Vec<Scene>),
    Wrapped { scenes: Vec<Scene> },
}

#[derive(Parser, Debug)]
#[command(name = "shoot-schedule", version)]
#[command(about = "影视拍摄排程: 场景排期与分解表生成", long_about = None)]
struct Args {
    /// 场景文件（场景数组,或 {"scenes": [...]} 对象）
    scenes_path: String,

    /// 项目 ID（用于项目级配置与排程归属）
    #[arg(long = "project", default_value = "default")]
    project_id: String,

    /// SQLite 数据库路径（默认为用户数据目录）
    #[arg(long = "db")]
    db_path: Option<String>,

    /// 只计算不保存,使用默认配置
    #[arg(long)]
    dry_run: bool,

    /// 输出指定拍摄日的分解表
    #[arg(long = "breakdown", value_name = "DAY")]
    breakdown_day: Option<u32>,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_log: bool,
}

fn read_scenes(path: &str) -> Result<Vec<Scene>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("无法读取场景文件: {}", path))?;
    let input: SceneInput =
        serde_json::from_str(&raw).with_context(|| format!("场景文件格式错误: {}", path))?;
    Ok(match input {
        SceneInput::List(scenes) => scenes,
        SceneInput::Wrapped { scenes } => scenes,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let scenes = read_scenes(&args.scenes_path)?;
    tracing::info!(path = %args.scenes_path, scenes = scenes.len(), "场景文件已读取");

    if args.dry_run {
        let orchestrator = ScheduleOrchestrator::new(SchedulerConfig::default());
        let schedule = orchestrator.generate(&scenes);
        match args.breakdown_day {
            Some(day) => {
                let breakdown = orchestrator
                    .generate_breakdown(&schedule, day)
                    .with_context(|| format!("不存在第 {} 个拍摄日", day))?;
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
            }
            None => println!("{}", serde_json::to_string_pretty(&schedule)?),
        }
        return Ok(());
    }

    let db_path = args.db_path.unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let record = state
        .schedule_api
        .create_schedule(CreateScheduleRequest {
            project_id: args.project_id,
            title: None,
            notes: None,
            scenes,
        })
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match args.breakdown_day {
        Some(day) => {
            let breakdown = state
                .schedule_api
                .generate_breakdown(&record.schedule_id, day)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&record)?),
    }

    tracing::info!(schedule_id = %record.schedule_id, db_path = %state.db_path, "排程已保存");
    Ok(())
}
