// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试场景构造等功能
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use shoot_schedule::db::{init_schema, open_sqlite_connection};
use shoot_schedule::domain::scene::{
    CameraSetup, CastMember, CrewMember, Location, NominalDuration, Scene,
};
use shoot_schedule::domain::types::Department;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库的共享连接
pub fn shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).unwrap();
    Arc::new(Mutex::new(conn))
}

// ==========================================
// SceneBuilder - 测试场景构造器
// ==========================================
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    pub fn new(id: &str, scene_number: i32) -> Self {
        Self {
            scene: Scene {
                id: id.to_string(),
                scene_number,
                title: None,
                description: None,
                location: None,
                time_of_day: None,
                cast: vec![],
                nominal_duration: None,
                equipment: BTreeMap::new(),
                crew: BTreeMap::new(),
                props: vec![],
                costumes: vec![],
                cameras: vec![],
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.scene.title = Some(title.to_string());
        self
    }

    pub fn location(mut self, name: &str) -> Self {
        self.scene.location = Some(Location {
            name: name.to_string(),
            group_name: None,
        });
        self
    }

    pub fn location_in_group(mut self, name: &str, group: &str) -> Self {
        self.scene.location = Some(Location {
            name: name.to_string(),
            group_name: Some(group.to_string()),
        });
        self
    }

    pub fn time_of_day(mut self, tod: &str) -> Self {
        self.scene.time_of_day = Some(tod.to_string());
        self
    }

    /// 内容时长（分钟,数字）
    pub fn minutes(mut self, minutes: f64) -> Self {
        self.scene.nominal_duration = Some(NominalDuration::Number(minutes));
        self
    }

    /// 内容时长（自由文本,如 "5분"）
    pub fn duration_text(mut self, text: &str) -> Self {
        self.scene.nominal_duration = Some(NominalDuration::Text(text.to_string()));
        self
    }

    pub fn actor(mut self, name: &str, role: &str) -> Self {
        self.scene.cast.push(CastMember {
            role: role.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn equipment(mut self, dept: Department, item: &str) -> Self {
        self.scene
            .equipment
            .entry(dept)
            .or_default()
            .push(item.to_string());
        self
    }

    pub fn crew(mut self, dept: Department, name: &str, role: &str) -> Self {
        self.scene.crew.entry(dept).or_default().push(CrewMember {
            name: name.to_string(),
            role: role.to_string(),
        });
        self
    }

    pub fn prop(mut self, prop: &str) -> Self {
        self.scene.props.push(prop.to_string());
        self
    }

    pub fn costume(mut self, costume: &str) -> Self {
        self.scene.costumes.push(costume.to_string());
        self
    }

    pub fn camera(mut self, model: &str, lens: &str) -> Self {
        self.scene.cameras.push(CameraSetup {
            model: model.to_string(),
            lens: lens.to_string(),
        });
        self
    }

    pub fn build(self) -> Scene {
        self.scene
    }
}

/// 混合地点/时段的场景集（用于流程测试）
pub fn mixed_scenes(count: i32) -> Vec<Scene> {
    const LOCATIONS: [&str; 4] = ["Studio A", "City Park", "Hospital", "Rooftop"];
    const TIMES: [&str; 5] = ["DAY", "NIGHT", "오후", "새벽", ""];
    const ACTORS: [&str; 3] = ["Kim", "Lee", "Park"];

    (1..=count)
        .map(|i| {
            let idx = i as usize;
            SceneBuilder::new(&format!("scene-{:03}", i), i)
                .location(LOCATIONS[idx % LOCATIONS.len()])
                .time_of_day(TIMES[idx % TIMES.len()])
                .minutes(((idx % 4) + 2) as f64)
                .actor(ACTORS[idx % ACTORS.len()], "lead")
                .actor(ACTORS[(idx + 1) % ACTORS.len()], "support")
                .equipment(Department::Lighting, if idx % 2 == 0 { "HMI" } else { "LED" })
                .build()
        })
        .collect()
}
