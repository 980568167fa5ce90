// ==========================================
// 影视拍摄排程系统 - 排程数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: 一行一个排程,排程主体为 JSON 载荷（整体原子写入）
// 删除: 软删除 (deleted_at),查询默认排除已删除记录
// ==========================================

use crate::domain::schedule::{GeneratedSchedule, ScheduleRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"SELECT schedule_id, project_id, title, notes,
                      payload_json, config_snapshot_json,
                      created_at, updated_at, deleted_at
               FROM schedule"#;

// ==========================================
// ScheduleRepository - 排程仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的ScheduleRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建排程
    ///
    /// # 返回
    /// - `Ok(schedule_id)`: 成功
    /// - `Err`: 失败（重复 ID 返回 UniqueConstraintViolation）
    pub fn create(&self, record: &ScheduleRecord) -> RepositoryResult<String> {
        let payload = serde_json::to_string(&record.schedule)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO schedule (
                schedule_id, project_id, title, notes,
                payload_json, config_snapshot_json,
                total_days, total_scenes, total_duration, incomplete,
                created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)"#,
            params![
                &record.schedule_id,
                &record.project_id,
                &record.title,
                &record.notes,
                &payload,
                &record.config_snapshot,
                record.schedule.total_days,
                record.schedule.total_scenes,
                record.schedule.total_duration,
                record.schedule.incomplete,
                &record.created_at.to_rfc3339(),
                &record.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(record.schedule_id.clone())
    }

    /// 按schedule_id查询排程（不含已删除）
    ///
    /// # 返回
    /// - `Ok(Some(ScheduleRecord))`: 找到
    /// - `Ok(None)`: 不存在或已删除
    /// - `Err`: 数据库错误
    pub fn find_by_id(&self, schedule_id: &str) -> RepositoryResult<Option<ScheduleRecord>> {
        let conn = self.get_conn()?;

        let sql = format!("{} WHERE schedule_id = ? AND deleted_at IS NULL", SELECT_COLUMNS);
        match conn.query_row(&sql, params![schedule_id], |row| self.map_row(row)) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询项目下的排程（不含已删除）
    ///
    /// # 返回
    /// 按 created_at 降序
    pub fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<ScheduleRecord>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "{} WHERE project_id = ? AND deleted_at IS NULL ORDER BY created_at DESC, schedule_id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![project_id], |row| self.map_row(row))?
            .collect::<Result<Vec<ScheduleRecord>, _>>()?;

        Ok(records)
    }

    /// 整体更新排程（标题/备注/载荷/汇总字段）
    ///
    /// # 返回
    /// - `Ok(())`: 更新成功
    /// - `Err(NotFound)`: 不存在或已删除
    pub fn update(&self, record: &ScheduleRecord) -> RepositoryResult<()> {
        let payload = serde_json::to_string(&record.schedule)?;
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"UPDATE schedule SET
                title = ?, notes = ?, payload_json = ?,
                total_days = ?, total_scenes = ?, total_duration = ?, incomplete = ?,
                updated_at = ?
            WHERE schedule_id = ? AND deleted_at IS NULL"#,
            params![
                &record.title,
                &record.notes,
                &payload,
                record.schedule.total_days,
                record.schedule.total_scenes,
                record.schedule.total_duration,
                record.schedule.incomplete,
                &record.updated_at.to_rfc3339(),
                &record.schedule_id,
            ],
        )?;

        if affected == 0 {
            return Err(not_found(&record.schedule_id));
        }
        Ok(())
    }

    /// 软删除
    ///
    /// # 返回
    /// - `Err(NotFound)`: 不存在或已删除
    pub fn soft_delete(&self, schedule_id: &str, deleted_at: DateTime<Utc>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "UPDATE schedule SET deleted_at = ?, updated_at = ? WHERE schedule_id = ? AND deleted_at IS NULL",
            params![&deleted_at.to_rfc3339(), &deleted_at.to_rfc3339(), schedule_id],
        )?;

        if affected == 0 {
            return Err(not_found(schedule_id));
        }
        Ok(())
    }

    /// 映射数据库行到ScheduleRecord
    fn map_row(&self, row: &rusqlite::Row) -> rusqlite::Result<ScheduleRecord> {
        let payload: String = row.get(4)?;
        let schedule: GeneratedSchedule = serde_json::from_str(&payload).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let deleted_at = match row.get::<_, Option<String>>(8)? {
            Some(raw) => Some(parse_timestamp(8, &raw)?),
            None => None,
        };

        Ok(ScheduleRecord {
            schedule_id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            notes: row.get(3)?,
            schedule,
            config_snapshot: row.get(5)?,
            created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
            updated_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
            deleted_at,
        })
    }
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn not_found(schedule_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Schedule".to_string(),
        id: schedule_id.to_string(),
    }
}
