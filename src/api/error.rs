// ==========================================
// 影视拍摄排程系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/配置错误为用户可读的错误消息
// 约束: 内部错误在 release 构建中只对外暴露通用文案
// ==========================================

use crate::config::ConfigError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// release 构建中内部错误的对外文案
pub const GENERIC_INTERNAL_MESSAGE: &str = "内部错误，请稍后重试";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(#[from] ConfigError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 对外展示的错误文案
    ///
    /// 数据库与内部错误在 release 构建中替换为通用文案,详细信息只进日志。
    pub fn user_message(&self) -> String {
        match self {
            ApiError::DatabaseError(_) | ApiError::InternalError(_) if !cfg!(debug_assertions) => {
                GENERIC_INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => {
                ApiError::InternalError(format!("排程数据损坏: {}", msg))
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Schedule".to_string(),
            id: "S001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Schedule"));
                assert!(msg.contains("S001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::UniqueConstraintViolation("dup".into()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_config_error_conversion() {
        let api_err: ApiError = ConfigError::InvalidValue {
            key: "duration_ratio".into(),
            message: "必须大于 0".into(),
        }
        .into();
        assert!(matches!(api_err, ApiError::ConfigError(_)));
        assert!(api_err.user_message().contains("duration_ratio"));
    }

    #[test]
    fn test_user_message_for_internal_errors() {
        let err = ApiError::InternalError("mutex poisoned".into());
        if cfg!(debug_assertions) {
            assert!(err.user_message().contains("mutex poisoned"));
        } else {
            assert_eq!(err.user_message(), GENERIC_INTERNAL_MESSAGE);
        }
        let err = ApiError::NotFound("Day 3".into());
        assert!(err.user_message().contains("Day 3"));
    }
}
