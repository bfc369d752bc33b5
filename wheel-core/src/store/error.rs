use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 存储错误 → 统一错误码
fn classify_store_error(e: &StoreError) -> ErrorCode {
    match e {
        StoreError::Serialization(_) => return ErrorCode::StorageCorrupted,
        StoreError::Unavailable(_) => return ErrorCode::StorageUnavailable,
        _ => {}
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::StorageUnavailable
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = classify_store_error(&err);
        tracing::error!(error = %err, error_code = ?code, "Storage error occurred");
        AppError::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorKind;

    #[test]
    fn test_unavailable_maps_to_storage_kind() {
        let err: AppError = StoreError::Unavailable("quota exceeded".into()).into();
        assert_eq!(err.code, ErrorCode::StorageUnavailable);
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn test_serialization_maps_to_corrupted() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: AppError = StoreError::from(json_err).into();
        assert_eq!(err.code, ErrorCode::StorageCorrupted);
    }
}
