use aim_core::MatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("decryption failed: wrong password or corrupted file")]
    Decryption,
    #[error("backup is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("backup field is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("unsupported backup version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Backup(#[from] BackupError),
}
