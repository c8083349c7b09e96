pub mod backup;
pub mod cli;
pub mod drift;
pub mod error;
pub mod profile;
pub mod session;
pub mod settings;
pub mod store;

pub use backup::{BackupFile, BackupPayload};
pub use drift::DriftTimer;
pub use error::{BackupError, EngineError, StoreError};
pub use session::{ChannelSource, PlayerInput, PracticeSummary, ReactionSource, Session, StopHandle};
pub use settings::Settings;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
