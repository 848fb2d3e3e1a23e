mod settings;
mod store;

pub use settings::{LoggingConfig, Settings, StorageConfig};
pub use store::{SessionStoreConfig, DEFAULT_MAX_SESSIONS};
