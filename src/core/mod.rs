//! Core module - fundamental types and the lab service

pub mod backup;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod documents;
pub mod entity;
pub mod error;
pub mod identity;
pub mod lab;
pub mod notify;
pub mod project;
pub mod shortid;
pub mod storage;

pub use backup::{BackupDocument, LabData};
pub use clock::{Calendar, Clock};
pub use config::Config;
pub use dashboard::{Dashboard, UrgentOrder};
pub use entity::Entity;
pub use error::LabError;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use lab::Lab;
pub use notify::{ConsoleNotifier, Notice, NoticeKind, NoticeLog, Notifier};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
pub use storage::{CollectionKey, JsonDirStore, MemoryStore, Storage, StorageError};
