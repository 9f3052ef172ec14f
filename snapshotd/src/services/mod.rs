pub mod alert;
pub mod daemon;
pub mod snapshot_service;

pub use alert::AlertService;
pub use daemon::DaemonService;
pub use snapshot_service::SnapshotService;
