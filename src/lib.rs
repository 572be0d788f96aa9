// Library surface for the CLI and integration tests.
pub mod aggregate;
pub mod analytics;
pub mod app_dirs;
pub mod error;
pub mod report;
pub mod runtime;
pub mod settings;
pub mod store;
pub mod summary;
pub mod throws;
pub mod tracker;
pub mod util;

pub use error::{SettingsError, StoreError};
pub use store::{SessionStore, SortOrder, SqliteSessionStore};
pub use summary::{SessionId, SessionSummary};
pub use throws::{Outcome, Round, Throw};
pub use tracker::{SessionState, SessionTracker, TrackerEvent};
