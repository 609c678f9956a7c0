pub mod backend;
pub mod config;
pub mod error;
pub mod exchange;
pub mod layout;
pub mod message;
pub mod render;
pub mod session;
pub mod transcript;

// Re-export common types
pub use backend::ChatBackend;
pub use config::{ClientConfig, InFlightPolicy};
pub use error::{Result, SymptomixError};
pub use exchange::ExchangeState;
pub use layout::LayoutState;
pub use message::{OutgoingMessage, Reply};
pub use session::{SessionContext, SessionId};
pub use transcript::{ERROR_NOTICE, EntryId, EntryKind, Transcript, TranscriptEntry};
