pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod facts;
pub mod health;
pub mod rotation;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{HttpTransport, Transport};
pub use config::Config;
pub use error::TransportError;
pub use rotation::{QuickReply, RotationWindow};
pub use session::Session;
pub use state::{ChatMessage, ChatRole, SessionState};
