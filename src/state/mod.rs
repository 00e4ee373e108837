//! Session-bound view state.
//!
//! The view rendered for a request is written into the page as an encrypted
//! token and read back on the next postback. Tokens are sealed with a key
//! that belongs to one session only.

mod error;
mod key;
mod protocol;
mod session;

pub use error::ViewStateError;
pub use key::{SessionKey, SessionKeyStore, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
pub use protocol::{RenderArtifact, RequestParameters, ViewStateProtocol, VIEW_STATE_FIELD};
pub use session::SessionId;
