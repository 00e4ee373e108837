//! Navigation continuity between a postback-driven UI layer and a stateless
//! request handler.
//!
//! ```text
//! postback → restore view state → resolve outcome → resolve destination
//!          → bookmarkable URL (redirect) | write view state (render)
//! ```

pub mod config;
pub mod context;
pub mod model;
pub mod navigation;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod url;
pub mod view;
