//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`automation`] - Starting, cancelling and inspecting outreach runs
//! - [`directory`] - Search, connect and remove against the lead directory
//! - [`system`] - Health and the event stream

mod automation;
mod directory;
mod system;

pub use automation::*;
pub use directory::*;
pub use system::*;
