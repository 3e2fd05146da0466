//! Feedback host module.
//!
//! Lets an external renderer delegate answer evaluation and fragment
//! navigation over WebSocket.

mod server;
mod state;

pub use server::{SharedState, run, serve};
pub use state::{LearnerSession, ServerState};
