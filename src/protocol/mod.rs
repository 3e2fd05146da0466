mod messages;

pub use messages::{ClientMessage, SectionOutline, ServerMessage, outline};
