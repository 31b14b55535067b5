//! Quaver // Commands
//!
//! One module per text command.

pub mod help;
pub mod pause;
pub mod play;
pub mod queue;
pub mod resume;
pub mod skip;
pub mod stop;
