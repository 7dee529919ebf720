pub mod base;
pub mod board;
pub mod messages;
pub mod participant;

pub use crate::commands::prize::formatters::base::ParticipantFormatter;
pub use crate::commands::prize::formatters::participant::DefaultParticipantFormatter;
