pub mod base;
pub mod uniform;

pub use crate::commands::prize::strategies::base::DrawStrategy;
pub use crate::commands::prize::strategies::uniform::UniformDrawStrategy;
