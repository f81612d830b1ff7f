pub mod add;
pub mod delete;

pub use add::*;
