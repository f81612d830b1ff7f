mod analysis;
mod chat;
mod profile;
mod reading;
pub mod user;

pub use analysis::*;
pub use chat::*;
pub use profile::*;
pub use reading::*;
pub use user::*;
