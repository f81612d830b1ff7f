pub mod chat;
pub mod invocation;
pub mod profile;
pub mod user;

pub use chat::*;
pub use invocation::*;
pub use profile::*;
pub use user::*;
