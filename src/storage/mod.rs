mod user;
mod user_table;

pub use user::*;
pub use user_table::*;
