mod data_provider;
mod user_provider;
mod user_search_provider;

pub use data_provider::*;
pub use user_provider::*;
pub use user_search_provider::*;
