mod clock;
mod erased;
mod shared;
mod virtualizing_collection;

pub use clock::*;
pub use erased::*;
pub use shared::*;
pub use virtualizing_collection::*;
