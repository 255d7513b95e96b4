pub mod storage;
pub mod types;

pub use types::*;
