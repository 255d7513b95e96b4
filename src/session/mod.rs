pub mod pointer;
pub mod store;
pub mod tracker;
pub mod types;

pub use pointer::*;
pub use store::*;
pub use tracker::*;
pub use types::*;
