pub mod markup;
pub mod normalize;

pub use markup::*;
pub use normalize::*;
