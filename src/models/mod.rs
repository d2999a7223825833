pub mod result;
pub mod source;

pub use result::*;
pub use source::*;
