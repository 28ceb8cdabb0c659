mod bounded;
mod sink;

pub use bounded::*;
pub use sink::*;
