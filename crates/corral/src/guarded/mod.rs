mod account;
mod counter;
mod error;
mod interface;
mod racy;
#[cfg(test)]
mod tests;

pub use account::*;
pub use counter::*;
pub use error::*;
pub use interface::*;
pub use racy::*;
