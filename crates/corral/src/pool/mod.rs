mod config;
mod fan_in;
mod manager;
mod report;
mod worker;

pub use config::*;
pub use fan_in::*;
pub use manager::*;
pub use report::*;
pub use worker::WorkerId;
