pub mod chain;
pub mod response;
pub mod transfer;

pub use chain::*;
pub use response::*;
pub use transfer::*;
