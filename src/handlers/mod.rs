pub mod chains;
pub mod health;
pub mod payments;
pub mod stats;

pub use chains::*;
pub use health::*;
pub use payments::*;
pub use stats::*;
