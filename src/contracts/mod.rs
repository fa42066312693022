pub mod erc20;

pub use erc20::{decode_transfer, format_amount};
