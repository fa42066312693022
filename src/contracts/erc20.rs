use ethers::{
    abi::AbiDecode,
    prelude::*,
    types::{Address, U256},
};

// Only the call we need to recognise; the selector check comes with the generated decoder.
abigen!(
    IERC20,
    r#"[
        function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

/// Decode `transfer(address,uint256)` call data.
///
/// Returns `None` for anything else: another selector, truncated arguments or
/// garbage. Callers treat `None` as "not a payment-asset transfer".
pub fn decode_transfer(input: &[u8]) -> Option<(Address, U256)> {
    TransferCall::decode(input)
        .ok()
        .map(|call| (call.to, call.amount))
}

/// Render a raw token amount in human units.
///
/// Trailing zeros are trimmed but at least one fractional digit is kept, so
/// `3_000_000` at 6 decimals is `"3.0"` and `1` at 6 decimals is `"0.000001"`.
pub fn format_amount(amount: U256, decimals: u8) -> Option<String> {
    let base = U256::from(10u8).checked_pow(U256::from(decimals))?;
    let (whole, frac) = amount.div_mod(base);

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let frac = frac.trim_end_matches('0');

    Some(format!(
        "{}.{}",
        whole,
        if frac.is_empty() { "0" } else { frac }
    ))
}
