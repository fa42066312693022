use crate::models::{TransferRecord, SOLANA_KEY};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyViolation {
    #[error("Transaction is not a payment-asset transfer")]
    NotPaymentAsset,

    #[error("Transfer amount is missing or malformed")]
    MissingAmount,

    #[error("Insufficient payment: {actual} < {required}")]
    InsufficientAmount { actual: Decimal, required: Decimal },

    #[error("Payment sent to wrong address: {0}")]
    WrongReceiver(String),

    #[error("Transfer receiver is unknown")]
    MissingReceiver,
}

/// Business rules a verified transfer must satisfy before it counts as payment.
#[derive(Debug, Clone)]
pub struct PaymentPolicy {
    required_amount: Decimal,
    evm_receiver: String,
    solana_receiver: Option<String>,
}

impl PaymentPolicy {
    pub fn new(
        required_amount: Decimal,
        evm_receiver: impl Into<String>,
        solana_receiver: Option<String>,
    ) -> Self {
        Self {
            required_amount,
            evm_receiver: evm_receiver.into(),
            solana_receiver,
        }
    }

    pub fn required_amount(&self) -> Decimal {
        self.required_amount
    }

    pub fn evm_receiver(&self) -> &str {
        &self.evm_receiver
    }

    pub fn solana_receiver(&self) -> Option<&str> {
        self.solana_receiver.as_deref()
    }

    fn receiver_for(&self, chain: Option<&str>) -> Option<&str> {
        match chain {
            Some(SOLANA_KEY) => self.solana_receiver.as_deref(),
            Some(_) => Some(&self.evm_receiver),
            None => None,
        }
    }

    pub fn accept(&self, record: &TransferRecord) -> bool {
        self.evaluate(record).is_ok()
    }

    /// Check both rules, reporting the first one that fails.
    pub fn evaluate(&self, record: &TransferRecord) -> Result<(), PolicyViolation> {
        if !record.is_payment_asset {
            return Err(PolicyViolation::NotPaymentAsset);
        }

        let actual = record
            .amount
            .as_deref()
            .and_then(|amount| Decimal::from_str(amount).ok())
            .filter(|amount| !amount.is_sign_negative())
            .ok_or(PolicyViolation::MissingAmount)?;

        if actual < self.required_amount {
            return Err(PolicyViolation::InsufficientAmount {
                actual,
                required: self.required_amount,
            });
        }

        let receiver = record
            .receiver_address
            .as_deref()
            .ok_or(PolicyViolation::MissingReceiver)?;

        match self.receiver_for(record.blockchain.as_deref()) {
            Some(required) if required.to_lowercase() == receiver.to_lowercase() => Ok(()),
            _ => Err(PolicyViolation::WrongReceiver(receiver.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVM_WALLET: &str = "0xAbCdEf0000000000000000000000000000000001";
    const SOL_WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn policy() -> PaymentPolicy {
        PaymentPolicy::new(Decimal::from(3), EVM_WALLET, Some(SOL_WALLET.to_string()))
    }

    fn payment(chain: &str, to: &str, amount: &str) -> TransferRecord {
        TransferRecord::payment(chain, to.to_string(), amount.to_string())
    }

    #[test]
    fn accepts_exact_amount_case_insensitively() {
        let record = payment("base", &EVM_WALLET.to_lowercase(), "3.0");
        assert!(policy().accept(&record));
    }

    #[test]
    fn accepts_solana_payment_to_solana_wallet() {
        assert!(policy().accept(&payment(SOLANA_KEY, SOL_WALLET, "3.000000")));
    }

    #[test]
    fn receiver_must_match_family() {
        // The EVM wallet does not receive Solana payments and vice versa.
        assert_eq!(
            policy().evaluate(&payment(SOLANA_KEY, EVM_WALLET, "5")),
            Err(PolicyViolation::WrongReceiver(EVM_WALLET.to_string()))
        );
        assert!(!policy().accept(&payment("scroll", SOL_WALLET, "5")));
    }

    #[test]
    fn rejects_wrong_receiver() {
        let record = payment("base", "0x2222222222222222222222222222222222222222", "10.0");
        assert!(matches!(
            policy().evaluate(&record),
            Err(PolicyViolation::WrongReceiver(_))
        ));
    }

    #[test]
    fn rejects_underpayment() {
        assert_eq!(
            policy().evaluate(&payment("base", EVM_WALLET, "2.999999")),
            Err(PolicyViolation::InsufficientAmount {
                actual: Decimal::from_str("2.999999").unwrap(),
                required: Decimal::from(3),
            })
        );
    }

    #[test]
    fn non_payment_and_missing_fields_are_rejections() {
        let policy = policy();
        assert_eq!(
            policy.evaluate(&TransferRecord::other("base", Some(EVM_WALLET.to_string()))),
            Err(PolicyViolation::NotPaymentAsset)
        );

        let mut no_amount = payment("base", EVM_WALLET, "3.0");
        no_amount.amount = None;
        assert_eq!(policy.evaluate(&no_amount), Err(PolicyViolation::MissingAmount));

        let mut garbage = payment("base", EVM_WALLET, "three");
        assert_eq!(policy.evaluate(&garbage), Err(PolicyViolation::MissingAmount));
        garbage.amount = Some("-5".to_string());
        assert_eq!(policy.evaluate(&garbage), Err(PolicyViolation::MissingAmount));

        let mut no_receiver = payment("base", EVM_WALLET, "3.0");
        no_receiver.receiver_address = None;
        assert_eq!(policy.evaluate(&no_receiver), Err(PolicyViolation::MissingReceiver));
    }

    #[test]
    fn solana_disabled_rejects_solana_records() {
        let policy = PaymentPolicy::new(Decimal::from(3), EVM_WALLET, None);
        assert!(!policy.accept(&payment(SOLANA_KEY, SOL_WALLET, "3.000000")));
    }
}
