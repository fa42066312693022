pub mod payment_gate;

pub use payment_gate::{payment_gate_layer, PaymentGate, PAYMENT_HEADER};
