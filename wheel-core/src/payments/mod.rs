//! Payments - PromptPay 支付记录与异步校验

mod service;
mod verifier;

pub use service::{PaymentService, PaymentTicket};
pub use verifier::{PaymentVerifier, SimulatedVerifier};
