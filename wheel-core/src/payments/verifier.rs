use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;

/// Checks a PromptPay reference with the (simulated) gateway
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// `true` when the transfer was received
    async fn verify(&self, reference: &str, amount: f64) -> bool;
}

/// Gateway stand-in: waits `delay`, then answers `approve`
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    delay: Duration,
    approve: bool,
}

impl SimulatedVerifier {
    pub fn new(delay: Duration, approve: bool) -> Self {
        Self { delay, approve }
    }

    pub fn approving(delay: Duration) -> Self {
        Self::new(delay, true)
    }

    pub fn declining(delay: Duration) -> Self {
        Self::new(delay, false)
    }

    /// Approving verifier with `PAYMENT_VERIFY_DELAY_MS`
    pub fn from_config(config: &Config) -> Self {
        Self::approving(Duration::from_millis(config.payment_verify_delay_ms))
    }
}

#[async_trait]
impl PaymentVerifier for SimulatedVerifier {
    async fn verify(&self, reference: &str, amount: f64) -> bool {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(reference = %reference, amount, approved = self.approve, "Payment verified");
        self.approve
    }
}
