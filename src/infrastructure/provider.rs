use crate::domain::invoice::{Currency, CustomerId, Invoice};
use crate::domain::ports::PaymentProvider;
use crate::error::ProviderError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedProviderConfig {
    /// Probability that a charge is declined.
    pub reject_rate: f64,
    /// Probability that a charge fails with a network error.
    pub failure_rate: f64,
    /// Delay before every answer.
    pub latency: Duration,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Customers the provider has no account for.
    pub unknown_customers: HashSet<CustomerId>,
    /// Account currency per customer. Customers not listed accept any currency.
    pub customer_currencies: HashMap<CustomerId, Currency>,
}

impl Default for SimulatedProviderConfig {
    fn default() -> Self {
        Self {
            reject_rate: 0.0,
            failure_rate: 0.0,
            latency: Duration::ZERO,
            seed: None,
            unknown_customers: HashSet::new(),
            customer_currencies: HashMap::new(),
        }
    }
}

/// Payment provider stand-in that accepts, declines or fails at configured rates.
///
/// Unknown customers and currency mismatches fail before any roll is made.
pub struct SimulatedPaymentProvider {
    config: SimulatedProviderConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedPaymentProvider {
    pub fn new(config: SimulatedProviderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.r#gen(),
            Err(poisoned) => poisoned.into_inner().r#gen(),
        }
    }
}

#[async_trait]
impl PaymentProvider for SimulatedPaymentProvider {
    async fn charge(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if self.config.unknown_customers.contains(&invoice.customer) {
            return Err(ProviderError::CustomerNotFound(invoice.customer));
        }
        if let Some(&currency) = self.config.customer_currencies.get(&invoice.customer)
            && currency != invoice.amount.currency
        {
            return Err(ProviderError::CurrencyMismatch {
                invoice: invoice.id,
                customer: invoice.customer,
            });
        }

        let roll = self.roll();
        if roll < self.config.failure_rate {
            return Err(ProviderError::Network(format!(
                "connection reset while charging invoice {}",
                invoice.id
            )));
        }
        Ok(roll >= self.config.failure_rate + self.config.reject_rate)
    }
}
