//! Fee settings: read the current rate, change it for future quotes.

use crate::domain::{DomainError, FeeError, FeeSettings};
use crate::ports::SettingsPort;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub struct SettingsService {
    settings: Arc<dyn SettingsPort>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingsPort>) -> Self {
        Self { settings }
    }

    pub async fn current(&self) -> Result<FeeSettings, DomainError> {
        self.settings.current_settings().await
    }

    /// Set a new per-session rate, keeping the reference year. Existing
    /// registrations keep the fee they were quoted.
    pub async fn update_fee(&self, fee_per_session: Decimal) -> Result<FeeSettings, DomainError> {
        if fee_per_session < Decimal::ZERO {
            return Err(FeeError::InvalidRate(fee_per_session).into());
        }
        let current = self.settings.current_settings().await?;
        let updated = FeeSettings {
            fee_per_session,
            ..current
        };
        self.settings.save_settings(updated).await?;
        info!(
            year = updated.year,
            old = %current.fee_per_session,
            new = %fee_per_session,
            "fee per session updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_repo::MemoryRepo;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn update_keeps_year_and_rejects_negative() {
        let repo = Arc::new(MemoryRepo::new(FeeSettings {
            year: 2023,
            fee_per_session: dec!(50.00),
        }));
        let svc = SettingsService::new(repo);

        let updated = svc.update_fee(dec!(65.25)).await.unwrap();
        assert_eq!(updated.year, 2023);
        assert_eq!(svc.current().await.unwrap().fee_per_session, dec!(65.25));

        assert!(matches!(
            svc.update_fee(dec!(-0.01)).await,
            Err(DomainError::Fee(FeeError::InvalidRate(_)))
        ));
        assert_eq!(svc.current().await.unwrap().fee_per_session, dec!(65.25));

        assert_eq!(svc.update_fee(Decimal::ZERO).await.unwrap().fee_per_session, Decimal::ZERO);
    }
}
