//! Monthly fee quoting: sessions in the month times the per-session rate.

use crate::domain::calendar::count_weekday_in_month;
use crate::domain::entities::{BillingPeriod, FeeQuote};
use crate::domain::errors::FeeError;
use chrono::Weekday;
use rust_decimal::{Decimal, RoundingStrategy};

/// Minor-unit precision of quoted totals.
const CURRENCY_DP: u32 = 2;

/// Pure fee calculator. No state, no I/O; the rate is passed in per call.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Quotes the fee for a class held every `weekday` during `period`.
    ///
    /// `session_count` is the number of dates in the month falling on `weekday`;
    /// `total_fee` is `session_count * fee_per_session` rounded half away from
    /// zero to 2 decimal places.
    ///
    /// # Errors
    /// `InvalidPeriod` when the month is outside 1..=12 (or the year is before 1),
    /// `InvalidRate` when the rate is negative.
    pub fn quote(
        period: BillingPeriod,
        weekday: Weekday,
        fee_per_session: Decimal,
    ) -> Result<FeeQuote, FeeError> {
        let session_count = count_weekday_in_month(period.year, period.month, weekday)?;
        if fee_per_session < Decimal::ZERO {
            return Err(FeeError::InvalidRate(fee_per_session));
        }
        let total_fee = Decimal::from(session_count)
            .checked_mul(fee_per_session)
            .ok_or(FeeError::InvalidRate(fee_per_session))?
            .round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero);
        Ok(FeeQuote {
            session_count,
            fee_per_session,
            total_fee,
        })
    }
}
