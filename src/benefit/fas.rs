//! Final average salary (FAS) projection
//!
//! FAS is the mean of the member's most recent salaries, reconstructed by
//! deflating current pay backwards through the salary increase table:
//! - 4 to 9 completed years: up to 5 trailing years
//! - 10 to 49 completed years: 3 trailing years
//! - anything else: no FAS (0.0)

use log::debug;

use crate::assumptions::SalaryIncreaseRates;
use crate::error::Result;

/// Fewest completed years of service that produce a FAS
pub const MIN_COMPLETED_YEARS: usize = 4;

/// Most completed years of service that produce a FAS
pub const MAX_COMPLETED_YEARS: usize = 49;

/// Completed years at which the long-service window starts
pub const LONG_SERVICE_YEARS: usize = 10;

/// Averaging window for 4..=9 completed years
pub const SHORT_SERVICE_WINDOW: usize = 5;

/// Averaging window for 10..=49 completed years
pub const LONG_SERVICE_WINDOW: usize = 3;

/// Averaging window for a number of completed years, `None` when no FAS applies
pub fn averaging_window(completed_years: usize) -> Option<usize> {
    if !(MIN_COMPLETED_YEARS..=MAX_COMPLETED_YEARS).contains(&completed_years) {
        None
    } else if completed_years < LONG_SERVICE_YEARS {
        Some(SHORT_SERVICE_WINDOW)
    } else {
        Some(LONG_SERVICE_WINDOW)
    }
}

/// The deflated salaries that FAS averages, most recent first
///
/// With `years_ahead > 0` compensation and service are first rolled forward
/// with `comp *= 1 + rate[yos]`, one year at a time. The short-service window
/// stops early once service is exhausted, so it can hold fewer than 5 values.
/// Returns an empty vector when the member has no FAS.
pub fn averaging_terms(
    years_of_service: u32,
    current_compensation: f64,
    increase_rates: &SalaryIncreaseRates,
    years_ahead: u32,
) -> Result<Vec<f64>> {
    let mut yos = years_of_service as usize;
    let mut comp = current_compensation;

    for _ in 0..years_ahead {
        comp *= 1.0 + increase_rates.rate(yos)?;
        yos += 1;
    }

    // Completed years, not the year in progress
    let Some(mut yos) = yos.checked_sub(1) else {
        return Ok(Vec::new());
    };
    let Some(window) = averaging_window(yos) else {
        return Ok(Vec::new());
    };

    let mut terms = Vec::with_capacity(window);
    while yos > 0 && terms.len() < window {
        comp /= 1.0 + increase_rates.rate(yos - 1)?;
        terms.push(comp);
        yos -= 1;
    }

    Ok(terms)
}

/// Final average salary, 0.0 when service is outside 4..=49 completed years
///
/// The average divides by the number of salaries actually collected, which
/// for 5 years of service is 4, not 5.
pub fn compute_fas(
    years_of_service: u32,
    current_compensation: f64,
    increase_rates: &SalaryIncreaseRates,
    years_ahead: u32,
) -> Result<f64> {
    let terms = averaging_terms(
        years_of_service,
        current_compensation,
        increase_rates,
        years_ahead,
    )?;
    if terms.is_empty() {
        return Ok(0.0);
    }

    let fas = terms.iter().sum::<f64>() / terms.len() as f64;
    debug!(
        "FAS for yos={} (+{}): {} terms -> {:.2}",
        years_of_service,
        years_ahead,
        terms.len(),
        fas
    );
    Ok(fas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PensionError;
    use approx::assert_relative_eq;

    fn flat(rate: f64) -> SalaryIncreaseRates {
        SalaryIncreaseRates::flat(rate, 70)
    }

    #[test]
    fn test_short_service_returns_zero() {
        for yos in 0..=4 {
            assert_eq!(compute_fas(yos, 50_000.0, &flat(0.03), 0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_long_service_returns_zero() {
        for yos in 51..=70 {
            assert_eq!(compute_fas(yos, 50_000.0, &flat(0.03), 0).unwrap(), 0.0);
        }
        assert!(compute_fas(50, 50_000.0, &flat(0.03), 0).unwrap() > 0.0);
    }

    #[test]
    fn test_five_years_truncated_to_four_terms() {
        let terms = averaging_terms(5, 50_000.0, &flat(0.03), 0).unwrap();
        assert_eq!(terms.len(), 4);

        let expected = (1..=4).map(|k| 50_000.0 / 1.03_f64.powi(k)).sum::<f64>() / 4.0;
        assert_relative_eq!(
            compute_fas(5, 50_000.0, &flat(0.03), 0).unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_window_sizes() {
        for yos in 6..=10 {
            let terms = averaging_terms(yos, 60_000.0, &flat(0.02), 0).unwrap();
            assert_eq!(terms.len(), 5, "yos={yos}");
        }
        for yos in 11..=50 {
            let terms = averaging_terms(yos, 60_000.0, &flat(0.02), 0).unwrap();
            assert_eq!(terms.len(), 3, "yos={yos}");
        }
    }

    #[test]
    fn test_three_year_window_divides_by_three() {
        let fas = compute_fas(12, 80_000.0, &flat(0.02), 0).unwrap();
        let first = 80_000.0 / 1.02;
        let second = first / 1.02;
        let third = second / 1.02;
        assert_relative_eq!(fas, (first + second + third) / 3.0, max_relative = 1e-12);
        // A 4-term divisor would land well below the 3-term mean
        assert!(fas > (first + second + third) / 4.0 * 1.2);
    }

    #[test]
    fn test_uses_rates_at_completed_year_indices() {
        // yos=11 -> completed 10, deflates with rate[9], rate[8], rate[7]
        let mut rates = vec![0.0; 70];
        rates[9] = 0.10;
        rates[8] = 0.05;
        rates[7] = 0.02;
        let terms = averaging_terms(11, 100_000.0, &SalaryIncreaseRates::new(rates), 0).unwrap();
        assert_relative_eq!(terms[0], 100_000.0 / 1.10, max_relative = 1e-12);
        assert_relative_eq!(terms[1], 100_000.0 / 1.10 / 1.05, max_relative = 1e-12);
        assert_relative_eq!(terms[2], 100_000.0 / 1.10 / 1.05 / 1.02, max_relative = 1e-12);
    }

    #[test]
    fn test_years_ahead_projects_forward_first() {
        // yos=4 has no FAS today, but one year ahead it does
        assert_eq!(compute_fas(4, 50_000.0, &flat(0.03), 0).unwrap(), 0.0);
        let next = compute_fas(4, 50_000.0, &flat(0.03), 1).unwrap();
        assert_relative_eq!(
            next,
            compute_fas(5, 50_000.0 * 1.03, &flat(0.03), 0).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_projection_past_table_end_fails() {
        let err = compute_fas(3, 50_000.0, &SalaryIncreaseRates::flat(0.03, 3), 1).unwrap_err();
        assert!(matches!(
            err,
            PensionError::RateIndexOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn test_short_rate_table_fails_during_deflation() {
        let err = compute_fas(12, 50_000.0, &SalaryIncreaseRates::flat(0.03, 5), 0).unwrap_err();
        assert!(matches!(err, PensionError::RateIndexOutOfRange { index: 10, .. }));
    }

    #[test]
    fn test_averaging_window() {
        assert_eq!(averaging_window(3), None);
        assert_eq!(averaging_window(4), Some(5));
        assert_eq!(averaging_window(9), Some(5));
        assert_eq!(averaging_window(10), Some(3));
        assert_eq!(averaging_window(49), Some(3));
        assert_eq!(averaging_window(50), None);
    }
}
