//! MET-based energy expenditure estimation.
//!
//! Uses the standard compendium formula: kcal = MET x body mass (kg) x hours.
//! MET coefficients are reference data supplied by the activity catalog; this
//! module only evaluates the formula.

/// Estimate calories burned for an activity.
///
/// The same function serves live display during a session and the final
/// computation at finalization, so the two can never disagree.
///
/// # Example
/// ```
/// use tracemeter::estimate_calories;
/// // Running (MET 9.8) at 80 kg for half an hour
/// assert_eq!(estimate_calories(9.8, 80.0, 1800), 392);
/// ```
pub fn estimate_calories(met_coefficient: f64, body_mass_kg: f64, elapsed_seconds: u64) -> u32 {
    let hours = elapsed_seconds as f64 / 3600.0;
    (met_coefficient * body_mass_kg * hours).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_hour_run() {
        assert_eq!(estimate_calories(9.8, 80.0, 1800), 392);
    }

    #[test]
    fn test_zero_elapsed() {
        assert_eq!(estimate_calories(9.8, 80.0, 0), 0);
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 3.5 * 70 * (600/3600) = 40.833... -> 41
        assert_eq!(estimate_calories(3.5, 70.0, 600), 41);
        // 3.5 * 70 * (60/3600) = 4.083... -> 4
        assert_eq!(estimate_calories(3.5, 70.0, 60), 4);
    }
}
