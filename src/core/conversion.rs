use super::types::Frequency;

pub const DAYS_PER_MONTH: f64 = 30.0;
/// Average weeks in a month.
pub const WEEKS_PER_MONTH: f64 = 4.33;

pub fn daily_to_monthly(amount: f64) -> f64 {
    amount * DAYS_PER_MONTH
}

pub fn weekly_to_monthly(amount: f64) -> f64 {
    amount * WEEKS_PER_MONTH
}

pub fn to_monthly(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Daily => daily_to_monthly(amount),
        Frequency::Weekly => weekly_to_monthly(amount),
        Frequency::Monthly => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn converts_each_frequency() {
        assert_eq!(to_monthly(100.0, Frequency::Daily), 3_000.0);
        assert_eq!(to_monthly(100.0, Frequency::Weekly), 433.0);
        assert_eq!(to_monthly(100.0, Frequency::Monthly), 100.0);
    }

    #[test]
    fn frequency_label_is_case_insensitive_with_monthly_fallback() {
        assert_eq!(Frequency::from_label("DAILY"), Frequency::Daily);
        assert_eq!(Frequency::from_label(" Weekly "), Frequency::Weekly);
        assert_eq!(Frequency::from_label("monthly"), Frequency::Monthly);
        assert_eq!(Frequency::from_label("fortnightly"), Frequency::Monthly);
        assert_eq!(Frequency::from_label(""), Frequency::Monthly);
    }

    #[test]
    fn zero_converts_to_zero() {
        assert_eq!(daily_to_monthly(0.0), 0.0);
        assert_eq!(weekly_to_monthly(0.0), 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_conversion_matches_fixed_multipliers(cents in 0u64..100_000_000) {
            let amount = cents as f64 / 100.0;
            prop_assert_eq!(to_monthly(amount, Frequency::Daily), amount * 30.0);
            prop_assert_eq!(to_monthly(amount, Frequency::Weekly), amount * 4.33);
            prop_assert_eq!(to_monthly(amount, Frequency::Monthly), amount);
            prop_assert!(to_monthly(amount, Frequency::Weekly) >= 0.0);
        }
    }
}
