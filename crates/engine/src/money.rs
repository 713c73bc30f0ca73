/// Round a monetary value to 2 decimal places, half away from zero.
///
/// The value is scaled to cents and rounded with [`f64::round`], so a sum
/// whose binary value sits just under a half (`1.005 * 100` is
/// `100.49999999999999`) rounds down. Values too large to scale are already
/// whole and come back unchanged.
///
/// Applied once, where a value is first computed or stored.
///
/// # Examples
///
/// ```rust
/// use engine::round2;
///
/// assert_eq!(round2(3.0 * 0.125), 0.38);
/// assert_eq!(round2(-0.375), -0.38);
/// assert_eq!(round2(12.344), 12.34);
/// ```
#[must_use]
pub fn round2(value: f64) -> f64 {
    let cents = value * 100.0;
    if !cents.is_finite() {
        return value;
    }
    cents.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_rounds_away_from_zero() {
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.375), -0.38);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn rounds_the_binary_value_not_the_written_decimal() {
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(0.0049999996), 0.0);
        assert_eq!(round2(0.005), 0.01);
    }

    #[test]
    fn below_half_rounds_down() {
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn already_rounded_values_are_stable() {
        for value in [0.0, 0.01, 10.0, 99.99, 620.5, 123_456.78] {
            assert_eq!(round2(value), value);
            assert_eq!(round2(round2(value)), round2(value));
        }
    }

    #[test]
    fn huge_values_do_not_overflow() {
        assert_eq!(round2(f64::MAX), f64::MAX);
        assert_eq!(round2(1e307), 1e307);
        assert_eq!(round2(1e300), 1e300);
        assert!(round2(f64::INFINITY).is_infinite());
    }
}
