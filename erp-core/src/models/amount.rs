use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount in integral minor units (two decimals).
///
/// `Amount(12_345)` is `123.45` in the company's currency. Keeping money
/// integral makes every report sum exact; rounding only ever happens when a
/// rate is multiplied by a quantity or a VAT rate is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Amount(pub i64);

impl Amount {
    /// The zero amount
    pub const ZERO: Self = Self(0);

    /// The largest magnitude accepted on a voucher, account or stock item
    /// (ten trillion in major units). Sums of many such amounts still fit
    /// in an `i64`.
    pub const MAX: Self = Self(1_000_000_000_000_000);

    /// Convert a value in major units (e.g. `123.45`), rounding half away from zero.
    pub fn from_major(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// The value in major units.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Multiply by a (possibly fractional) quantity, rounding half away from zero.
    pub fn scale(self, quantity: f64) -> Self {
        Self((self.0 as f64 * quantity).round() as i64)
    }

    /// Like [`Amount::scale`], but `None` when the result is not within
    /// [`Amount::MAX`].
    pub fn checked_scale(self, quantity: f64) -> Option<Self> {
        let product = (self.0 as f64 * quantity).round();
        (product.is_finite() && product.abs() <= Self::MAX.0 as f64)
            .then(|| Self(product as i64))
    }

    /// Addition that is `None` when the sum is not within [`Amount::MAX`].
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .filter(|sum| sum.in_range())
    }

    /// Whether the magnitude is at most [`Amount::MAX`]
    pub fn in_range(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0 as u64
    }

    /// Apply a rate given in basis points (1300 = 13%), rounding half away from zero.
    pub fn percent_bps(self, bps: u32) -> Self {
        let product = self.0 as i128 * bps as i128;
        let magnitude = (product.abs() + 5_000) / 10_000;
        let value = magnitude * product.signum();
        Self(i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Whether this amount is exactly zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether this amount is strictly positive
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether this amount is strictly negative
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Split a signed balance into its (debit, credit) presentation.
    pub fn split(self) -> (Self, Self) {
        if self.0 >= 0 {
            (self, Self::ZERO)
        } else {
            (Self::ZERO, -self)
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10_000, 1300, 1_300)]
    #[case(1, 1300, 0)]
    #[case(4, 1300, 1)] // 0.52 rounds up
    #[case(50, 1000, 5)]
    #[case(-10_050, 1300, -1_307)] // -1306.5 rounds away from zero
    fn vat_rounding(#[case] base: i64, #[case] bps: u32, #[case] expected: i64) {
        assert_eq!(Amount(base).percent_bps(bps), Amount(expected));
    }

    #[test]
    fn scaling_by_quantity() {
        assert_eq!(Amount(1_999).scale(3.0), Amount(5_997));
        assert_eq!(Amount(1_000).scale(0.125), Amount(125));
        assert_eq!(Amount(333).scale(0.5), Amount(167));
    }

    #[test]
    fn checked_arithmetic_stays_in_range() {
        assert_eq!(Amount(50_000).checked_scale(2.0), Some(Amount(100_000)));
        assert_eq!(Amount(50_000).checked_scale(1e300), None);
        assert_eq!(Amount::MAX.checked_scale(1.0), Some(Amount::MAX));
        assert_eq!(Amount::MAX.checked_scale(1.5), None);

        assert_eq!(Amount(1).checked_add(Amount(2)), Some(Amount(3)));
        assert_eq!(Amount::MAX.checked_add(Amount(1)), None);
        assert_eq!(Amount(i64::MAX).checked_add(Amount(1)), None);

        assert!(Amount(-Amount::MAX.0).in_range());
        assert!(!Amount(i64::MIN).in_range());
        assert_eq!(Amount(i64::MAX).percent_bps(20_000), Amount(i64::MAX));
    }

    #[test]
    fn display_in_major_units() {
        assert_eq!(Amount(123_45).to_string(), "123.45");
        assert_eq!(Amount(-5).to_string(), "-0.05");
        assert_eq!(Amount::from_major(19.99), Amount(1_999));
    }

    #[test]
    fn split_balance() {
        assert_eq!(Amount(500).split(), (Amount(500), Amount::ZERO));
        assert_eq!(Amount(-500).split(), (Amount::ZERO, Amount(500)));
    }
}
