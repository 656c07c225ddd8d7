//! Fundamental attributes fetched alongside the price history.

/// Provider fundamentals for one symbol. Every field is optional; ETFs and
/// indexes usually carry no PE, and some providers omit beta or yield.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fundamentals {
    pub current_price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub industry_pe: Option<f64>,
    /// Raw currency units.
    pub market_cap: Option<f64>,
    /// Fraction, e.g. 0.012 for 1.2%.
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
}

impl Fundamentals {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Treats zero and non-finite values as missing.
    pub fn normalized(self) -> Self {
        Self {
            current_price: present(self.current_price),
            pe_ratio: present(self.pe_ratio),
            industry_pe: present(self.industry_pe),
            market_cap: present(self.market_cap),
            dividend_yield: present(self.dividend_yield),
            beta: present(self.beta),
        }
    }

    pub fn has_pe(&self) -> bool {
        self.pe_ratio.is_some()
    }
}

pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_drops_zero_and_nan() {
        let f = Fundamentals {
            current_price: Some(55.2),
            pe_ratio: Some(0.0),
            industry_pe: Some(f64::NAN),
            market_cap: Some(1.5e12),
            dividend_yield: None,
            beta: Some(f64::INFINITY),
        }
        .normalized();
        assert_eq!(f.current_price, Some(55.2));
        assert_eq!(f.pe_ratio, None);
        assert_eq!(f.industry_pe, None);
        assert_eq!(f.market_cap, Some(1.5e12));
        assert_eq!(f.beta, None);
        assert!(!f.has_pe());
    }

    #[test]
    fn negative_values_are_kept() {
        assert_eq!(present(Some(-0.3)), Some(-0.3));
    }
}
