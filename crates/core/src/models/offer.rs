//! Offer plans (prepaid service bundles shown on the offers page).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::OfferPlanId;

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPlan {
    pub id: OfferPlanId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub validity_days: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
}

impl OfferPlan {
    /// Amount saved against the original price, if any.
    #[must_use]
    pub fn savings(&self) -> Option<Decimal> {
        self.original_price
            .map(|original| original - self.price)
            .filter(|saved| *saved > Decimal::ZERO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_savings() {
        let plan: OfferPlan = serde_json::from_str(
            r#"{"id":1,"name":"Annual AC Care","price":"1999","originalPrice":"2999",
                "validityDays":365,"features":["3 services","Free gas top-up"],"isPopular":true}"#,
        )
        .unwrap();
        assert_eq!(plan.savings(), Some(Decimal::new(1000, 0)));
        assert_eq!(plan.features.len(), 2);
    }

    #[test]
    fn test_no_savings_without_higher_original() {
        let plan: OfferPlan =
            serde_json::from_str(r#"{"id":2,"name":"Basic","price":499,"originalPrice":499}"#)
                .unwrap();
        assert_eq!(plan.savings(), None);
        assert!(!plan.is_popular);
    }
}
