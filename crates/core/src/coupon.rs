//! Applied-coupon state machine.
//!
//! ```text
//!            submit(code), server says valid
//!   Idle ─────────────────────────────────────▶ Applied(code, discount)
//!    ▲                                              │
//!    └──────── submit(same code) / remove ──────────┘
//! ```
//!
//! Submitting the code that is already applied removes it without a server
//! round trip. Submitting a different code validates it; a valid answer
//! replaces the applied coupon and an invalid one drops back to `Idle`, so at
//! most one coupon is ever applied. Transport failures leave the state alone.

use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Errors surfaced to the shopper from coupon handling.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// The submitted code is blank.
    #[error("Please enter a coupon code")]
    EmptyCode,
    /// The platform rejected the code; its message is shown verbatim.
    #[error("{0}")]
    Rejected(String),
}

/// Platform response to a coupon validation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub message: Option<String>,
}

/// A coupon the platform accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Money,
}

/// What a submission should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponAction {
    /// Ask the platform to validate this normalized code.
    Validate(String),
    /// Remove the applied coupon.
    Remove,
}

/// Coupon state for one cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CouponState {
    #[default]
    Idle,
    Applied(AppliedCoupon),
}

impl CouponState {
    /// Normalize a typed code: trimmed and uppercased.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Decide what submitting `code` means in the current state.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::EmptyCode`] for a blank submission.
    pub fn plan(&self, code: &str) -> Result<CouponAction, CouponError> {
        let code = Self::normalize_code(code);
        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }
        match self {
            Self::Applied(applied) if applied.code == code => Ok(CouponAction::Remove),
            _ => Ok(CouponAction::Validate(code)),
        }
    }

    /// Record the platform's answer for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Rejected`] with the platform's message when the
    /// code is invalid; the state is reset to `Idle` in that case.
    pub fn apply_validation(
        &mut self,
        code: &str,
        validation: CouponValidation,
    ) -> Result<&AppliedCoupon, CouponError> {
        if !validation.valid {
            *self = Self::Idle;
            return Err(CouponError::Rejected(validation.message.unwrap_or_else(|| {
                "This coupon code is not valid".to_string()
            })));
        }

        *self = Self::Applied(AppliedCoupon {
            code: Self::normalize_code(code),
            discount: validation.discount.non_negative(),
        });
        match &*self {
            Self::Applied(applied) => Ok(applied),
            Self::Idle => Err(CouponError::EmptyCode),
        }
    }

    /// Drop the applied coupon, if any.
    pub fn remove(&mut self) {
        *self = Self::Idle;
    }

    /// Discount to feed into the summary.
    #[must_use]
    pub fn discount(&self) -> Option<Money> {
        match self {
            Self::Idle => None,
            Self::Applied(applied) => Some(applied.discount),
        }
    }

    #[must_use]
    pub fn applied(&self) -> Option<&AppliedCoupon> {
        match self {
            Self::Idle => None,
            Self::Applied(applied) => Some(applied),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::pricing::{CartSummary, Charge, Charges};
    use crate::types::{CartItemId, ProductId};

    fn valid(discount: i64) -> CouponValidation {
        CouponValidation {
            valid: true,
            discount: Money::from_major(discount),
            message: Some("Coupon applied".to_string()),
        }
    }

    #[test]
    fn test_plan_validates_new_code() {
        let state = CouponState::Idle;
        assert_eq!(
            state.plan(" save20 ").unwrap(),
            CouponAction::Validate("SAVE20".to_string())
        );
        assert_eq!(state.plan("   ").unwrap_err(), CouponError::EmptyCode);
    }

    #[test]
    fn test_resubmitting_applied_code_toggles_removal() {
        let mut state = CouponState::Idle;
        state.apply_validation("SAVE20", valid(20)).unwrap();
        assert_eq!(state.plan("save20").unwrap(), CouponAction::Remove);
        state.remove();
        assert_eq!(state, CouponState::Idle);
    }

    #[test]
    fn test_different_code_replaces_applied() {
        let mut state = CouponState::Idle;
        state.apply_validation("SAVE20", valid(20)).unwrap();
        assert_eq!(
            state.plan("TAKE5").unwrap(),
            CouponAction::Validate("TAKE5".to_string())
        );
        state.apply_validation("TAKE5", valid(5)).unwrap();
        assert_eq!(state.discount(), Some(Money::from_major(5)));
        assert_eq!(state.applied().unwrap().code, "TAKE5");
    }

    #[test]
    fn test_invalid_code_reverts_with_server_message() {
        let mut state = CouponState::Idle;
        state.apply_validation("SAVE20", valid(20)).unwrap();
        let err = state
            .apply_validation(
                "EXPIRED",
                CouponValidation {
                    valid: false,
                    discount: Money::ZERO,
                    message: Some("Coupon has expired".to_string()),
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Coupon has expired");
        assert_eq!(state, CouponState::Idle);
        assert_eq!(state.discount(), None);
    }

    #[test]
    fn test_apply_then_remove_restores_summary() {
        let items = [CartItem {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            name: "Crib".to_string(),
            quantity: 2,
            price: Money::from_major(100),
            sale_price: Some(Money::from_major(80)),
            stock: 5,
            category: None,
            image: None,
        }];
        let charges = Charges {
            shipping: Charge::Flat(Money::from_major(10)),
            tax: Charge::Rate(rust_decimal::Decimal::from(10)),
        };

        let mut state = CouponState::Idle;
        let before = CartSummary::compute(&items, state.discount(), &charges);

        state.apply_validation("SAVE20", valid(20)).unwrap();
        let during = CartSummary::compute(&items, state.discount(), &charges);
        assert_eq!(during.discount, Money::from_major(20));
        assert_ne!(during, before);

        state.remove();
        let after = CartSummary::compute(&items, state.discount(), &charges);
        assert_eq!(after, before);
    }

    #[test]
    fn test_state_round_trips_through_session_json() {
        let mut state = CouponState::Idle;
        state.apply_validation("save20", valid(20)).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "applied");
        assert_eq!(json["code"], "SAVE20");
        let back: CouponState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
