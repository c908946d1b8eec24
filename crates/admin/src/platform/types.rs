//! Resources exchanged with the platform API by the admin panel.

use serde::{Deserialize, Serialize};
use vitrine_core::{Charges, CurrencyCode, Email, StoreId};

/// `{ "data": ... }` wrapper used by resource endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// The signed-in operator, as resolved from their token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: i64,
    pub name: String,
    pub email: Email,
}

/// A store tenant as the admin sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub charges: Charges,
}

/// One file of a media upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::Charge;

    use super::*;

    #[test]
    fn test_store_summary_defaults() {
        let store: StoreSummary =
            serde_json::from_str(r#"{"id": 4, "name": "Tick Tock", "slug": "tick-tock"}"#).unwrap();
        assert_eq!(store.id, StoreId::new(4));
        assert_eq!(store.currency, CurrencyCode::default());
        assert_eq!(store.charges.shipping, Charge::default());
    }

    #[test]
    fn test_operator_parses_email() {
        let operator: Operator = serde_json::from_str(
            r#"{"id": 9, "name": "Ada", "email": "ada@vitrine.test"}"#,
        )
        .unwrap();
        assert_eq!(operator.email.as_str(), "ada@vitrine.test");
    }
}
