//! Status enums for various entities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The backend only ever produces `pending`, `paid` and `canceled`. Anything
/// else is carried verbatim in [`OrderStatus::Other`] so it can still be
/// shown, but it gets no localized label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Created from the cart, awaiting payment.
    #[default]
    Pending,
    /// Payment accepted.
    Paid,
    /// Canceled before payment; inventory was returned.
    Canceled,
    /// Unrecognized status string from the server.
    Other(String),
}

impl OrderStatus {
    /// Wire value as sent by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// Badge text shown to shoppers.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "待支付",
            Self::Paid => "已支付",
            Self::Canceled => "已取消",
            Self::Other(raw) if raw.is_empty() => "-",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "canceled" => Self::Canceled,
            _ => Self::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_round_trip() {
        for raw in ["pending", "paid", "canceled"] {
            let status: OrderStatus = serde_json::from_str(&format!("\"{raw}\"")).unwrap();
            assert_eq!(status.as_str(), raw);
            assert!(!matches!(status, OrderStatus::Other(_)));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(OrderStatus::Pending.label(), "待支付");
        assert_eq!(OrderStatus::Paid.label(), "已支付");
        assert_eq!(OrderStatus::Canceled.label(), "已取消");
    }

    #[test]
    fn test_unknown_status_is_shown_raw() {
        let status: OrderStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, OrderStatus::Other("refunded".to_string()));
        assert_eq!(status.label(), "refunded");
    }

    #[test]
    fn test_empty_status_shows_dash() {
        assert_eq!(OrderStatus::from(String::new()).label(), "-");
    }
}
