use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Shown on a booking card when the backend sent no delivery slot.
pub const DEFAULT_TIME_SLOT: &str = "6pm to 8pm";
const MISSING_DELIVERY_DATE: &str = "-";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(OrderId);
id_newtype!(UserId);

/// Weight or quantity as the agent typed it; the backend stores either a
/// number or free text with the unit embedded ("1.5 kg").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryQuantity {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for DeliveryQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A booking as returned by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "orderId", default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(rename = "senderName", default, deserialize_with = "null_as_default")]
    pub sender_name: String,
    #[serde(rename = "receiverName", default, deserialize_with = "null_as_default")]
    pub receiver_name: String,
    #[serde(rename = "cakeName", default, deserialize_with = "null_as_default")]
    pub cake_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<DeliveryQuantity>,
    /// `DD-MM-YYYY`, compared verbatim by the date filter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_date: String,
    #[serde(rename = "deliveryDate", default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "agentName", default, deserialize_with = "null_as_default")]
    pub agent_name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub advance_payment: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub balance_payment: f64,
    /// Only feeds the relative-time label; unreadable values decode to `None`.
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn time_slot(&self) -> &str {
        self.time_slot
            .as_deref()
            .filter(|slot| !slot.trim().is_empty())
            .unwrap_or(DEFAULT_TIME_SLOT)
    }

    pub fn delivery_date_display(&self) -> &str {
        self.delivery_date
            .as_deref()
            .filter(|date| !date.trim().is_empty())
            .unwrap_or(MISSING_DELIVERY_DATE)
    }

    pub fn weight_display(&self) -> String {
        self.weight
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Card title, e.g. `Asha ➔ Ravi`.
    pub fn route_title(&self) -> String {
        format!("{} ➔ {}", self.sender_name, self.receiver_name)
    }
}

/// Fields submitted by the booking form to `POST /create-order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(rename = "senderName")]
    pub sender_name: String,
    #[serde(rename = "receiverName")]
    pub receiver_name: String,
    #[serde(rename = "cakeName")]
    pub cake_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<DeliveryQuantity>,
    pub order_date: String,
    #[serde(rename = "deliveryDate", default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(rename = "agentName")]
    pub agent_name: String,
    #[serde(default)]
    pub advance_payment: f64,
    #[serde(default)]
    pub balance_payment: f64,
}

/// Totals shown above the list for the selected date.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderSummary {
    pub count: usize,
    pub total_advance: f64,
    pub total_balance: f64,
}

impl OrderSummary {
    pub fn of(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut acc, order| {
            acc.count += 1;
            acc.total_advance += order.advance_payment;
            acc.total_balance += order.balance_payment;
            acc
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Payment amounts arrive as numbers or numeric strings. Anything else counts
/// as zero so one bad amount does not hide the booking.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<RawAmount>::deserialize(deserializer)? {
        None => 0.0,
        Some(RawAmount::Number(value)) => value,
        Some(RawAmount::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>().unwrap_or_else(|_| {
                    warn!(amount = raw, "order: unreadable payment amount, using 0");
                    0.0
                })
            }
        }
        Some(RawAmount::Other(_)) => {
            warn!("order: payment amount is neither number nor text, using 0");
            0.0
        }
    };
    Ok(amount)
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Other(IgnoredAny),
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => None,
        Some(RawTimestamp::Text(raw)) => {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warn!(created_at = %raw, "order: unreadable creation time");
            }
            parsed
        }
        Some(RawTimestamp::Other(_)) => None,
    };
    Ok(parsed)
}
