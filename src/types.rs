//! Common GraphQL types

use async_graphql::{Scalar, ScalarType, Value};
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::{Deserialize, Serialize};

/// DateTime scalar, exchanged as an RFC 3339 string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(pub ChronoDateTime<Utc>);

impl DateTime {
    pub fn now() -> Self {
        DateTime(Utc::now())
    }
}

impl From<ChronoDateTime<Utc>> for DateTime {
    fn from(value: ChronoDateTime<Utc>) -> Self {
        DateTime(value)
    }
}

#[Scalar]
impl ScalarType for DateTime {
    fn parse(value: Value) -> async_graphql::InputValueResult<Self> {
        if let Value::String(s) = value {
            Ok(DateTime(
                ChronoDateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("Invalid DateTime: {}", e))?
                    .with_timezone(&Utc),
            ))
        } else {
            Err("Expected string for DateTime".into())
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}
