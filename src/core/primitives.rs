use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Anchor timestamps are unix milliseconds, matching the kline data feed.
#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn datetime_maps_to_millis() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("time");
        assert_eq!(datetime_to_unix_millis(time), 1_704_164_645_000);
    }

    #[test]
    fn decimal_conversion_keeps_value() {
        let value = decimal_to_f64(Decimal::new(12_345, 2), "price").expect("decimal");
        assert!((value - 123.45).abs() <= 1e-9);
    }
}
