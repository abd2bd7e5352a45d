// Read-time derived fields. None of these are stored.
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

use crate::database::schema::{parse_decimal, parse_integer};

/// `round(current / max * 100, 2)`, or 0 when the offering has no capacity
pub fn enrollment_percentage(current: i64, max: i64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    let pct = Decimal::from(current) / Decimal::from(max) * Decimal::ONE_HUNDRED;
    pct.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .to_f64()
        .unwrap_or(0.0)
}

/// `approved - spent` once a budget has a non-zero approved amount, else 0
pub fn remaining_amount(approved: Option<Decimal>, spent: Decimal) -> Decimal {
    let mut remaining = match approved {
        Some(approved) if !approved.is_zero() => approved - spent,
        _ => Decimal::ZERO,
    };
    remaining.rescale(2);
    remaining
}

pub fn offering_fields(row: &mut Map<String, Value>) {
    let current = row.get("current_enrollment").and_then(parse_integer).unwrap_or(0);
    let max = row.get("max_enrollment").and_then(parse_integer).unwrap_or(0);
    row.insert(
        "enrollment_percentage".to_string(),
        Value::from(enrollment_percentage(current, max)),
    );
}

pub fn budget_fields(row: &mut Map<String, Value>) {
    let approved = row.get("approved_amount").and_then(parse_decimal);
    let spent = row
        .get("spent_amount")
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ZERO);
    row.insert(
        "remaining_amount".to_string(),
        Value::String(remaining_amount(approved, spent).to_string()),
    );
}

/// `first_name last_name`
pub fn person_fields(row: &mut Map<String, Value>) {
    let first = row.get("first_name").and_then(Value::as_str).unwrap_or_default();
    let last = row.get("last_name").and_then(Value::as_str).unwrap_or_default();
    let full_name = format!("{} {}", first, last);
    row.insert("full_name".to_string(), Value::String(full_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn zero_capacity_is_zero_percent() {
        assert_eq!(enrollment_percentage(25, 0), 0.0);
        assert_eq!(enrollment_percentage(0, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        assert_eq!(enrollment_percentage(25, 50), 50.0);
        assert_eq!(enrollment_percentage(1, 3), 33.33);
        assert_eq!(enrollment_percentage(2, 3), 66.67);
        assert_eq!(enrollment_percentage(60, 50), 120.0);
    }

    #[test]
    fn remaining_requires_approval() {
        let d = |s: &str| Decimal::from_str(s).unwrap();
        assert_eq!(remaining_amount(Some(d("1000.00")), d("300.00")).to_string(), "700.00");
        assert_eq!(remaining_amount(None, d("300.00")).to_string(), "0.00");
        assert_eq!(remaining_amount(Some(d("0")), d("10")).to_string(), "0.00");
    }

    #[test]
    fn budget_fields_read_stored_strings() {
        let mut row = match json!({"approved_amount": "1000.00", "spent_amount": "300.00"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        budget_fields(&mut row);
        assert_eq!(row["remaining_amount"], json!("700.00"));
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let mut row = match json!({"first_name": "Amal", "middle_name": "K", "last_name": "Saleh"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        person_fields(&mut row);
        assert_eq!(row["full_name"], json!("Amal Saleh"));
    }
}
