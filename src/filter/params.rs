// Query-string translation: allow-listed parameters become equality predicates
use std::collections::HashMap;

use serde_json::Value;

use super::error::FilterError;
use super::types::FilterData;
use crate::database::schema::{FilterDef, FilterKind};

pub struct FilterParams;

impl FilterParams {
    /// Build a `FilterData` from raw query parameters.
    ///
    /// Parameters not in `allowed` are ignored, as are empty values. `limit` and `offset`
    /// are always recognised.
    pub fn parse(
        allowed: &[FilterDef],
        params: &HashMap<String, String>,
    ) -> Result<FilterData, FilterError> {
        let mut data = FilterData::new();

        for def in allowed {
            let Some(raw) = params.get(def.param) else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            data = data.where_eq(def.column, Self::typed_value(def, raw)?);
        }

        data.limit = Self::paging(params, "limit")?;
        data.offset = Self::paging(params, "offset")?;
        Ok(data)
    }

    fn typed_value(def: &FilterDef, raw: &str) -> Result<Value, FilterError> {
        Ok(match def.kind {
            FilterKind::Exact => Value::String(raw.to_string()),
            FilterKind::Bool => Value::Bool(raw.eq_ignore_ascii_case("true")),
            FilterKind::Integer => {
                let n: i64 = raw.parse().map_err(|_| FilterError::InvalidValue {
                    param: def.param.to_string(),
                    message: "Enter a whole number.".to_string(),
                })?;
                Value::from(n)
            }
        })
    }

    fn paging(params: &HashMap<String, String>, name: &str) -> Result<Option<i64>, FilterError> {
        match params.get(name).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .map(Some)
                .ok_or_else(|| FilterError::InvalidValue {
                    param: name.to_string(),
                    message: "Enter a non-negative whole number.".to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[FilterDef] = &[
        FilterDef::exact("status"),
        FilterDef::boolean("is_active"),
        FilterDef::integer("year"),
    ];

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn unknown_and_empty_params_are_ignored() {
        let data = FilterParams::parse(ALLOWED, &params(&[("colour", "red"), ("status", "")])).unwrap();
        assert!(data.conditions.is_empty());
        assert_eq!(data.limit, None);
    }

    #[test]
    fn unknown_enum_values_pass_through() {
        let data = FilterParams::parse(ALLOWED, &params(&[("status", "nonsense")])).unwrap();
        assert_eq!(data.conditions.len(), 1);
        assert_eq!(data.conditions[0].data, json!("nonsense"));
    }

    #[test]
    fn booleans_are_case_insensitive() {
        let data = FilterParams::parse(ALLOWED, &params(&[("is_active", "TRUE")])).unwrap();
        assert_eq!(data.conditions[0].data, json!(true));
        let data = FilterParams::parse(ALLOWED, &params(&[("is_active", "False")])).unwrap();
        assert_eq!(data.conditions[0].data, json!(false));
        let data = FilterParams::parse(ALLOWED, &params(&[("is_active", "yes")])).unwrap();
        assert_eq!(data.conditions[0].data, json!(false));
    }

    #[test]
    fn integer_filters_are_parsed() {
        let data = FilterParams::parse(ALLOWED, &params(&[("year", "2024")])).unwrap();
        assert_eq!(data.conditions[0].data, json!(2024));
        assert!(matches!(
            FilterParams::parse(ALLOWED, &params(&[("year", "twenty")])),
            Err(FilterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn paging_params() {
        let data = FilterParams::parse(ALLOWED, &params(&[("limit", "10"), ("offset", "20")])).unwrap();
        assert_eq!(data.limit, Some(10));
        assert_eq!(data.offset, Some(20));
        assert!(FilterParams::parse(ALLOWED, &params(&[("limit", "-3")])).is_err());
    }
}
