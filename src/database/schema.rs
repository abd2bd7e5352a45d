//! Static entity definitions.
//!
//! Every table the API serves is described once by an [`EntitySchema`]: its columns and how
//! incoming values are checked, the joined display fields, the query parameters it can be filtered
//! on and its default ordering. The same definition drives DDL generation, payload validation,
//! SQL generation and the wire mapping, so there is no runtime introspection anywhere.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::SortDirection;

/// Which database an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// The shared registry (tenants and their domains)
    Registry,
    /// The per-university partition selected by request host
    Tenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { max_len: usize },
    LongText,
    Email,
    /// Lower-case identifier usable as a partition name
    Slug { max_len: usize },
    /// Request host name
    Host,
    Integer,
    Decimal { digits: u32, places: u32 },
    Bool,
    Date,
    DateTime,
    Choice(&'static [&'static str]),
    Json,
    Ref { table: &'static str, on_delete: OnDelete },
    /// Many-to-many edge stored in a junction table; exposed as a list of ids
    RefList {
        table: &'static str,
        junction: &'static str,
        owner_column: &'static str,
        target_column: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    Decimal(&'static str),
    EmptyObject,
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) | DefaultValue::Decimal(s) => Value::String(s.to_string()),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::EmptyObject => Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Required,
    /// Optional text that defaults to the empty string
    Blank,
    /// Optional value that defaults to null
    Nullable,
    Default(DefaultValue),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub unique: bool,
    /// Accepted on create, rejected on update when the value changes
    pub immutable: bool,
    /// Stored, but only ever written by server-side actions
    pub read_only: bool,
}

impl FieldDef {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
            unique: false,
            immutable: false,
            read_only: false,
        }
    }

    pub const fn text(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Text { max_len })
    }

    pub const fn long_text(name: &'static str) -> Self {
        Self::new(name, FieldKind::LongText)
    }

    pub const fn email(name: &'static str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub const fn slug(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Slug { max_len })
    }

    pub const fn host(name: &'static str) -> Self {
        Self::new(name, FieldKind::Host)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn decimal(name: &'static str, digits: u32, places: u32) -> Self {
        Self::new(name, FieldKind::Decimal { digits, places })
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub const fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Choice(options))
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldKind::Json)
    }

    /// Owning reference: deleting the target deletes this row
    pub const fn owner(name: &'static str, table: &'static str) -> Self {
        Self::new(name, FieldKind::Ref { table, on_delete: OnDelete::Cascade })
    }

    /// Optional reference cleared when the target is deleted
    pub const fn nullable_ref(name: &'static str, table: &'static str) -> Self {
        Self::new(name, FieldKind::Ref { table, on_delete: OnDelete::SetNull }).nullable()
    }

    pub const fn ref_list(
        name: &'static str,
        table: &'static str,
        junction: &'static str,
        owner_column: &'static str,
        target_column: &'static str,
    ) -> Self {
        Self::new(
            name,
            FieldKind::RefList { table, junction, owner_column, target_column },
        )
        .with_presence(Presence::Blank)
    }

    const fn with_presence(self, presence: Presence) -> Self {
        Self { presence, ..self }
    }

    pub const fn blank(self) -> Self {
        self.with_presence(Presence::Blank)
    }

    pub const fn nullable(self) -> Self {
        self.with_presence(Presence::Nullable)
    }

    pub const fn default_str(self, value: &'static str) -> Self {
        self.with_presence(Presence::Default(DefaultValue::Str(value)))
    }

    pub const fn default_int(self, value: i64) -> Self {
        self.with_presence(Presence::Default(DefaultValue::Int(value)))
    }

    pub const fn default_bool(self, value: bool) -> Self {
        self.with_presence(Presence::Default(DefaultValue::Bool(value)))
    }

    pub const fn default_decimal(self, value: &'static str) -> Self {
        self.with_presence(Presence::Default(DefaultValue::Decimal(value)))
    }

    pub const fn default_object(self) -> Self {
        self.with_presence(Presence::Default(DefaultValue::EmptyObject))
    }

    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }

    pub const fn immutable(self) -> Self {
        Self { immutable: true, ..self }
    }

    pub const fn read_only(self) -> Self {
        Self { read_only: true, ..self }
    }

    /// Whether the column lives on the entity's own table
    pub fn is_column(&self) -> bool {
        !matches!(self.kind, FieldKind::RefList { .. })
    }

    /// Value stored when the field is absent from a create payload
    pub fn default_value(&self) -> Option<Value> {
        match self.presence {
            Presence::Required => None,
            Presence::Nullable => Some(Value::Null),
            Presence::Blank => match self.kind {
                FieldKind::RefList { .. } => Some(Value::Array(vec![])),
                _ => Some(Value::String(String::new())),
            },
            Presence::Default(default) => Some(default.to_value()),
        }
    }

    /// Check an incoming value and convert it to its stored representation.
    /// The error string is the client-facing message for this field.
    pub fn normalize(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return match self.presence {
                Presence::Nullable => Ok(Value::Null),
                _ => Err("This field may not be null.".to_string()),
            };
        }

        match self.kind {
            FieldKind::Text { max_len } => {
                let s = self.text_value(value)?;
                check_length(&s, max_len)?;
                Ok(Value::String(s))
            }
            FieldKind::LongText => Ok(Value::String(self.text_value(value)?)),
            FieldKind::Email => {
                let s = self.text_value(value)?;
                check_length(&s, 254)?;
                if !s.is_empty() && !is_valid_email(&s) {
                    return Err("Enter a valid email address.".to_string());
                }
                Ok(Value::String(s))
            }
            FieldKind::Slug { max_len } => {
                let s = self.text_value(value)?;
                check_length(&s, max_len)?;
                if !is_valid_slug(&s) {
                    return Err(
                        "Use lower-case letters, digits and underscores, starting with a letter."
                            .to_string(),
                    );
                }
                Ok(Value::String(s))
            }
            FieldKind::Host => {
                let s = self.text_value(value)?.to_ascii_lowercase();
                check_length(&s, 253)?;
                if !is_valid_host(&s) {
                    return Err("Enter a valid host name.".to_string());
                }
                Ok(Value::String(s))
            }
            FieldKind::Integer => parse_integer(value)
                .map(Value::from)
                .ok_or_else(|| "A valid integer is required.".to_string()),
            FieldKind::Decimal { digits, places } => {
                normalize_decimal(value, digits, places).map(Value::String)
            }
            FieldKind::Bool => parse_bool(value)
                .map(Value::Bool)
                .ok_or_else(|| "Must be a valid boolean.".to_string()),
            FieldKind::Date => {
                let s = value.as_str().ok_or_else(date_format_error)?;
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                    .map_err(|_| date_format_error())
            }
            FieldKind::DateTime => {
                let s = value.as_str().ok_or_else(datetime_format_error)?;
                parse_datetime(s)
                    .map(|dt| Value::String(format_timestamp(dt)))
                    .ok_or_else(datetime_format_error)
            }
            FieldKind::Choice(options) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("\"{}\" is not a valid choice.", value))?;
                if options.contains(&s) {
                    Ok(Value::String(s.to_string()))
                } else {
                    Err(format!("\"{}\" is not a valid choice.", s))
                }
            }
            // Stored as JSON text whatever the value's shape
            FieldKind::Json => Ok(Value::String(value.to_string())),
            FieldKind::Ref { .. } => normalize_uuid(value).map(Value::String),
            FieldKind::RefList { .. } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| "Expected a list of items.".to_string())?;
                let mut ids: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    let id = Value::String(normalize_uuid(item)?);
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Ok(Value::Array(ids))
            }
        }
    }

    fn text_value(&self, value: &Value) -> Result<String, String> {
        let s = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return Err("Not a valid string.".to_string()),
        };
        if s.is_empty() && self.presence != Presence::Blank {
            return Err("This field may not be blank.".to_string());
        }
        Ok(s)
    }
}

/// Created/updated timestamp columns maintained by the repository
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamps {
    pub created: Option<&'static str>,
    pub updated: Option<&'static str>,
}

impl Stamps {
    pub const STANDARD: Stamps = Stamps { created: Some("created_at"), updated: Some("updated_at") };
    pub const CREATED_ONLY: Stamps = Stamps { created: Some("created_at"), updated: None };

    pub const fn created(column: &'static str) -> Self {
        Self { created: Some(column), updated: None }
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> {
        self.created.into_iter().chain(self.updated)
    }
}

/// One step of a foreign-key walk: follow `column` into `table`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hop {
    pub column: &'static str,
    pub table: &'static str,
}

/// Read-only display field pulled from a related row, e.g. `department_name`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinDef {
    pub name: &'static str,
    pub path: &'static [Hop],
    pub column: &'static str,
}

/// Read-only count of rows in `table` whose `column` points at this row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountDef {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Opaque string equality
    Exact,
    /// "true"/"false", case-insensitive
    Bool,
    Integer,
}

/// A query parameter accepted by `List`, mapped onto one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDef {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterDef {
    pub const fn exact(param: &'static str) -> Self {
        Self { param, column: param, kind: FilterKind::Exact }
    }

    pub const fn boolean(param: &'static str) -> Self {
        Self { param, column: param, kind: FilterKind::Bool }
    }

    pub const fn integer(param: &'static str) -> Self {
        Self { param, column: param, kind: FilterKind::Integer }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderDef {
    pub column: &'static str,
    pub sort: SortDirection,
}

impl OrderDef {
    pub const fn asc(column: &'static str) -> Self {
        Self { column, sort: SortDirection::Asc }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self { column, sort: SortDirection::Desc }
    }
}

/// Side effects that must commit together with a write.
/// Every method runs on the write's own transaction.
#[async_trait]
pub trait WriteHook: Send + Sync {
    async fn after_create(
        &self,
        _conn: &mut SqliteConnection,
        _row: &Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn after_update(
        &self,
        _conn: &mut SqliteConnection,
        _before: &Map<String, Value>,
        _after: &Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn before_delete(
        &self,
        _conn: &mut SqliteConnection,
        _row: &Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct EntitySchema {
    /// Singular, human-readable name used in messages
    pub name: &'static str,
    pub table: &'static str,
    pub partition: Partition,
    pub fields: &'static [FieldDef],
    pub stamps: Stamps,
    pub unique_together: &'static [&'static [&'static str]],
    pub joins: &'static [JoinDef],
    pub counts: &'static [CountDef],
    pub filters: &'static [FilterDef],
    pub order: &'static [OrderDef],
    /// Derived wire fields computed from the mapped record
    pub computed: Option<fn(&mut Map<String, Value>)>,
    pub hook: Option<&'static dyn WriteHook>,
    /// Trigger statements created with the table. They also fire for rows removed by
    /// `ON DELETE CASCADE`, which write hooks never see.
    pub triggers: &'static [&'static str],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.is_column())
    }

    pub fn list_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| !f.is_column())
    }

    /// Whether `name` is a column of the entity's own table
    pub fn has_column(&self, name: &str) -> bool {
        name == "id"
            || self.stamps.columns().any(|c| c == name)
            || self.column_fields().any(|f| f.name == name)
    }

    pub fn filter(&self, param: &str) -> Option<&'static FilterDef> {
        self.filters.iter().find(|f| f.param == param)
    }
}

/// Implemented by the zero-sized markers that select an entity in generic handlers
pub trait Entity: Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;
}

// Value helpers

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn normalize_decimal(value: &Value, digits: u32, places: u32) -> Result<String, String> {
    let d = parse_decimal(value).ok_or_else(|| "A valid number is required.".to_string())?;
    let d = d.normalize();
    if d.scale() > places {
        return Err(format!("Ensure that there are no more than {} decimal places.", places));
    }
    let whole_digits = d.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if whole_digits > digits - places {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            digits - places
        ));
    }
    let mut d = d;
    d.rescale(places);
    Ok(d.to_string())
}

fn normalize_uuid(value: &Value) -> Result<String, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("Incorrect type. Expected pk value, received {}.", type_name(value)))?;
    Uuid::parse_str(s.trim())
        .map(|u| u.to_string())
        .map_err(|_| format!("\"{}\" is not a valid UUID.", s))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn check_length(s: &str, max_len: usize) -> Result<(), String> {
    if s.chars().count() > max_len {
        return Err(format!("Ensure this field has no more than {} characters.", max_len));
    }
    Ok(())
}

fn date_format_error() -> String {
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.".to_string()
}

fn datetime_format_error() -> String {
    "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].".to_string()
}

fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !s.contains(char::is_whitespace)
        && (domain.contains('.') || domain == "localhost")
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn is_valid_slug(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_valid_host(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_is_rescaled_to_field_places() {
        let field = FieldDef::decimal("amount", 12, 2);
        assert_eq!(field.normalize(&json!(1000)).unwrap(), json!("1000.00"));
        assert_eq!(field.normalize(&json!("300.5")).unwrap(), json!("300.50"));
        assert_eq!(field.normalize(&json!(12.25)).unwrap(), json!("12.25"));
    }

    #[test]
    fn decimal_rejects_excess_precision_and_digits() {
        let gpa = FieldDef::decimal("gpa", 4, 2);
        assert!(gpa.normalize(&json!("3.125")).is_err());
        assert!(gpa.normalize(&json!("123.1")).is_err());
        assert!(gpa.normalize(&json!("abc")).is_err());
        assert_eq!(gpa.normalize(&json!("3.10")).unwrap(), json!("3.10"));
    }

    #[test]
    fn null_only_accepted_for_nullable_fields() {
        assert!(FieldDef::text("name", 10).normalize(&Value::Null).is_err());
        assert_eq!(
            FieldDef::date("when").nullable().normalize(&Value::Null).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn blank_text_only_for_blank_fields() {
        assert!(FieldDef::text("name", 10).normalize(&json!("  ")).is_err());
        assert_eq!(
            FieldDef::text("name", 10).blank().normalize(&json!("")).unwrap(),
            json!("")
        );
    }

    #[test]
    fn text_length_is_enforced() {
        let code = FieldDef::text("code", 3);
        assert!(code.normalize(&json!("ABCD")).is_err());
        assert_eq!(code.normalize(&json!(" AB ")).unwrap(), json!("AB"));
    }

    #[test]
    fn choices_are_checked() {
        let field = FieldDef::choice("status", &["active", "inactive"]);
        assert_eq!(field.normalize(&json!("active")).unwrap(), json!("active"));
        let err = field.normalize(&json!("bogus")).unwrap_err();
        assert!(err.contains("not a valid choice"));
    }

    #[test]
    fn datetimes_are_normalized_to_utc() {
        let field = FieldDef::datetime("at");
        assert_eq!(
            field.normalize(&json!("2024-03-01T12:00:00+02:00")).unwrap(),
            json!("2024-03-01T10:00:00.000000Z")
        );
        assert_eq!(
            field.normalize(&json!("2024-03-01T12:00")).unwrap(),
            json!("2024-03-01T12:00:00.000000Z")
        );
        assert!(field.normalize(&json!("yesterday")).is_err());
    }

    #[test]
    fn dates_require_iso_format() {
        let field = FieldDef::date("dob");
        assert_eq!(field.normalize(&json!("2001-02-03")).unwrap(), json!("2001-02-03"));
        assert!(field.normalize(&json!("03/02/2001")).is_err());
    }

    #[test]
    fn refs_must_be_uuids() {
        let field = FieldDef::owner("department", "departments");
        let id = Uuid::new_v4().to_string();
        assert_eq!(field.normalize(&json!(id.to_uppercase())).unwrap(), json!(id));
        assert!(field.normalize(&json!("not-a-uuid")).is_err());
        assert!(field.normalize(&json!(42)).is_err());
    }

    #[test]
    fn ref_lists_are_deduplicated() {
        let field = FieldDef::ref_list("prerequisites", "courses", "course_prerequisites", "course_id", "prerequisite_id");
        let id = Uuid::new_v4().to_string();
        assert_eq!(field.normalize(&json!([id, id])).unwrap(), json!([id]));
        assert_eq!(field.default_value(), Some(json!([])));
    }

    #[test]
    fn slugs_and_hosts() {
        assert!(is_valid_slug("ypu"));
        assert!(is_valid_slug("tenant_2"));
        assert!(!is_valid_slug("2tenant"));
        assert!(!is_valid_slug("Bad-Name"));
        let host = FieldDef::host("domain");
        assert_eq!(host.normalize(&json!("YPU.Localhost")).unwrap(), json!("ypu.localhost"));
        assert!(host.normalize(&json!("bad host")).is_err());
    }

    #[test]
    fn booleans_accept_common_spellings() {
        let field = FieldDef::boolean("is_active");
        assert_eq!(field.normalize(&json!("TRUE")).unwrap(), json!(true));
        assert_eq!(field.normalize(&json!(0)).unwrap(), json!(false));
        assert!(field.normalize(&json!("maybe")).is_err());
    }

    #[test]
    fn defaults_follow_presence() {
        assert_eq!(FieldDef::text("x", 5).default_value(), None);
        assert_eq!(FieldDef::long_text("x").blank().default_value(), Some(json!("")));
        assert_eq!(FieldDef::integer("x").default_int(1).default_value(), Some(json!(1)));
        assert_eq!(FieldDef::json("x").default_object().default_value(), Some(json!({})));
    }
}
