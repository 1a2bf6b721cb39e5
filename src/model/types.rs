//! Reflected schema and validation metadata
//!
//! These are the read-only inputs a host ORM adapter hands to the checkers:
//! - columns (name, nullability, literal default, server-side default expression)
//! - validators (kind, target attributes, options)
//! - belongs-to associations (attribute to foreign key / foreign type)
//! - indexes (column list, uniqueness)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single table column as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column identifier
    pub name: String,
    /// Whether the column accepts NULL
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Literal default declared in the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Server-side default expression (dialect specific, e.g. `gen_random_uuid()`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_function: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a nullable column without defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: true,
            default: None,
            default_function: None,
        }
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set a literal default
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set a server-side default expression
    pub fn with_default_function(mut self, expression: impl Into<String>) -> Self {
        self.default_function = Some(expression.into());
        self
    }
}

/// Returns true when a value counts as blank.
///
/// Null, `false`, empty or whitespace-only strings and empty collections are
/// blank. Numbers (zero included) and `true` are present.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Kind of a declared validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidatorKind {
    Presence,
    Absence,
    Uniqueness,
    /// Any validator the checkers do not reconcile (length, format, ...)
    Other(String),
}

impl ValidatorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValidatorKind::Presence => "presence",
            ValidatorKind::Absence => "absence",
            ValidatorKind::Uniqueness => "uniqueness",
            ValidatorKind::Other(name) => name,
        }
    }
}

impl From<String> for ValidatorKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "presence" => ValidatorKind::Presence,
            "absence" => ValidatorKind::Absence,
            "uniqueness" => ValidatorKind::Uniqueness,
            _ => ValidatorKind::Other(kind),
        }
    }
}

impl From<ValidatorKind> for String {
    fn from(kind: ValidatorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validator option keys.
///
/// The recognized keys form a closed set; anything else is kept as `Other`
/// and never consulted by the filters. Declaration order drives the order in
/// which conditions are rendered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OptionKey {
    On,
    If,
    Unless,
    AllowNil,
    AllowBlank,
    Scope,
    Other(String),
}

impl OptionKey {
    pub fn as_str(&self) -> &str {
        match self {
            OptionKey::On => "on",
            OptionKey::If => "if",
            OptionKey::Unless => "unless",
            OptionKey::AllowNil => "allow_nil",
            OptionKey::AllowBlank => "allow_blank",
            OptionKey::Scope => "scope",
            OptionKey::Other(key) => key,
        }
    }
}

impl From<String> for OptionKey {
    fn from(key: String) -> Self {
        match key.as_str() {
            "on" => OptionKey::On,
            "if" => OptionKey::If,
            "unless" => OptionKey::Unless,
            "allow_nil" => OptionKey::AllowNil,
            "allow_blank" => OptionKey::AllowBlank,
            "scope" => OptionKey::Scope,
            _ => OptionKey::Other(key),
        }
    }
}

impl From<&str> for OptionKey {
    fn from(key: &str) -> Self {
        OptionKey::from(key.to_string())
    }
}

impl From<OptionKey> for String {
    fn from(key: OptionKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value attached to a validator option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `allow_nil: true`
    Flag(bool),
    /// `on: create`, `scope: account_id`
    Name(String),
    /// `on: [create, update]`, `scope: [a, b]`
    Names(Vec<String>),
    /// `if: published?` - an opaque host-side predicate
    Predicate { predicate: String },
    /// Anything else (`minimum: 1`); kept but never interpreted
    Raw(Value),
}

impl OptionValue {
    pub fn predicate(label: impl Into<String>) -> Self {
        OptionValue::Predicate {
            predicate: label.into(),
        }
    }

    /// Whether the option actually restricts the validator.
    ///
    /// `false` and empty lists do not.
    pub fn is_set(&self) -> bool {
        match self {
            OptionValue::Flag(flag) => *flag,
            OptionValue::Name(_) => true,
            OptionValue::Names(names) => !names.is_empty(),
            OptionValue::Predicate { .. } => true,
            OptionValue::Raw(value) => !is_blank(value),
        }
    }

    /// Values as a list of identifiers (used for `scope`).
    pub fn names(&self) -> Vec<String> {
        match self {
            OptionValue::Name(name) => vec![name.clone()],
            OptionValue::Names(names) => names.clone(),
            OptionValue::Flag(_) | OptionValue::Predicate { .. } | OptionValue::Raw(_) => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(flag) => write!(f, "{}", flag),
            OptionValue::Name(name) => f.write_str(name),
            OptionValue::Names(names) => write!(f, "[{}]", names.join(", ")),
            OptionValue::Predicate { predicate } => write!(f, "<{}>", predicate),
            OptionValue::Raw(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        OptionValue::Flag(flag)
    }
}

impl From<&str> for OptionValue {
    fn from(name: &str) -> Self {
        OptionValue::Name(name.to_string())
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(names: Vec<&str>) -> Self {
        OptionValue::Names(names.into_iter().map(str::to_string).collect())
    }
}

/// Ordered option mapping of a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorOptions(BTreeMap<OptionKey, OptionValue>);

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<OptionKey>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &OptionKey) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Whether `key` is present with a restricting value
    pub fn is_set(&self, key: &OptionKey) -> bool {
        self.get(key).map_or(false, OptionValue::is_set)
    }

    /// Options restricted to `keys`, in key order.
    ///
    /// Keys present with a non-restricting value are kept, matching how the
    /// condition is reported back to the user.
    pub fn slice(&self, keys: &[OptionKey]) -> Conditions {
        Conditions(
            self.0
                .iter()
                .filter(|(key, _)| keys.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// The `scope` option as a list of identifiers
    pub fn scope(&self) -> Vec<String> {
        self.get(&OptionKey::Scope)
            .map(OptionValue::names)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.0.iter()
    }
}

/// A subset of validator options reported as the reason a validator does
/// not count. Renders as `{on: create}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conditions(BTreeMap<OptionKey, OptionValue>);

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &OptionKey) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &OptionKey> {
        self.0.keys()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

/// A declared validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub kind: ValidatorKind,
    /// Target attributes in declaration order (may name associations)
    pub attributes: Vec<String>,
    #[serde(default)]
    pub options: ValidatorOptions,
}

impl Validator {
    pub fn new<I, S>(kind: ValidatorKind, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            attributes: attributes.into_iter().map(Into::into).collect(),
            options: ValidatorOptions::new(),
        }
    }

    pub fn presence<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidatorKind::Presence, attributes)
    }

    pub fn absence<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidatorKind::Absence, attributes)
    }

    pub fn uniqueness<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidatorKind::Uniqueness, attributes)
    }

    /// Add an option (builder style)
    pub fn with(mut self, key: impl Into<OptionKey>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn targets(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// Association flavour. Only belongs-to associations own columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
}

/// A named association on the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    pub kind: AssociationKind,
    pub foreign_key: String,
    /// Set for polymorphic belongs-to associations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_type: Option<String>,
}

impl Association {
    /// `belongs_to :name` with the conventional `<name>_id` foreign key
    pub fn belongs_to(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            foreign_key: format!("{}_id", name),
            name,
            kind: AssociationKind::BelongsTo,
            foreign_type: None,
        }
    }

    /// `belongs_to :name, polymorphic: true`
    pub fn polymorphic(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            foreign_key: format!("{}_id", name),
            foreign_type: Some(format!("{}_type", name)),
            name,
            kind: AssociationKind::BelongsTo,
        }
    }

    pub fn has_many(name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AssociationKind::HasMany,
            foreign_key: foreign_key.into(),
            foreign_type: None,
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    /// Physical columns backing this association on the owning table.
    ///
    /// Empty for associations whose key lives on another table.
    pub fn column_names(&self) -> Vec<String> {
        match (self.kind, &self.foreign_type) {
            (AssociationKind::BelongsTo, Some(foreign_type)) => {
                vec![self.foreign_key.clone(), foreign_type.clone()]
            }
            (AssociationKind::BelongsTo, None) => vec![self.foreign_key.clone()],
            _ => Vec::new(),
        }
    }

    pub fn is_belongs_to(&self) -> bool {
        self.kind == AssociationKind::BelongsTo
    }
}

/// A database index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    pub fn unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: true,
        }
    }

    pub fn non_unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: false,
            ..Self::unique(columns)
        }
    }
}
