//! Declarative parameter schemas and argument validation.
//!
//! Every capability declares its parameters as an ordered list of
//! [`ParamSpec`]s. [`validate_arguments`] is the single routine that checks a
//! client-supplied argument object against that list; handlers never do ad hoc
//! presence or type checks of their own.

use serde_json::{json, Map, Value};

use crate::error::{CapabilityError, CapabilityResult};

/// JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
}

impl ParamType {
    /// Returns the JSON Schema type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns `true` if `value` is of this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

/// Returns the JSON type name of a value, for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter of a capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Expected JSON type.
    pub ty: ParamType,
    /// Whether the client must supply it.
    pub required: bool,
    /// Value used when an optional parameter is omitted.
    pub default: Option<Value>,
    /// Permitted string values (empty means unrestricted).
    pub allowed: Vec<String>,
    /// Inclusive lower bound for numeric parameters.
    pub minimum: Option<f64>,
    /// Member declarations of an object parameter (empty means free-form).
    pub properties: Vec<ParamSpec>,
}

impl ParamSpec {
    fn new(name: &str, ty: ParamType, required: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ty,
            required,
            default: None,
            allowed: Vec::new(),
            minimum: None,
            properties: Vec::new(),
        }
    }

    /// Declares a required parameter.
    #[must_use]
    pub fn required(name: &str, ty: ParamType, description: &str) -> Self {
        Self::new(name, ty, true, description)
    }

    /// Declares an optional parameter.
    #[must_use]
    pub fn optional(name: &str, ty: ParamType, description: &str) -> Self {
        Self::new(name, ty, false, description)
    }

    /// Sets the default applied when the parameter is omitted.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Restricts a string parameter to `values`.
    #[must_use]
    pub fn with_allowed(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets an inclusive lower bound for a numeric parameter.
    #[must_use]
    pub const fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Declares the members of an object parameter.
    ///
    /// They are advertised in the input schema; the handler owning the
    /// parameter validates its contents.
    #[must_use]
    pub fn with_properties(mut self, properties: Vec<Self>) -> Self {
        self.properties = properties;
        self
    }

    /// Renders this declaration as a JSON Schema property.
    fn to_schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(self.ty.as_str()));
        prop.insert("description".to_string(), json!(self.description));
        if !self.allowed.is_empty() {
            prop.insert("enum".to_string(), json!(self.allowed));
        }
        if let Some(min) = self.minimum {
            prop.insert("minimum".to_string(), json!(min));
        }
        if let Some(ref default) = self.default {
            prop.insert("default".to_string(), default.clone());
        }
        if !self.properties.is_empty() {
            let members: Map<String, Value> = self
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.to_schema()))
                .collect();
            prop.insert("properties".to_string(), Value::Object(members));
            prop.insert("additionalProperties".to_string(), json!(false));
        }
        Value::Object(prop)
    }

    /// Checks a supplied (non-null) value against this declaration.
    fn check(&self, value: &Value) -> CapabilityResult<()> {
        if !self.ty.accepts(value) {
            return Err(CapabilityError::validation(
                &self.name,
                format!("expected {}, got {}", self.ty.as_str(), type_name(value)),
            ));
        }

        if !self.allowed.is_empty() {
            if let Some(s) = value.as_str() {
                if !self.allowed.iter().any(|a| a == s) {
                    return Err(CapabilityError::validation(
                        &self.name,
                        format!("must be one of: {}", self.allowed.join(", ")),
                    ));
                }
            }
        }

        if let (Some(min), Some(n)) = (self.minimum, value.as_f64()) {
            if n < min {
                return Err(CapabilityError::validation(
                    &self.name,
                    format!("must be >= {min}, got {n}"),
                ));
            }
        }

        Ok(())
    }
}

/// Validated, defaulted arguments handed to a capability handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Returns the raw value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `name` as a string, if present.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns `name` as a number, if present.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Returns a required string argument.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the argument is absent or not a string.
    pub fn require_str(&self, name: &str) -> CapabilityResult<&str> {
        self.get_str(name)
            .ok_or_else(|| CapabilityError::validation(name, "missing required string"))
    }

    /// Returns a required object argument.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the argument is absent or not an object.
    pub fn require_object(&self, name: &str) -> CapabilityResult<&Map<String, Value>> {
        self.0
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| CapabilityError::validation(name, "missing required object"))
    }

    /// Returns `true` if no arguments are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Validates `args` against `params` and applies defaults.
///
/// `args` must be a JSON object, `null`, or absent. A `null` value for an
/// optional parameter is treated as if it were omitted.
///
/// # Errors
///
/// Returns [`CapabilityError::ValidationError`] naming the first offending
/// parameter: a missing required parameter, a wrong type, a value outside the
/// allowed set or below the minimum, or a parameter that is not declared.
pub fn validate_arguments(params: &[ParamSpec], args: Option<&Value>) -> CapabilityResult<Arguments> {
    let empty = Map::new();
    let supplied = match args {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(CapabilityError::validation(
                "arguments",
                format!("expected object, got {}", type_name(other)),
            ));
        }
    };

    let mut validated = Map::new();

    for param in params {
        match supplied.get(&param.name).filter(|v| !v.is_null()) {
            Some(value) => {
                param.check(value)?;
                validated.insert(param.name.clone(), value.clone());
            }
            None if param.required => {
                return Err(CapabilityError::validation(
                    &param.name,
                    "missing required parameter",
                ));
            }
            None => {
                if let Some(ref default) = param.default {
                    validated.insert(param.name.clone(), default.clone());
                }
            }
        }
    }

    if let Some(unknown) = supplied
        .keys()
        .find(|key| !params.iter().any(|p| &p.name == *key))
    {
        return Err(CapabilityError::validation(unknown, "unknown parameter"));
    }

    Ok(Arguments(validated))
}

/// Renders `params` as a JSON Schema object (for `tools/list`).
#[must_use]
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.clone(), p.to_schema()))
        .collect();

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_params() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("query", ParamType::String, "Search query"),
            ParamSpec::optional("category", ParamType::String, "Category")
                .with_allowed(&["Activewear", "Casual"]),
            ParamSpec::optional("max_price", ParamType::Number, "Price cap").with_minimum(0.0),
            ParamSpec::optional("limit", ParamType::Integer, "Limit").with_default(json!(10)),
        ]
    }

    fn parameter_of(err: CapabilityError) -> String {
        match err {
            CapabilityError::ValidationError { parameter, .. } => parameter,
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_arguments_and_applies_defaults() {
        let args = json!({"query": "shirt", "max_price": 50});
        let validated = validate_arguments(&search_params(), Some(&args)).unwrap();
        assert_eq!(validated.get_str("query"), Some("shirt"));
        assert_eq!(validated.get_f64("max_price"), Some(50.0));
        assert_eq!(validated.get("limit"), Some(&json!(10)));
        assert_eq!(validated.get("category"), None);
    }

    #[test]
    fn missing_required_parameter_is_named() {
        let err = validate_arguments(&search_params(), Some(&json!({}))).unwrap_err();
        assert_eq!(parameter_of(err), "query");

        let err = validate_arguments(&search_params(), None).unwrap_err();
        assert_eq!(parameter_of(err), "query");
    }

    #[test]
    fn null_required_parameter_is_missing() {
        let err = validate_arguments(&search_params(), Some(&json!({"query": null}))).unwrap_err();
        assert_eq!(parameter_of(err), "query");
    }

    #[test]
    fn null_optional_parameter_is_omitted() {
        let args = json!({"query": "x", "category": null});
        let validated = validate_arguments(&search_params(), Some(&args)).unwrap();
        assert_eq!(validated.get("category"), None);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err =
            validate_arguments(&search_params(), Some(&json!({"query": 42}))).unwrap_err();
        assert!(err.to_string().contains("expected string, got integer"));

        let args = json!({"query": "x", "limit": 1.5});
        let err = validate_arguments(&search_params(), Some(&args)).unwrap_err();
        assert_eq!(parameter_of(err), "limit");
    }

    #[test]
    fn minimum_is_enforced() {
        let args = json!({"query": "x", "max_price": -1});
        let err = validate_arguments(&search_params(), Some(&args)).unwrap_err();
        assert_eq!(parameter_of(err), "max_price");

        let args = json!({"query": "x", "max_price": 0});
        assert!(validate_arguments(&search_params(), Some(&args)).is_ok());
    }

    #[test]
    fn allowed_values_are_enforced() {
        let args = json!({"query": "x", "category": "Footwear"});
        let err = validate_arguments(&search_params(), Some(&args)).unwrap_err();
        assert_eq!(parameter_of(err), "category");
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let args = json!({"query": "x", "colour": "red"});
        let err = validate_arguments(&search_params(), Some(&args)).unwrap_err();
        assert_eq!(parameter_of(err), "colour");
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate_arguments(&search_params(), Some(&json!(["shirt"]))).unwrap_err();
        assert_eq!(parameter_of(err), "arguments");
    }

    #[test]
    fn input_schema_lists_required_and_constraints() {
        let schema = input_schema(&search_params());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["max_price"]["minimum"], json!(0.0));
        assert_eq!(
            schema["properties"]["category"]["enum"],
            json!(["Activewear", "Casual"])
        );
        assert_eq!(schema["properties"]["limit"]["default"], json!(10));
        assert!(schema["properties"]["query"].get("properties").is_none());
    }

    #[test]
    fn input_schema_renders_object_members() {
        let params = vec![ParamSpec::required("filters", ParamType::Object, "Filters")
            .with_properties(vec![
                ParamSpec::optional("colour", ParamType::String, "Colour"),
                ParamSpec::optional("size", ParamType::String, "Size").with_allowed(&["S", "M"]),
            ])];

        let schema = input_schema(&params);
        let filters = &schema["properties"]["filters"];
        assert_eq!(filters["type"], "object");
        assert_eq!(filters["additionalProperties"], false);
        assert_eq!(filters["properties"]["colour"]["type"], "string");
        assert_eq!(filters["properties"]["size"]["enum"], json!(["S", "M"]));
    }
}
