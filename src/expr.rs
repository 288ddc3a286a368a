//! CloudFormation property values and intrinsic functions.
//!
//! Property values are modeled as a small recursive sum type: a value is
//! either a literal, a symbolic reference to another template element, or a
//! deferred expression (`Fn::If`, `Fn::Join`, ...) that the CloudFormation
//! engine evaluates when the template is applied. Nothing here is resolved
//! locally; serialization emits the intrinsic-function JSON schema verbatim.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Pseudo parameter resolved by CloudFormation to the stack name.
pub const AWS_STACK_NAME: &str = "AWS::StackName";

/// Pseudo parameter resolved by CloudFormation to the stack's region.
pub const AWS_REGION: &str = "AWS::Region";

/// Pseudo parameter resolved by CloudFormation to the account id.
pub const AWS_ACCOUNT_ID: &str = "AWS::AccountId";

/// A CloudFormation property value: literal, reference, or deferred
/// expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// `{"Ref": name}` - the runtime identifier of a parameter or resource.
    Ref(String),
    /// `{"Fn::GetAtt": [resource, attribute]}`
    GetAtt(String, String),
    /// `{"Fn::Join": [separator, parts]}`
    Join(String, Vec<Value>),
    /// `{"Fn::If": [condition, then, else]}` - the three-way ternary node
    /// evaluated by the template consumer, not by this tool.
    If(String, Box<Value>, Box<Value>),
    /// `{"Fn::FindInMap": [map, top-level key, second-level key]}`
    FindInMap(String, Box<Value>, String),
    Equals(Box<Value>, Box<Value>),
    Not(Box<Value>),
    And(Vec<Value>),
    Or(Vec<Value>),
    /// `{"Condition": name}` - a reference to a named template condition.
    Condition(String),
    Base64(Box<Value>),
    Sub(String),
    /// `{"Ref": "AWS::NoValue"}` - removes the property when chosen.
    NoValue,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// Builds a `Ref` to a named parameter, resource, or pseudo parameter.
pub fn reference(name: impl Into<String>) -> Value {
    Value::Ref(name.into())
}

/// Builds an `Fn::GetAtt` over a resource attribute such as
/// `"Endpoint.Address"`.
pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Value {
    Value::GetAtt(resource.into(), attribute.into())
}

/// Builds an `Fn::Join` of `parts` with `separator`.
pub fn join(separator: impl Into<String>, parts: Vec<Value>) -> Value {
    Value::Join(separator.into(), parts)
}

/// Builds an `Fn::If` choosing between two values by condition name.
pub fn fn_if(condition: &str, when_true: impl Into<Value>, when_false: impl Into<Value>) -> Value {
    Value::If(condition.to_string(), Box::new(when_true.into()), Box::new(when_false.into()))
}

/// Builds an `Fn::FindInMap` lookup into a named static mapping.
pub fn find_in_map(
    map: impl Into<String>,
    top_key: impl Into<Value>,
    second_key: impl Into<String>,
) -> Value {
    Value::FindInMap(map.into(), Box::new(top_key.into()), second_key.into())
}

/// Builds an `Fn::Equals` condition expression.
pub fn equals(left: impl Into<Value>, right: impl Into<Value>) -> Value {
    Value::Equals(Box::new(left.into()), Box::new(right.into()))
}

/// Builds an `Fn::Not` condition expression.
pub fn not(value: Value) -> Value {
    Value::Not(Box::new(value))
}

/// Builds an `Fn::And` condition expression.
pub fn and(values: Vec<Value>) -> Value {
    Value::And(values)
}

/// Builds an `Fn::Or` condition expression.
pub fn or(values: Vec<Value>) -> Value {
    Value::Or(values)
}

/// Builds a reference to a named condition, for nesting inside other
/// condition expressions.
pub fn condition(name: &str) -> Value {
    Value::Condition(name.to_string())
}

/// Builds an `Fn::Base64` wrapper (used for instance user data).
pub fn base64(value: Value) -> Value {
    Value::Base64(Box::new(value))
}

/// Builds an `Fn::Sub` string substitution.
pub fn sub(template: impl Into<String>) -> Value {
    Value::Sub(template.into())
}

fn intrinsic<S, T>(serializer: S, key: &str, value: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(value) => serializer.serialize_str(value),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::List(values) => values.serialize(serializer),
            Value::Map(values) => values.serialize(serializer),
            Value::Ref(name) => intrinsic(serializer, "Ref", name),
            Value::GetAtt(resource, attribute) => {
                intrinsic(serializer, "Fn::GetAtt", &(resource, attribute))
            }
            Value::Join(separator, parts) => {
                intrinsic(serializer, "Fn::Join", &(separator, parts))
            }
            Value::If(condition, when_true, when_false) => {
                intrinsic(serializer, "Fn::If", &(condition, when_true, when_false))
            }
            Value::FindInMap(map, top_key, second_key) => {
                intrinsic(serializer, "Fn::FindInMap", &(map, top_key, second_key))
            }
            Value::Equals(left, right) => intrinsic(serializer, "Fn::Equals", &(left, right)),
            Value::Not(value) => intrinsic(serializer, "Fn::Not", &(value,)),
            Value::And(values) => intrinsic(serializer, "Fn::And", values),
            Value::Or(values) => intrinsic(serializer, "Fn::Or", values),
            Value::Condition(name) => intrinsic(serializer, "Condition", name),
            Value::Base64(value) => intrinsic(serializer, "Fn::Base64", value),
            Value::Sub(template) => intrinsic(serializer, "Fn::Sub", template),
            Value::NoValue => intrinsic(serializer, "Ref", "AWS::NoValue"),
        }
    }
}

/// Builds an ordered property bag whose values are converted through
/// `Value::from`, so literals, nested bags, and expression nodes mix freely.
#[macro_export]
macro_rules! props {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = indexmap::IndexMap::new();
        $(map.insert(String::from($key), $crate::expr::Value::from($value));)*
        map
    }};
}
