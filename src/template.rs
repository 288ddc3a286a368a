//! The template builder: an append-only accumulator for parameters,
//! conditions, mappings, resources, and outputs, with optional parameter
//! grouping and labeling metadata rendered into an
//! `AWS::CloudFormation::Interface` block at serialization time.

use crate::error::Result;
use crate::expr::Value;
use crate::tags::{TagShape, Tags};
use indexmap::IndexMap;
use log::debug;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::json;

/// A static two-level lookup table (`Fn::FindInMap` target).
pub type Mapping = IndexMap<String, IndexMap<String, Value>>;

/// A named, typed input placeholder resolved by CloudFormation at
/// stack-apply time. Constructed with struct update syntax; every field
/// except `name` and `parameter_type` is optional.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Type")]
    pub parameter_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
}

impl Parameter {
    /// Creates a parameter with the given logical name and CloudFormation
    /// type (e.g. `"String"`, `"Number"`, `"CommaDelimitedList"`).
    pub fn new(name: impl Into<String>, parameter_type: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            parameter_type: parameter_type.into(),
            ..Default::default()
        }
    }
}

/// A named output of the generated template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Output {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: Value) -> Self {
        Output {
            name: name.into(),
            description: Some(description.into()),
            value,
            condition: None,
        }
    }

    /// Same as [`Output::new`] but gated on a named condition.
    pub fn conditional(
        name: impl Into<String>,
        description: impl Into<String>,
        value: Value,
        condition: &str,
    ) -> Self {
        Output { condition: Some(condition.to_string()), ..Output::new(name, description, value) }
    }
}

/// One piece of infrastructure to be created: a logical name, a type tag,
/// and a property bag of literals, references, and deferred expressions.
///
/// Tags are kept out of the property bag so the common-tag injection pass
/// can merge into them; they are folded back under `Properties.Tags` during
/// serialization. `tag_shape` declares the container representation the
/// resource type expects; `None` means the type has no tags property (or
/// manages tags directly in the property bag, as auto scaling groups do).
#[derive(Debug, Clone, Default)]
pub struct Resource {
    pub name: String,
    pub resource_type: String,
    pub condition: Option<String>,
    pub deletion_policy: Option<String>,
    pub depends_on: Vec<String>,
    pub properties: IndexMap<String, Value>,
    pub tag_shape: Option<TagShape>,
    pub tags: Option<Tags>,
}

impl Resource {
    /// Creates a resource with the given logical name and CloudFormation
    /// type tag (e.g. `"AWS::EC2::VPC"`).
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }
}

struct ResourceProperties<'a> {
    properties: &'a IndexMap<String, Value>,
    tags: &'a Option<Tags>,
}

impl Serialize for ResourceProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.properties {
            map.serialize_entry(key, value)?;
        }
        if let Some(tags) = self.tags {
            map.serialize_entry("Tags", tags)?;
        }
        map.end()
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Type", &self.resource_type)?;
        if let Some(condition) = &self.condition {
            map.serialize_entry("Condition", condition)?;
        }
        if !self.depends_on.is_empty() {
            map.serialize_entry("DependsOn", &self.depends_on)?;
        }
        if let Some(policy) = &self.deletion_policy {
            map.serialize_entry("DeletionPolicy", policy)?;
        }
        if !self.properties.is_empty() || self.tags.is_some() {
            let properties =
                ResourceProperties { properties: &self.properties, tags: &self.tags };
            map.serialize_entry("Properties", &properties)?;
        }
        map.end()
    }
}

/// The root document accumulator.
///
/// All collections are insertion-ordered and keyed by logical name with
/// last-write-wins semantics: a second registration under an existing name
/// silently replaces the first. No reference validation is performed; a
/// dangling reference surfaces only in the downstream consumer.
#[derive(Debug, Default)]
pub struct Template {
    pub parameters: IndexMap<String, Parameter>,
    pub conditions: IndexMap<String, Value>,
    pub mappings: IndexMap<String, Mapping>,
    pub resources: IndexMap<String, Resource>,
    pub outputs: IndexMap<String, Output>,
    parameter_groups: IndexMap<String, Vec<String>>,
    parameter_labels: IndexMap<String, String>,
    group_order: Vec<String>,
}

impl Template {
    pub fn new() -> Self {
        Template::default()
    }

    /// Registers a parameter and returns a `Ref` to it for call-site
    /// chaining.
    ///
    /// If `group` is given, the parameter's name is appended to that
    /// group's ordered member list (groups are ordered by first use). If
    /// `label` is given, it is recorded as the parameter's display label.
    /// Both feed the `AWS::CloudFormation::Interface` block in
    /// [`Template::to_value`].
    pub fn add_parameter(
        &mut self,
        parameter: Parameter,
        group: Option<&str>,
        label: Option<&str>,
    ) -> Value {
        debug!("Registering parameter {}", parameter.name);
        let name = parameter.name.clone();
        if let Some(group) = group {
            self.parameter_groups.entry(group.to_string()).or_default().push(name.clone());
        }
        if let Some(label) = label {
            self.parameter_labels.insert(name.clone(), label.to_string());
        }
        self.parameters.insert(name.clone(), parameter);
        Value::Ref(name)
    }

    /// Registers a resource and returns a `Ref` to it.
    pub fn add_resource(&mut self, resource: Resource) -> Value {
        debug!("Registering resource {} ({})", resource.name, resource.resource_type);
        let name = resource.name.clone();
        self.resources.insert(name.clone(), resource);
        Value::Ref(name)
    }

    /// Registers a named boolean condition expression.
    pub fn add_condition(&mut self, name: &str, expression: Value) {
        self.conditions.insert(name.to_string(), expression);
    }

    /// Registers a named static lookup table.
    pub fn add_mapping(&mut self, name: impl Into<String>, mapping: Mapping) {
        self.mappings.insert(name.into(), mapping);
    }

    /// Registers a named output.
    pub fn add_output(&mut self, output: Output) {
        self.outputs.insert(output.name.clone(), output);
    }

    /// Sets the preferred display order for parameter groups. Groups not
    /// listed here appear afterward in first-use order; listed groups that
    /// were never used are dropped from the rendered interface.
    pub fn set_group_order<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_order = groups.into_iter().map(Into::into).collect();
    }

    /// Synthesizes the `AWS::CloudFormation::Interface` metadata block from
    /// the group and label side tables collected by
    /// [`Template::add_parameter`].
    fn interface(&self) -> serde_json::Value {
        let mut ordered: Vec<&String> = self.group_order.iter().collect();
        for group in self.parameter_groups.keys() {
            if !ordered.iter().any(|known| *known == group) {
                ordered.push(group);
            }
        }
        ordered.retain(|group| self.parameter_groups.contains_key(*group));

        let groups: Vec<serde_json::Value> = ordered
            .iter()
            .map(|group| {
                json!({
                    "Label": {"default": group},
                    "Parameters": self.parameter_groups[*group],
                })
            })
            .collect();
        let labels: serde_json::Map<String, serde_json::Value> = self
            .parameter_labels
            .iter()
            .map(|(parameter, label)| (parameter.clone(), json!({"default": label})))
            .collect();

        json!({"ParameterGroups": groups, "ParameterLabels": labels})
    }

    /// Renders the accumulated state into a JSON value. Empty sections are
    /// omitted; `Resources` and the interface metadata are always present.
    pub fn to_value(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        root.insert("AWSTemplateFormatVersion".to_string(), json!("2010-09-09"));
        root.insert(
            "Metadata".to_string(),
            json!({"AWS::CloudFormation::Interface": self.interface()}),
        );
        if !self.parameters.is_empty() {
            root.insert("Parameters".to_string(), json!(self.parameters));
        }
        if !self.conditions.is_empty() {
            root.insert("Conditions".to_string(), json!(self.conditions));
        }
        if !self.mappings.is_empty() {
            root.insert("Mappings".to_string(), json!(self.mappings));
        }
        root.insert("Resources".to_string(), json!(self.resources));
        if !self.outputs.is_empty() {
            root.insert("Outputs".to_string(), json!(self.outputs));
        }
        serde_json::Value::Object(root)
    }

    /// Serializes the template as pretty-printed JSON with sorted object
    /// keys, matching the conventional CloudFormation rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}
