//! Parameter default overrides.
//!
//! Lets an external file override the hardcoded `Default` of otherwise
//! fixed parameter declarations at template creation time. The file is a
//! flat name-to-value mapping, parsed as JSON first and YAML second.

use crate::error::{Error, Result};
use crate::template::Parameter;
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

/// A flat table of parameter-name to default-value overrides.
///
/// Example file:
///
/// ```json
/// {
///     "AMI": "ami-078c57a94e9bdc6e0",
///     "ContainerInstanceType": "t2.medium",
///     "DatabaseClass": "db.t3.medium",
///     "MaxScale": "2"
/// }
/// ```
#[derive(Debug, Default)]
pub struct Defaults {
    values: IndexMap<String, String>,
}

impl Defaults {
    /// Loads overrides from a JSON or YAML file. Scalar values are coerced
    /// to their string form; nested values are rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading parameter defaults from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let raw: IndexMap<String, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(_) => serde_yaml::from_str(&content).map_err(|e| {
                Error::DefaultsError(format!("invalid defaults file format: {}", e))
            })?,
        };

        let mut values = IndexMap::new();
        for (name, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(Error::DefaultsError(format!(
                        "unsupported override value for {}: {}",
                        name, other
                    )))
                }
            };
            values.insert(name, value);
        }
        Ok(Defaults { values })
    }

    /// Records a single override (primarily for tests).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replaces the parameter's default with the configured override, if
    /// one exists for its name.
    pub fn apply(&self, mut parameter: Parameter) -> Parameter {
        if let Some(value) = self.values.get(&parameter.name) {
            parameter.default = Some(value.clone());
        }
        parameter
    }
}
