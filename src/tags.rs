//! Common tag injection.
//!
//! Resource types disagree on how tags are represented: most take an
//! ordered list of key/value records, a few take a plain string map. The
//! closed [`Tags`] union covers both shapes with one merge implementation
//! per variant, and [`add_common_tags`] runs once after composition to fold
//! a fixed common tag set into every resource that supports tags.

use crate::expr::{Value, AWS_STACK_NAME};
use crate::template::Template;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Tag key applied to every taggable resource in the stack.
pub const STACK_NAME_TAG: &str = "webstacks:stack-name";

/// The tag container representation a resource type expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    /// `[{"Key": ..., "Value": ...}, ...]`
    KeyValueList,
    /// `{"key": value, ...}`
    StringMap,
}

/// One key/value tag entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: Value,
}

/// A populated tag container in one of the supported shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Tags {
    KeyValueList(Vec<Tag>),
    StringMap(IndexMap<String, Value>),
}

impl Tags {
    /// An empty container of the given shape.
    pub fn empty(shape: TagShape) -> Self {
        match shape {
            TagShape::KeyValueList => Tags::KeyValueList(Vec::new()),
            TagShape::StringMap => Tags::StringMap(IndexMap::new()),
        }
    }

    /// A key/value list holding a single `Name` tag, the most common case
    /// in resource definitions.
    pub fn name(value: Value) -> Self {
        Tags::KeyValueList(vec![Tag { key: "Name".to_string(), value }])
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tags::KeyValueList(tags) => tags.serialize(serializer),
            Tags::StringMap(tags) => {
                let mut map = serializer.serialize_map(Some(tags.len()))?;
                for (key, value) in tags {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

fn common_entries() -> Vec<Tag> {
    vec![Tag { key: STACK_NAME_TAG.to_string(), value: Value::Ref(AWS_STACK_NAME.to_string()) }]
}

/// Merges the common tag set under `existing`; the resource's own entries
/// win on key collision.
fn merge(existing: Tags) -> Tags {
    let mut merged: IndexMap<String, Value> =
        common_entries().into_iter().map(|tag| (tag.key, tag.value)).collect();
    match existing {
        Tags::KeyValueList(own) => {
            for tag in own {
                merged.insert(tag.key, tag.value);
            }
            Tags::KeyValueList(
                merged.into_iter().map(|(key, value)| Tag { key, value }).collect(),
            )
        }
        Tags::StringMap(own) => {
            merged.extend(own);
            Tags::StringMap(merged)
        }
    }
}

/// Injects the common tag set into every registered resource that declares
/// a tag shape. A resource with no tags yet ends up with exactly the common
/// set in its declared container shape; resources whose type has no tags
/// property are left untouched.
pub fn add_common_tags(template: &mut Template) {
    for resource in template.resources.values_mut() {
        let Some(shape) = resource.tag_shape else {
            continue;
        };
        let existing = resource.tags.take().unwrap_or_else(|| Tags::empty(shape));
        resource.tags = Some(merge(existing));
    }
}
