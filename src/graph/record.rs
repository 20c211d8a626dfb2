use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Property bag attached to an entity or relationship.
pub type Properties = Map<String, Value>;

/// A graph database node: a stable identifier plus its properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	#[serde(deserialize_with = "string_id")]
	pub id: String,
	#[serde(default)]
	pub labels: Vec<String>,
	#[serde(default)]
	pub properties: Properties,
}

impl Entity {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Builder-style property setter, mostly useful in tests and demos.
	pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.properties.insert(key.to_owned(), value.into());
		self
	}

	pub fn property(&self, key: &str) -> Option<&Value> {
		self.properties.get(key)
	}
}

/// A typed, directed edge between two entities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
	#[serde(default, deserialize_with = "string_id")]
	pub id: String,
	/// Relationship type. Empty when the source did not report one.
	#[serde(rename = "type", default)]
	pub rel_type: String,
	#[serde(rename = "startNode", default, deserialize_with = "string_id")]
	pub start: String,
	#[serde(rename = "endNode", default, deserialize_with = "string_id")]
	pub end: String,
	#[serde(default)]
	pub properties: Properties,
}

impl Relationship {
	pub fn typed(rel_type: impl Into<String>) -> Self {
		Self {
			rel_type: rel_type.into(),
			..Self::default()
		}
	}
}

/// One row of a `(n)-[r]->(m)` traversal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
	pub source: Entity,
	pub target: Entity,
	pub relationship: Relationship,
}

impl GraphRecord {
	pub fn new(source: Entity, target: Entity, relationship: Relationship) -> Self {
		Self {
			source,
			target,
			relationship,
		}
	}
}

/// Identifiers arrive as strings from newer servers and as integers from older
/// ones. Both are coerced to their string form.
fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(n.to_string()),
		Value::Null => Ok(String::new()),
		other => Err(serde::de::Error::custom(format!(
			"expected string or integer identifier, got {other}"
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn numeric_ids_are_coerced_to_strings() {
		let entity: Entity =
			serde_json::from_value(json!({ "id": 42, "properties": { "name": "x" } })).unwrap();
		assert_eq!(entity.id, "42");
		assert!(entity.labels.is_empty());
		assert_eq!(entity.property("name"), Some(&json!("x")));
	}

	#[test]
	fn relationship_reads_wire_field_names() {
		let rel: Relationship = serde_json::from_value(json!({
			"id": "7",
			"type": "KNOWS",
			"startNode": "1",
			"endNode": 2,
		}))
		.unwrap();
		assert_eq!(rel.rel_type, "KNOWS");
		assert_eq!((rel.start.as_str(), rel.end.as_str()), ("1", "2"));
	}

	#[test]
	fn object_ids_are_rejected() {
		let result: Result<Entity, _> = serde_json::from_value(json!({ "id": { "a": 1 } }));
		assert!(result.is_err());
	}
}
