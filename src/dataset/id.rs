//! Tagged node identifiers.
//!
//! Identifiers show up as JSON numbers in edge lists and as object keys
//! (always strings) in node tables and metadata maps. Everything is coerced
//! once, at deserialisation time, so that `"7"` and `7` name the same node
//! wherever they appear.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Largest integer that an `f64` represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A raw node identifier after coercion.
#[derive(Clone, Debug)]
pub enum NodeId {
	/// A finite number, either given as one or parsed from a numeric string.
	Number(f64),
	/// Anything that does not read as a finite number.
	Text(String),
}

impl NodeId {
	/// Coerce a textual identifier: numeric text becomes a number.
	///
	/// Surrounding whitespace is ignored when testing for a number; an empty
	/// string stays text.
	pub fn parse(raw: &str) -> Self {
		let trimmed = raw.trim();
		if !trimmed.is_empty() {
			if let Ok(n) = trimmed.parse::<f64>() {
				if n.is_finite() {
					return NodeId::from(n);
				}
			}
		}
		NodeId::Text(raw.to_string())
	}

	/// The identifier as a zero-based position, when it is a non-negative integer.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			NodeId::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < MAX_EXACT_INT => {
				Some(*n as usize)
			}
			_ => None,
		}
	}

	fn integral(n: f64) -> Option<i64> {
		(n.fract() == 0.0 && n.abs() < MAX_EXACT_INT).then_some(n as i64)
	}
}

impl From<f64> for NodeId {
	fn from(n: f64) -> Self {
		// -0 and 0 are the same node
		NodeId::Number(if n == 0.0 { 0.0 } else { n })
	}
}

impl From<usize> for NodeId {
	fn from(n: usize) -> Self {
		NodeId::Number(n as f64)
	}
}

impl From<&str> for NodeId {
	fn from(s: &str) -> Self {
		NodeId::parse(s)
	}
}

impl PartialEq for NodeId {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(NodeId::Number(a), NodeId::Number(b)) => a.to_bits() == b.to_bits(),
			(NodeId::Text(a), NodeId::Text(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for NodeId {}

impl Hash for NodeId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self {
			NodeId::Number(n) => {
				0u8.hash(state);
				n.to_bits().hash(state);
			}
			NodeId::Text(s) => {
				1u8.hash(state);
				s.hash(state);
			}
		}
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Number(n) => write!(f, "{}", n),
			NodeId::Text(s) => f.write_str(s),
		}
	}
}

impl Serialize for NodeId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			// serde_json quotes integer map keys, so this works for both edge
			// endpoints and node-table keys
			NodeId::Number(n) => match NodeId::integral(*n) {
				Some(i) => serializer.serialize_i64(i),
				None => serializer.collect_str(self),
			},
			NodeId::Text(s) => serializer.serialize_str(s),
		}
	}
}

struct NodeIdVisitor;

impl<'de> Visitor<'de> for NodeIdVisitor {
	type Value = NodeId;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a node identifier (string or number)")
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
		Ok(NodeId::from(v as f64))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
		Ok(NodeId::from(v as f64))
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> Result<NodeId, E> {
		if v.is_finite() {
			Ok(NodeId::from(v))
		} else {
			Ok(NodeId::Text(v.to_string()))
		}
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
		Ok(NodeId::parse(v))
	}

	fn visit_bool<E: de::Error>(self, v: bool) -> Result<NodeId, E> {
		Ok(NodeId::Text(v.to_string()))
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(NodeIdVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_text_coerces_to_number() {
		assert_eq!(NodeId::parse("7"), NodeId::Number(7.0));
		assert_eq!(NodeId::parse(" 2.5 "), NodeId::Number(2.5));
		assert_eq!(NodeId::parse("-0"), NodeId::Number(0.0));
	}

	#[test]
	fn non_numeric_text_stays_text() {
		assert_eq!(NodeId::parse("dane"), NodeId::Text("dane".into()));
		assert_eq!(NodeId::parse(""), NodeId::Text(String::new()));
		assert_eq!(NodeId::parse("inf"), NodeId::Text("inf".into()));
		assert_eq!(NodeId::parse("NaN"), NodeId::Text("NaN".into()));
	}

	#[test]
	fn json_number_and_string_key_are_the_same_node() {
		let from_edge: NodeId = serde_json::from_str("3").unwrap();
		let from_key: NodeId = serde_json::from_str("\"3\"").unwrap();
		assert_eq!(from_edge, from_key);
	}

	#[test]
	fn integral_numbers_serialize_as_integers() {
		assert_eq!(serde_json::to_string(&NodeId::from(4usize)).unwrap(), "4");
		assert_eq!(serde_json::to_string(&NodeId::from(1.5)).unwrap(), "\"1.5\"");
		assert_eq!(serde_json::to_string(&NodeId::from("a")).unwrap(), "\"a\"");
	}

	#[test]
	fn display_drops_trailing_zero() {
		assert_eq!(NodeId::from(12usize).to_string(), "12");
		assert_eq!(NodeId::from(0.25).to_string(), "0.25");
	}

	#[test]
	fn as_index_only_for_non_negative_integers() {
		assert_eq!(NodeId::from(3usize).as_index(), Some(3));
		assert_eq!(NodeId::from(-1.0).as_index(), None);
		assert_eq!(NodeId::from(1.5).as_index(), None);
		assert_eq!(NodeId::from("x").as_index(), None);
	}
}
