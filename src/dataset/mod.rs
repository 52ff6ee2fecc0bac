//! Dataset model as it arrives from the host page (or a saved export).
//!
//! The shapes here mirror the JSON document one-to-one so that a dataset can
//! be loaded, normalised, and written back without loss. Optional inputs are
//! modelled with `Option`/`#[serde(default)]`; absence is never an error.

use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::DisplayConfig;
use crate::error::DatasetError;

pub mod id;
pub mod identity;
pub mod normalize;

pub use id::NodeId;
pub use identity::{IdentityCache, NodeIdentityMap, node_count, resolve};
pub use normalize::normalize;

/// An attribute value attached to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	/// JSON `null`; treated as "no value".
	Null,
	/// A boolean flag.
	Bool(bool),
	/// A number.
	Number(f64),
	/// Free text, or a category label.
	Text(String),
}

impl AttrValue {
	/// Numeric reading of the value: numbers, and text that parses as a finite number.
	pub fn numeric(&self) -> Option<f64> {
		match self {
			AttrValue::Number(n) if n.is_finite() => Some(*n),
			AttrValue::Text(t) => t.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
			_ => None,
		}
	}

	/// Truth reading used by binary attributes.
	pub fn as_bool(&self) -> bool {
		match self {
			AttrValue::Bool(b) => *b,
			AttrValue::Number(n) => *n != 0.0 && !n.is_nan(),
			AttrValue::Text(t) => t == "true",
			AttrValue::Null => false,
		}
	}

	/// Whether the value is JSON `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, AttrValue::Null)
	}
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttrValue::Null => Ok(()),
			AttrValue::Bool(b) => write!(f, "{}", b),
			AttrValue::Number(n) => write!(f, "{}", n),
			AttrValue::Text(t) => f.write_str(t),
		}
	}
}

impl From<f64> for AttrValue {
	fn from(n: f64) -> Self {
		AttrValue::Number(n)
	}
}

impl From<bool> for AttrValue {
	fn from(b: bool) -> Self {
		AttrValue::Bool(b)
	}
}

impl From<&str> for AttrValue {
	fn from(s: &str) -> Self {
		AttrValue::Text(s.to_string())
	}
}

/// Attributes of a single node, keyed by attribute name.
pub type NodeAttributes = IndexMap<String, AttrValue>;

/// One `[source, target, weight?]` edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
	/// Source endpoint, as written in the edge list.
	pub source: NodeId,
	/// Target endpoint, as written in the edge list.
	pub target: NodeId,
	/// Weight as given; `None` when the edge has no third element or it does not parse.
	pub weight: Option<f64>,
}

impl EdgeRecord {
	/// Build an edge from anything convertible to identifiers.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: Option<f64>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight,
		}
	}

	/// Effective weight: 1 unless one was given.
	pub fn weight(&self) -> f64 {
		self.weight.unwrap_or(1.0)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeight {
	Number(f64),
	Text(String),
	Other(IgnoredAny),
}

impl RawWeight {
	fn parse(self) -> Option<f64> {
		match self {
			RawWeight::Number(n) => Some(n),
			RawWeight::Text(t) => {
				let parsed = t.trim().parse::<f64>().ok();
				if parsed.is_none() {
					log::debug!("unparsable edge weight {:?}, defaulting to 1", t);
				}
				parsed
			}
			RawWeight::Other(_) => None,
		}
	}
}

struct EdgeVisitor;

impl<'de> Visitor<'de> for EdgeVisitor {
	type Value = EdgeRecord;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("an edge [source, target, weight?]")
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<EdgeRecord, A::Error> {
		let source: NodeId = seq
			.next_element()?
			.ok_or_else(|| de::Error::invalid_length(0, &self))?;
		let target: NodeId = seq
			.next_element()?
			.ok_or_else(|| de::Error::invalid_length(1, &self))?;
		let weight = seq.next_element::<RawWeight>()?.and_then(RawWeight::parse);
		while seq.next_element::<IgnoredAny>()?.is_some() {}
		Ok(EdgeRecord {
			source,
			target,
			weight,
		})
	}
}

impl<'de> Deserialize<'de> for EdgeRecord {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_seq(EdgeVisitor)
	}
}

impl Serialize for EdgeRecord {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let len = if self.weight.is_some() { 3 } else { 2 };
		let mut seq = serializer.serialize_seq(Some(len))?;
		seq.serialize_element(&self.source)?;
		seq.serialize_element(&self.target)?;
		if let Some(w) = self.weight {
			seq.serialize_element(&w)?;
		}
		seq.end()
	}
}

/// Node identifier → attributes, in first-seen order.
///
/// On input a bare integer `n` is also accepted and stands for nodes `0..n`
/// without attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeTable(IndexMap<NodeId, NodeAttributes>);

impl NodeTable {
	/// An empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// A table of `count` attribute-less nodes `0..count`.
	pub fn with_count(count: usize) -> Self {
		Self((0..count).map(|i| (NodeId::from(i), NodeAttributes::new())).collect())
	}

	/// Set one attribute, creating the node entry if needed.
	pub fn set(&mut self, id: NodeId, attribute: &str, value: AttrValue) {
		self.0
			.entry(id)
			.or_default()
			.insert(attribute.to_string(), value);
	}
}

impl Deref for NodeTable {
	type Target = IndexMap<NodeId, NodeAttributes>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for NodeTable {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl FromIterator<(NodeId, NodeAttributes)> for NodeTable {
	fn from_iter<I: IntoIterator<Item = (NodeId, NodeAttributes)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// Largest node count a dataset may declare, either as a layer's bare
/// `nodes` count or as the display `N`.
pub const MAX_NODE_COUNT: usize = 1_000_000;

struct NodeTableVisitor;

impl<'de> Visitor<'de> for NodeTableVisitor {
	type Value = NodeTable;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "a node table or a node count of at most {}", MAX_NODE_COUNT)
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeTable, E> {
		usize::try_from(v)
			.ok()
			.filter(|count| *count <= MAX_NODE_COUNT)
			.map(NodeTable::with_count)
			.ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeTable, E> {
		match u64::try_from(v) {
			Ok(v) => self.visit_u64(v),
			Err(_) => Ok(NodeTable::new()),
		}
	}

	fn visit_unit<E: de::Error>(self) -> Result<NodeTable, E> {
		Ok(NodeTable::new())
	}

	fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeTable, A::Error> {
		let mut table = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
		while let Some((id, attrs)) = map.next_entry::<NodeId, Option<NodeAttributes>>()? {
			table.insert(id, attrs.unwrap_or_default());
		}
		Ok(NodeTable(table))
	}
}

impl<'de> Deserialize<'de> for NodeTable {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(NodeTableVisitor)
	}
}

/// Per-node values of a metadata attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValues {
	/// One value per node, the list position being the node identifier.
	List(Vec<AttrValue>),
	/// Explicit identifier → value map.
	Map(IndexMap<NodeId, AttrValue>),
}

impl MetadataValues {
	/// Non-null `(identifier, value)` pairs in document order.
	pub fn entries(&self) -> Vec<(NodeId, &AttrValue)> {
		match self {
			MetadataValues::List(values) => values
				.iter()
				.enumerate()
				.filter(|(_, v)| !v.is_null())
				.map(|(i, v)| (NodeId::from(i), v))
				.collect(),
			MetadataValues::Map(values) => values
				.iter()
				.filter(|(_, v)| !v.is_null())
				.map(|(id, v)| (id.clone(), v))
				.collect(),
		}
	}
}

/// A named attribute definition: optional type, category labels, and values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
	/// Explicit type name (`binary`, `categorical`, `scalar`); inferred when absent.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Ordered category labels; integer node values index into this list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub categories: Option<Vec<AttrValue>>,
	/// Per-node values.
	#[serde(default, alias = "value", skip_serializing_if = "Option::is_none")]
	pub values: Option<MetadataValues>,
}

/// Attribute name → definition.
pub type Metadata = IndexMap<String, MetadataAttribute>;

/// One edge/node/metadata snapshot within a network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
	/// Edges of this layer.
	#[serde(default, alias = "adjList")]
	pub edge_list: Vec<EdgeRecord>,
	/// Layer-level node table; always populated after normalisation.
	#[serde(default)]
	pub nodes: NodeTable,
	/// Layer-level attribute definitions.
	#[serde(default, alias = "labels", skip_serializing_if = "IndexMap::is_empty")]
	pub metadata: Metadata,
}

/// A named graph made of one or more layers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
	/// Edge list of a single-layer network written without `layers`.
	#[serde(default, alias = "adjList", skip_serializing_if = "Option::is_none")]
	pub edge_list: Option<Vec<EdgeRecord>>,
	/// Node table of a single-layer network written without `layers`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nodes: Option<NodeTable>,
	/// Metadata of a single-layer network written without `layers`.
	#[serde(default, alias = "labels", skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Metadata>,
	/// Explicit layers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub layers: Option<Vec<Layer>>,
}

impl Network {
	/// Layers of the network; empty until normalised if written without `layers`.
	pub fn layers(&self) -> &[Layer] {
		self.layers.as_deref().unwrap_or(&[])
	}
}

/// Top-level document: networks plus display configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
	/// Networks in document order.
	#[serde(default, alias = "network")]
	pub networks: IndexMap<String, Network>,
	/// Display options and dataset-level metadata.
	#[serde(default)]
	pub display: DisplayConfig,
}

impl Dataset {
	/// Parse a dataset document.
	pub fn from_json(text: &str) -> Result<Self, DatasetError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Serialise the dataset back to the document shape.
	pub fn to_json(&self) -> Result<String, DatasetError> {
		Ok(serde_json::to_string(self)?)
	}

	/// The layer at `(network, layer)`, if both exist.
	pub fn layer(&self, network: &str, layer: usize) -> Option<&Layer> {
		self.networks.get(network)?.layers().get(layer)
	}
}
