//! Attribute type inference and the per-layer attribute registry.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::dataset::{AttrValue, Metadata};
use crate::session::NodeRecord;

/// Sentinel attribute meaning "no attribute selected".
pub const NONE_ATTRIBUTE: &str = "none";
/// Built-in attribute holding each node's weighted degree.
pub const DEGREE_ATTRIBUTE: &str = "degree";

/// Semantic type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
	None,
	Binary,
	Categorical,
	Scalar,
}

impl AttributeType {
	/// Parse an explicit type name from a dataset.
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"none" => Some(Self::None),
			"binary" => Some(Self::Binary),
			"categorical" => Some(Self::Categorical),
			"scalar" => Some(Self::Scalar),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Binary => "binary",
			Self::Categorical => "categorical",
			Self::Scalar => "scalar",
		}
	}
}

impl fmt::Display for AttributeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Infer an attribute's type from its observed values.
///
/// Only non-null values take part. An attribute with no observed values is
/// `None`. Text spelling `NaN` or an infinity is not a number here.
pub fn classify<'a>(values: impl IntoIterator<Item = &'a AttrValue>) -> AttributeType {
	let distinct: BTreeSet<String> = values
		.into_iter()
		.filter(|v| !v.is_null())
		.map(|v| v.to_string())
		.collect();

	if distinct.is_empty() {
		AttributeType::None
	} else if distinct.iter().all(|v| v == "true" || v == "false") {
		AttributeType::Binary
	} else if distinct.iter().any(|v| !v.trim().parse::<f64>().is_ok_and(f64::is_finite)) {
		AttributeType::Categorical
	} else {
		AttributeType::Scalar
	}
}

/// What the viewer knows about one attribute of the active layer.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
	pub name: String,
	pub kind: AttributeType,
	/// Declared category labels, if any.
	pub categories: Option<Vec<AttrValue>>,
}

/// Attributes available in the active layer, in discovery order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeRegistry {
	descriptors: IndexMap<String, AttributeDescriptor>,
}

impl AttributeRegistry {
	/// Collect and type every attribute present on `nodes`.
	///
	/// `none` and `degree` always lead the list. An explicit `type` in the
	/// dataset registry overrides inference.
	pub fn build(nodes: &[NodeRecord], registry: &Metadata) -> Self {
		let mut descriptors = IndexMap::new();
		descriptors.insert(
			NONE_ATTRIBUTE.to_string(),
			AttributeDescriptor {
				name: NONE_ATTRIBUTE.into(),
				kind: AttributeType::None,
				categories: None,
			},
		);
		descriptors.insert(
			DEGREE_ATTRIBUTE.to_string(),
			AttributeDescriptor {
				name: DEGREE_ATTRIBUTE.into(),
				kind: AttributeType::Scalar,
				categories: None,
			},
		);

		let names: Vec<&String> = {
			let mut seen = indexmap::IndexSet::new();
			for node in nodes {
				seen.extend(node.attributes.keys());
			}
			seen.into_iter().collect()
		};

		for name in names {
			if descriptors.contains_key(name.as_str()) {
				continue;
			}
			let declared = registry.get(name);
			let explicit = declared
				.and_then(|m| m.kind.as_deref())
				.and_then(AttributeType::from_name)
				.filter(|kind| *kind != AttributeType::None);
			let kind = explicit.unwrap_or_else(|| {
				classify(nodes.iter().filter_map(|n| n.attributes.get(name)))
			});
			debug!("attribute {:?} typed {}", name, kind);
			descriptors.insert(
				name.clone(),
				AttributeDescriptor {
					name: name.clone(),
					kind,
					categories: declared.and_then(|m| m.categories.clone()),
				},
			);
		}

		Self { descriptors }
	}

	pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
		self.descriptors.get(name)
	}

	/// Every attribute, in menu order.
	pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
		self.descriptors.values()
	}

	/// Attributes the color channel may select.
	pub fn color_options(&self) -> Vec<String> {
		self.descriptors.keys().cloned().collect()
	}

	/// Attributes the size channel may select; categorical ones are excluded.
	pub fn size_options(&self) -> Vec<String> {
		self.descriptors
			.values()
			.filter(|d| d.kind != AttributeType::Categorical)
			.map(|d| d.name.clone())
			.collect()
	}

	/// Whether the size channel may select `name`.
	pub fn sizeable(&self, name: &str) -> bool {
		self.get(name)
			.is_some_and(|d| d.kind != AttributeType::Categorical)
	}
}
