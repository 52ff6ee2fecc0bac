//! Visual encodings: from a selected attribute to per-node colors and sizes.
//!
//! Each channel runs the same three steps: pull the raw value of every node,
//! pick an [`EncodingKind`] from the attribute's type, then scale the raw
//! values into channel space and summarise them in a [`Legend`].

use std::cmp::Ordering;
use std::fmt;

use log::{debug, warn};

use crate::dataset::AttrValue;
use crate::session::NodeRecord;

pub mod classify;
pub mod color;
pub mod legend;
pub mod scale;

pub use classify::{
	AttributeDescriptor, AttributeRegistry, AttributeType, DEGREE_ATTRIBUTE, NONE_ATTRIBUTE,
	classify,
};
pub use color::{NEUTRAL, Rgb};
pub use legend::{Legend, legend};
pub use scale::{LinearScale, LinkScales};

/// Most categories drawn from a discrete palette; more degrade to ranks.
pub const MAX_PALETTE_CATEGORIES: usize = 9;

/// A visual channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
	Color,
	Size,
}

impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Channel::Color => f.write_str("color"),
			Channel::Size => f.write_str("size"),
		}
	}
}

/// How a channel currently encodes its attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodingKind {
	/// Nothing selected; constant output.
	None,
	/// Booleans, optionally inverted.
	Binary { invert: bool },
	/// At most [`MAX_PALETTE_CATEGORIES`] ordered categories on a palette.
	Categorical { categories: Vec<String> },
	/// Numbers on a continuous scale.
	Scalar,
	/// Too many categories for a palette: category ranks on a continuous scale.
	ScalarCategorical { categories: Vec<String> },
}

impl EncodingKind {
	pub fn name(&self) -> &'static str {
		match self {
			EncodingKind::None => "none",
			EncodingKind::Binary { .. } => "binary",
			EncodingKind::Categorical { .. } => "categorical",
			EncodingKind::Scalar => "scalar",
			EncodingKind::ScalarCategorical { .. } => "scalarCategorical",
		}
	}
}

/// Result of encoding the color channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorEncoding {
	/// Attribute driving the channel, `none` when unset.
	pub attribute: String,
	/// How the attribute's values map onto colors.
	pub kind: EncodingKind,
	/// Per-node raw values after inversion or rank substitution.
	pub raw: Vec<Option<AttrValue>>,
	/// Per-node colors.
	pub colors: Vec<Rgb>,
	pub legend: Legend,
	/// Fill of each legend entry.
	pub legend_colors: Vec<Rgb>,
	/// The binary inversion toggle applies.
	pub show_invert: bool,
	/// The palette selector applies.
	pub show_palette: bool,
}

impl ColorEncoding {
	/// Every node in neutral grey.
	pub fn none(node_count: usize) -> Self {
		Self {
			attribute: NONE_ATTRIBUTE.into(),
			kind: EncodingKind::None,
			raw: vec![None; node_count],
			colors: vec![NEUTRAL; node_count],
			legend: Legend::default(),
			legend_colors: Vec::new(),
			show_invert: false,
			show_palette: false,
		}
	}
}

/// Result of encoding the size channel.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeEncoding {
	/// Attribute driving the channel, `none` when unset.
	pub attribute: String,
	/// How the attribute's values map onto radii.
	pub kind: EncodingKind,
	/// Per-node raw values after inversion.
	pub raw: Vec<Option<AttrValue>>,
	/// Per-node radius multipliers.
	pub multipliers: Vec<f64>,
	pub legend: Legend,
	/// Radius multiplier of each legend entry.
	pub legend_multipliers: Vec<f64>,
	/// Largest rendered legend radius (`R`).
	pub max_radius: f64,
	/// The binary inversion toggle applies.
	pub show_invert: bool,
}

impl SizeEncoding {
	/// Every node at the base radius.
	pub fn none(node_count: usize) -> Self {
		Self {
			attribute: NONE_ATTRIBUTE.into(),
			kind: EncodingKind::None,
			raw: vec![None; node_count],
			multipliers: vec![1.0; node_count],
			legend: Legend::default(),
			legend_multipliers: Vec::new(),
			max_radius: 0.0,
			show_invert: false,
		}
	}
}

/// Raw values of an attribute, index-aligned with `nodes`.
pub fn raw_values(nodes: &[NodeRecord], attribute: &str) -> Vec<Option<AttrValue>> {
	nodes
		.iter()
		.map(|node| {
			if attribute == DEGREE_ATTRIBUTE {
				Some(AttrValue::Number(node.degree))
			} else {
				node.attributes.get(attribute).filter(|v| !v.is_null()).cloned()
			}
		})
		.collect()
}

/// Binary raw values: each node's flag XOR `invert`. Missing values read as false.
pub fn binary_values(raw: &[Option<AttrValue>], invert: bool) -> Vec<Option<AttrValue>> {
	raw.iter()
		.map(|v| {
			let flag = v.as_ref().is_some_and(AttrValue::as_bool);
			Some(AttrValue::Bool(flag ^ invert))
		})
		.collect()
}

/// Order category labels: numerically when every label is a number, otherwise
/// lexicographically. Duplicates are dropped.
pub fn order_categories(labels: impl IntoIterator<Item = String>) -> Vec<String> {
	let mut labels: Vec<String> = labels.into_iter().collect();
	let numeric = labels
		.iter()
		.all(|l| l.trim().parse::<f64>().is_ok_and(f64::is_finite));
	if numeric {
		labels.sort_by(|a, b| match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
			(Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
			_ => Ordering::Equal,
		});
	} else {
		labels.sort();
	}
	labels.dedup();
	labels
}

/// Category order for an attribute: declared categories when present,
/// otherwise the distinct observed values.
fn categories_for(descriptor: &AttributeDescriptor, raw: &[Option<AttrValue>]) -> Vec<String> {
	match &descriptor.categories {
		Some(declared) => order_categories(declared.iter().map(|c| c.to_string())),
		None => order_categories(raw.iter().flatten().map(|v| v.to_string())),
	}
}

fn position(categories: &[String], value: &Option<AttrValue>) -> Option<usize> {
	let label = value.as_ref()?.to_string();
	categories.iter().position(|c| *c == label)
}

/// Encode the color channel for `descriptor`.
pub fn encode_color(
	nodes: &[NodeRecord],
	descriptor: &AttributeDescriptor,
	invert: bool,
	palette_name: &str,
) -> ColorEncoding {
	let raw = raw_values(nodes, &descriptor.name);
	let mut encoding = ColorEncoding::none(nodes.len());
	encoding.attribute = descriptor.name.clone();

	match descriptor.kind {
		AttributeType::None => {
			encoding.attribute = NONE_ATTRIBUTE.into();
		}
		AttributeType::Binary => {
			let raw = binary_values(&raw, invert);
			let palette = color::palette(palette_name, 2);
			let pick = |v: &Option<AttrValue>| {
				let index = usize::from(v.as_ref().is_some_and(AttrValue::as_bool));
				palette.get(index).copied().unwrap_or(NEUTRAL)
			};
			encoding.kind = EncodingKind::Binary { invert };
			encoding.colors = raw.iter().map(pick).collect();
			encoding.legend = legend(&raw, &encoding.kind);
			encoding.legend_colors = encoding
				.legend
				.values
				.iter()
				.map(|v| pick(&Some(v.clone())))
				.collect();
			encoding.raw = raw;
			encoding.show_invert = true;
		}
		AttributeType::Categorical => {
			let categories = categories_for(descriptor, &raw);
			if categories.len() <= MAX_PALETTE_CATEGORIES {
				let palette = color::palette(palette_name, categories.len());
				encoding.colors = raw
					.iter()
					.map(|v| {
						position(&categories, v)
							.and_then(|i| palette.get(i).copied())
							.unwrap_or(NEUTRAL)
					})
					.collect();
				encoding.legend_colors = palette;
				encoding.kind = EncodingKind::Categorical { categories };
				encoding.legend = legend(&raw, &encoding.kind);
				encoding.raw = raw;
				encoding.show_palette = true;
			} else {
				debug!(
					"{} categories for {:?}, coloring by rank",
					categories.len(),
					descriptor.name
				);
				let ranks: Vec<Option<AttrValue>> = raw
					.iter()
					.map(|v| position(&categories, v).map(|i| AttrValue::Number(i as f64)))
					.collect();
				encoding.kind = EncodingKind::ScalarCategorical { categories };
				scalar_colors(&mut encoding, ranks);
			}
		}
		AttributeType::Scalar => {
			let numbers = raw
				.iter()
				.map(|v| v.as_ref().and_then(AttrValue::numeric).map(AttrValue::Number))
				.collect();
			encoding.kind = EncodingKind::Scalar;
			scalar_colors(&mut encoding, numbers);
		}
	}
	encoding
}

fn scalar_colors(encoding: &mut ColorEncoding, raw: Vec<Option<AttrValue>>) {
	let numbers = |values: &[Option<AttrValue>]| -> Vec<Option<f64>> {
		values
			.iter()
			.map(|v| v.as_ref().and_then(AttrValue::numeric))
			.collect()
	};
	let values = numbers(&raw);
	let scale = LinearScale::over(values.iter().flatten().copied(), scale::UNIT_RANGE);
	debug!("color scale domain {:?}", scale.domain);

	encoding.colors = values
		.iter()
		.map(|v| v.map_or(NEUTRAL, |x| color::color_wheel(scale.apply(x))))
		.collect();
	encoding.legend = legend(&raw, &encoding.kind);
	encoding.legend_colors = encoding
		.legend
		.values
		.iter()
		.filter_map(AttrValue::numeric)
		.map(|x| color::color_wheel(scale.apply(x)))
		.collect();
	encoding.raw = raw;
}

/// Encode the size channel for `descriptor`; `radius` is the base node radius.
pub fn encode_size(
	nodes: &[NodeRecord],
	descriptor: &AttributeDescriptor,
	invert: bool,
	radius: f64,
) -> SizeEncoding {
	let raw = raw_values(nodes, &descriptor.name);
	let mut encoding = SizeEncoding::none(nodes.len());

	match descriptor.kind {
		AttributeType::None => return encoding,
		AttributeType::Categorical => {
			warn!("categorical attribute {:?} cannot drive size", descriptor.name);
			return encoding;
		}
		AttributeType::Binary => {
			let raw = binary_values(&raw, invert);
			// the domain always spans false..true, whichever values occur
			let scale = LinearScale::new((0.0, 1.0), scale::SIZE_RANGE);
			let size_of = |v: &AttrValue| scale.apply(if v.as_bool() { 1.0 } else { 0.0 });
			encoding.kind = EncodingKind::Binary { invert };
			encoding.multipliers = raw.iter().flatten().map(size_of).collect();
			encoding.legend = legend(&raw, &encoding.kind);
			encoding.legend_multipliers = encoding.legend.values.iter().map(size_of).collect();
			encoding.raw = raw;
			encoding.show_invert = true;
		}
		AttributeType::Scalar => {
			let is_degree = descriptor.name == DEGREE_ATTRIBUTE;
			let transform = |x: f64| if is_degree { x.sqrt() } else { x };
			let raw: Vec<Option<AttrValue>> = raw
				.iter()
				.map(|v| v.as_ref().and_then(AttrValue::numeric).map(AttrValue::Number))
				.collect();
			let transformed: Vec<Option<f64>> = raw
				.iter()
				.map(|v| v.as_ref().and_then(AttrValue::numeric).map(transform))
				.collect();
			let scale = LinearScale::over(transformed.iter().flatten().copied(), scale::SIZE_RANGE);
			debug!("size scale domain {:?}", scale.domain);

			encoding.kind = EncodingKind::Scalar;
			encoding.multipliers = transformed
				.iter()
				.map(|v| v.map_or(1.0, |x| scale.apply(x)))
				.collect();
			encoding.legend = legend(&raw, &encoding.kind);
			encoding.legend_multipliers = encoding
				.legend
				.values
				.iter()
				.filter_map(AttrValue::numeric)
				.map(|x| scale.apply(transform(x)))
				.collect();
			encoding.raw = raw;
		}
	}

	encoding.attribute = descriptor.name.clone();
	encoding.max_radius = encoding
		.legend_multipliers
		.iter()
		.copied()
		.fold(0.0, f64::max)
		* radius;
	encoding
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;
	use crate::dataset::NodeAttributes;

	fn nodes(attribute: &str, values: &[AttrValue]) -> Vec<NodeRecord> {
		values
			.iter()
			.enumerate()
			.map(|(idx, v)| {
				let mut attributes = NodeAttributes::new();
				attributes.insert(attribute.to_string(), v.clone());
				NodeRecord {
					idx,
					degree: idx as f64,
					name: None,
					position: None,
					attributes,
				}
			})
			.collect()
	}

	fn descriptor(name: &str, kind: AttributeType) -> AttributeDescriptor {
		AttributeDescriptor {
			name: name.into(),
			kind,
			categories: None,
		}
	}

	#[test]
	fn none_is_constant() {
		let ns = nodes("a", &[1.0.into(), 2.0.into()]);
		let color = encode_color(&ns, &descriptor("none", AttributeType::None), false, "Set1");
		assert_eq!(color.colors, [NEUTRAL, NEUTRAL]);
		assert!(color.legend.is_empty());
		let size = encode_size(&ns, &descriptor("none", AttributeType::None), false, 5.0);
		assert_eq!(size.multipliers, [1.0, 1.0]);
		assert!(approx_eq!(f64, size.max_radius, 0.0));
	}

	#[test]
	fn binary_size_uses_fixed_domain() {
		let ns = nodes("isHead", &[false.into(), false.into()]);
		let size = encode_size(&ns, &descriptor("isHead", AttributeType::Binary), false, 5.0);
		assert_eq!(size.multipliers, [0.5, 0.5]);
		assert_eq!(size.legend_multipliers, [0.5, 1.5]);
		assert!(approx_eq!(f64, size.max_radius, 7.5));
		assert!(size.show_invert);

		let inverted = encode_size(&ns, &descriptor("isHead", AttributeType::Binary), true, 5.0);
		assert_eq!(inverted.multipliers, [1.5, 1.5]);
		assert_eq!(inverted.raw, [Some(AttrValue::Bool(true)), Some(AttrValue::Bool(true))]);
	}

	#[test]
	fn binary_inversion_swaps_colors() {
		let ns = nodes("flag", &["true".into(), "false".into()]);
		let d = descriptor("flag", AttributeType::Binary);
		let plain = encode_color(&ns, &d, false, "Set1");
		let inverted = encode_color(&ns, &d, true, "Set1");
		assert_ne!(plain.colors[0], plain.colors[1]);
		assert_eq!(plain.colors[0], inverted.colors[1]);
		assert_eq!(plain.colors[1], inverted.colors[0]);
		assert!(plain.show_invert && !plain.show_palette);
	}

	#[test]
	fn binary_inversion_twice_is_identity() {
		let raw = vec![Some(AttrValue::Bool(true)), None, Some(AttrValue::from("false"))];
		let once = binary_values(&raw, true);
		let twice = binary_values(&once, true);
		assert_eq!(twice, binary_values(&raw, false));
	}

	#[test]
	fn derived_categories_are_sorted() {
		let ns = nodes("texture", &["gooey".into(), "fishy".into(), "chewy".into(), "gooey".into()]);
		let color = encode_color(&ns, &descriptor("texture", AttributeType::Categorical), false, "Set2");
		let EncodingKind::Categorical { categories } = &color.kind else {
			panic!("expected categorical, got {:?}", color.kind);
		};
		assert_eq!(categories, &["chewy", "fishy", "gooey"]);
		let set2 = color::palette("Set2", 3);
		assert_eq!(color.colors, [set2[2], set2[1], set2[0], set2[2]]);
		assert_eq!(color.legend_colors, set2);
		assert!(color.show_palette && !color.show_invert);
	}

	#[test]
	fn numeric_categories_sort_numerically() {
		assert_eq!(
			order_categories(["10", "9", "2", "9"].map(String::from)),
			["2", "9", "10"]
		);
		assert_eq!(order_categories(["b", "10", "a"].map(String::from)), ["10", "a", "b"]);
	}

	#[test]
	fn declared_categories_fix_the_order() {
		let ns = nodes("kind", &["q".into()]);
		let mut d = descriptor("kind", AttributeType::Categorical);
		d.categories = Some(vec!["r".into(), "q".into(), "p".into()]);
		let color = encode_color(&ns, &d, false, "Set1");
		assert_eq!(color.legend.labels, ["p", "q", "r"]);
		assert_eq!(color.colors[0], color.legend_colors[1]);
	}

	#[test]
	fn many_categories_degrade_to_ranks() {
		let values: Vec<AttrValue> = (0..12).map(|i| AttrValue::Text(format!("k{:02}", i))).collect();
		let ns = nodes("label", &values);
		let color = encode_color(&ns, &descriptor("label", AttributeType::Categorical), false, "Set1");
		assert_eq!(color.kind.name(), "scalarCategorical");
		assert_eq!(color.raw[0], Some(AttrValue::Number(0.0)));
		assert_eq!(color.raw[11], Some(AttrValue::Number(11.0)));
		assert_eq!(color.colors[0], color::color_wheel(0.0));
		assert_eq!(color.colors[11], color::color_wheel(1.0));
		assert_eq!(color.legend.len(), 5);
		assert!(!color.show_palette);
	}

	#[test]
	fn scalar_color_runs_cool_to_warm() {
		let ns = nodes("power", &[1.0.into(), 3.0.into(), 5.0.into()]);
		let color = encode_color(&ns, &descriptor("power", AttributeType::Scalar), false, "Set1");
		assert_eq!(color.colors[0], color::color_wheel(0.0));
		assert_eq!(color.colors[1], color::color_wheel(0.5));
		assert_eq!(color.colors[2], color::color_wheel(1.0));
		assert_eq!(color.legend.labels, ["1", "2", "3", "4", "5"]);
		assert_eq!(color.legend_colors.len(), 5);
	}

	#[test]
	fn degree_size_uses_square_root() {
		// degrees are 0, 1, 4 (set from idx below)
		let mut ns = nodes("x", &[0.0.into(), 0.0.into(), 0.0.into()]);
		ns[2].degree = 4.0;
		let size = encode_size(&ns, &descriptor("degree", AttributeType::Scalar), false, 5.0);
		// sqrt: 0, 1, 2 over [0, 2]
		assert_eq!(size.multipliers, [0.5, 1.0, 1.5]);
		assert_eq!(size.legend.labels, ["0", "1", "2", "3", "4"]);
		assert!(approx_eq!(f64, size.legend_multipliers[4], 1.5, epsilon = 1e-9));
		assert!(approx_eq!(f64, size.max_radius, 7.5, epsilon = 1e-9));
	}

	#[test]
	fn missing_scalar_values_stay_neutral() {
		let mut ns = nodes("power", &[2.0.into(), 4.0.into()]);
		ns[1].attributes.clear();
		let size = encode_size(&ns, &descriptor("power", AttributeType::Scalar), false, 5.0);
		assert_eq!(size.multipliers, [1.0, 1.0]);
		let color = encode_color(&ns, &descriptor("power", AttributeType::Scalar), false, "Set1");
		assert_eq!(color.colors[1], NEUTRAL);
	}

	#[test]
	fn categorical_cannot_drive_size() {
		let ns = nodes("texture", &["a".into()]);
		let size = encode_size(&ns, &descriptor("texture", AttributeType::Categorical), false, 5.0);
		assert_eq!(size.kind, EncodingKind::None);
		assert_eq!(size.multipliers, [1.0]);
	}
}
