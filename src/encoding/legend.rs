//! Legends: a handful of representative values per encoding.

use super::EncodingKind;
use crate::dataset::AttrValue;

/// Number of bins used when a range is too wide to enumerate.
pub const LEGEND_BINS: usize = 4;
/// Widest integer range that is listed value by value.
pub const MAX_ENUMERATED_SPAN: f64 = 8.0;

/// Ordered `(value, label)` pairs describing one channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
	/// Representative values in display order.
	pub values: Vec<AttrValue>,
	/// Text shown beside each value.
	pub labels: Vec<String>,
}

impl Legend {
	/// Number of entries.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// A legend with no entries is not drawn.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Numeric legend values; labels are the numbers themselves.
	fn numeric(values: Vec<f64>) -> Self {
		Self {
			labels: values.iter().map(|v| v.to_string()).collect(),
			values: values.into_iter().map(AttrValue::Number).collect(),
		}
	}
}

/// Build the legend for a channel's raw values.
pub fn legend(raw: &[Option<AttrValue>], kind: &EncodingKind) -> Legend {
	match kind {
		EncodingKind::None => Legend::default(),
		EncodingKind::Binary { invert } => Legend {
			values: [false, true]
				.into_iter()
				.map(|v| AttrValue::Bool(v ^ invert))
				.collect(),
			labels: vec!["false".into(), "true".into()],
		},
		EncodingKind::Categorical { categories } => Legend {
			values: categories.iter().map(|c| AttrValue::Text(c.clone())).collect(),
			labels: categories.clone(),
		},
		EncodingKind::Scalar => Legend::numeric(scalar_legend(&numbers(raw))),
		EncodingKind::ScalarCategorical { categories } => {
			let values = binned_legend(&numbers(raw), LEGEND_BINS);
			// label each breakpoint with the category at the nearest rank
			let labels = values
				.iter()
				.map(|rank| {
					let nearest = rank.round().max(0.0) as usize;
					categories
						.get(nearest)
						.cloned()
						.unwrap_or_else(|| rank.to_string())
				})
				.collect();
			Legend {
				values: values.into_iter().map(AttrValue::Number).collect(),
				labels,
			}
		}
	}
}

fn numbers(raw: &[Option<AttrValue>]) -> Vec<f64> {
	raw.iter()
		.filter_map(|v| v.as_ref().and_then(AttrValue::numeric))
		.collect()
}

/// Legend values for scalars: every integer when the values are integers
/// spanning at most [`MAX_ENUMERATED_SPAN`], otherwise binned.
pub fn scalar_legend(values: &[f64]) -> Vec<f64> {
	let Some((min, max)) = super::scale::extent(values.iter().copied()) else {
		return Vec::new();
	};
	let all_integers = values.iter().all(|v| v.fract() == 0.0);
	if all_integers && max - min <= MAX_ENUMERATED_SPAN {
		let (lo, hi) = (min as i64, max as i64);
		(lo..=hi).map(|v| v as f64).collect()
	} else {
		binned_legend(values, LEGEND_BINS)
	}
}

/// `bins + 1` breakpoints: the floored minimum, `bins - 1` interior steps,
/// and the ceiled maximum, all at one decimal place.
pub fn binned_legend(values: &[f64], bins: usize) -> Vec<f64> {
	let Some((min, max)) = super::scale::extent(values.iter().copied()) else {
		return Vec::new();
	};
	let step = (max - min) / bins as f64;
	let mut legend = Vec::with_capacity(bins + 1);
	legend.push(tidy((min * 10.0).floor() / 10.0));
	for i in 1..bins {
		legend.push(tidy(round_tenth(min + i as f64 * step)));
	}
	legend.push(tidy((max * 10.0).ceil() / 10.0));
	legend
}

/// Round half up to one decimal place.
fn round_tenth(x: f64) -> f64 {
	(x * 10.0 + 0.5).floor() / 10.0
}

fn tidy(x: f64) -> f64 {
	// folds -0 into 0
	x + 0.0
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;

	fn assert_points(actual: &[f64], expected: &[f64]) {
		assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
		for (a, e) in actual.iter().zip(expected) {
			assert!(approx_eq!(f64, *a, *e, epsilon = 1e-9), "{:?} vs {:?}", actual, expected);
		}
	}

	fn raw(values: &[f64]) -> Vec<Option<AttrValue>> {
		values.iter().map(|v| Some(AttrValue::Number(*v))).collect()
	}

	#[test]
	fn small_integer_range_is_enumerated() {
		assert_points(&scalar_legend(&[2.0, 4.0, 4.0, 6.0]), &[2.0, 3.0, 4.0, 5.0, 6.0]);
		assert_points(&scalar_legend(&[3.0]), &[3.0]);
		assert_eq!(scalar_legend(&[0.0, 8.0]).len(), 9);
	}

	#[test]
	fn wide_integer_range_is_binned_into_five_points() {
		assert_points(&scalar_legend(&[0.0, 100.0]), &[0.0, 25.0, 50.0, 75.0, 100.0]);
		assert_points(&scalar_legend(&[0.0, 9.0]), &[0.0, 2.3, 4.5, 6.8, 9.0]);
	}

	#[test]
	fn fractional_values_are_binned() {
		assert_points(&scalar_legend(&[0.25, 1.0]), &[0.2, 0.4, 0.6, 0.8, 1.0]);
		assert_points(&binned_legend(&[0.2, 3.1415], 4), &[0.2, 0.9, 1.7, 2.4, 3.2]);
	}

	#[test]
	fn negative_midpoints_round_half_up() {
		assert_points(&binned_legend(&[-1.0, 0.0], 4), &[-1.0, -0.7, -0.5, -0.2, 0.0]);
	}

	#[test]
	fn empty_values_give_empty_legend() {
		assert!(scalar_legend(&[]).is_empty());
		assert!(legend(&[None, None], &EncodingKind::Scalar).is_empty());
	}

	#[test]
	fn scalar_labels_are_plain_numbers() {
		let legend = legend(&raw(&[1.0, 2.0, 3.0]), &EncodingKind::Scalar);
		assert_eq!(legend.labels, ["1", "2", "3"]);
	}

	#[test]
	fn binary_legend_follows_inversion() {
		let plain = legend(&[], &EncodingKind::Binary { invert: false });
		assert_eq!(plain.values, [AttrValue::Bool(false), AttrValue::Bool(true)]);
		assert_eq!(plain.labels, ["false", "true"]);

		let inverted = legend(&[], &EncodingKind::Binary { invert: true });
		assert_eq!(inverted.values, [AttrValue::Bool(true), AttrValue::Bool(false)]);
		assert_eq!(inverted.labels, ["false", "true"]);
	}

	#[test]
	fn categorical_legend_lists_every_category() {
		let categories = vec!["chewy".to_string(), "fishy".into(), "gooey".into()];
		let legend = legend(&[], &EncodingKind::Categorical { categories });
		assert_eq!(legend.labels, ["chewy", "fishy", "gooey"]);
		assert_eq!(legend.values[1], AttrValue::from("fishy"));
	}

	#[test]
	fn ranked_categories_bin_over_ranks() {
		let categories: Vec<String> = (0..12).map(|i| format!("c{:02}", i)).collect();
		let ranks: Vec<f64> = (0..12).map(|i| i as f64).collect();
		let legend = legend(&raw(&ranks), &EncodingKind::ScalarCategorical { categories });
		assert_eq!(legend.len(), 5);
		let points: Vec<f64> = legend.values.iter().filter_map(AttrValue::numeric).collect();
		assert_points(&points, &[0.0, 2.8, 5.5, 8.3, 11.0]);
		assert_eq!(legend.labels, ["c00", "c03", "c06", "c08", "c11"]);
	}
}
