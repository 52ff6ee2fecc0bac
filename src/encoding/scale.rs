//! Linear scales from a data domain onto a fixed visual range.

/// Range of node size multipliers.
pub const SIZE_RANGE: (f64, f64) = (0.5, 1.5);
/// Range used before mapping a scalar onto the color wheel.
pub const UNIT_RANGE: (f64, f64) = (0.0, 1.0);
/// Link widths when width scaling is on.
pub const LINK_WIDTH_RANGE: (f64, f64) = (0.5, 4.0);
/// Link opacities when opacity scaling is on.
pub const LINK_OPACITY_RANGE: (f64, f64) = (0.4, 0.9);
/// Identity range used when a link scale is switched off.
pub const FLAT_RANGE: (f64, f64) = (1.0, 1.0);

/// Minimum and maximum of the finite values, if there are any.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
	values
		.into_iter()
		.filter(|v| v.is_finite())
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

/// A continuous linear mapping `domain → range`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	pub domain: (f64, f64),
	pub range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	/// A scale over the extent of `values`; an empty input gives the unit domain.
	pub fn over(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
		Self::new(extent(values).unwrap_or((0.0, 1.0)), range)
	}

	/// Map a value. A collapsed domain maps everything to the middle of the range.
	pub fn apply(&self, x: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let span = d1 - d0;
		let t = if span != 0.0 { (x - d0) / span } else { 0.5 };
		r0 + t * (r1 - r0)
	}
}

/// Width and opacity scales for links, both over the extent of edge weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkScales {
	pub width: LinearScale,
	pub opacity: LinearScale,
}

impl LinkScales {
	pub fn new(weights: &[f64], scale_width: bool, scale_opacity: bool) -> Self {
		let domain = extent(weights.iter().copied()).unwrap_or((0.0, 1.0));
		Self {
			width: LinearScale::new(
				domain,
				if scale_width { LINK_WIDTH_RANGE } else { FLAT_RANGE },
			),
			opacity: LinearScale::new(
				domain,
				if scale_opacity { LINK_OPACITY_RANGE } else { FLAT_RANGE },
			),
		}
	}

	/// Stroke width of a link; zero-weight links are not drawn.
	pub fn width(&self, weight: f64) -> f64 {
		if weight == 0.0 { 0.0 } else { self.width.apply(weight) }
	}

	pub fn opacity(&self, weight: f64) -> f64 {
		self.opacity.apply(weight)
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;

	fn close(a: f64, b: f64) -> bool {
		approx_eq!(f64, a, b, epsilon = 1e-9)
	}

	#[test]
	fn maps_endpoints_and_midpoint() {
		let scale = LinearScale::new((0.0, 10.0), SIZE_RANGE);
		assert!(close(scale.apply(0.0), 0.5));
		assert!(close(scale.apply(5.0), 1.0));
		assert!(close(scale.apply(10.0), 1.5));
	}

	#[test]
	fn collapsed_domain_maps_to_middle() {
		let scale = LinearScale::over([3.0, 3.0], SIZE_RANGE);
		assert!(close(scale.apply(3.0), 1.0));
		let unit = LinearScale::over([7.0], UNIT_RANGE);
		assert!(close(unit.apply(7.0), 0.5));
	}

	#[test]
	fn extent_skips_non_finite() {
		assert_eq!(extent([2.0, f64::NAN, -1.0, 5.0]), Some((-1.0, 5.0)));
		assert_eq!(extent(Vec::new()), None);
	}

	#[test]
	fn link_scales_follow_toggles() {
		let flat = LinkScales::new(&[1.0, 3.0], false, false);
		assert!(close(flat.width(3.0), 1.0));
		assert!(close(flat.opacity(1.0), 1.0));

		let scaled = LinkScales::new(&[1.0, 3.0], true, true);
		assert!(close(scaled.width(1.0), 0.5));
		assert!(close(scaled.width(3.0), 4.0));
		assert!(close(scaled.opacity(3.0), 0.9));
		assert!(close(scaled.width(0.0), 0.0));
	}
}
