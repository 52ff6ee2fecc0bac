//! Colors: RGB values, the scalar color wheel, and qualitative palettes.

use std::fmt;

/// Neutral grey used when nothing drives the color channel.
pub const NEUTRAL: Rgb = Rgb::new(100, 100, 100);

/// An sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Parse `#rrggbb`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let hex = hex.strip_prefix('#')?;
		if hex.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Convert from HSL (`h` in degrees, `s` and `l` in `[0, 1]`).
	pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
		let h = h.rem_euclid(360.0);
		let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
		let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
		let m = l - c / 2.0;
		let (r, g, b) = match h {
			h if h < 60.0 => (c, x, 0.0),
			h if h < 120.0 => (x, c, 0.0),
			h if h < 180.0 => (0.0, c, x),
			h if h < 240.0 => (0.0, x, c),
			h if h < 300.0 => (x, 0.0, c),
			_ => (c, 0.0, x),
		};
		let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
		Self::new(to_u8(r), to_u8(g), to_u8(b))
	}

	/// CSS hex notation.
	pub fn to_css(self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Scalar color: `t` in `[0, 1]` runs from blue (210°) to red (0°).
pub fn color_wheel(t: f64) -> Rgb {
	Rgb::from_hsl(210.0 * (1.0 - t), 0.7, 0.5)
}

/// Named qualitative palettes, longest variant of each.
const PALETTES: &[(&str, &[&str])] = &[
	(
		"Set1",
		&[
			"#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628",
			"#f781bf", "#999999",
		],
	),
	(
		"Set2",
		&[
			"#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494",
			"#b3b3b3",
		],
	),
	(
		"Set3",
		&[
			"#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
			"#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
		],
	),
	(
		"Pastel1",
		&[
			"#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6", "#ffffcc", "#e5d8bd",
			"#fddaec", "#f2f2f2",
		],
	),
	(
		"Pastel2",
		&[
			"#b3e2cd", "#fdcdac", "#cbd5e8", "#f4cae4", "#e6f5c9", "#fff2ae", "#f1e2cc",
			"#cccccc",
		],
	),
	(
		"Dark2",
		&[
			"#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d",
			"#666666",
		],
	),
	(
		"Paired",
		&[
			"#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f",
			"#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
		],
	),
	(
		"Accent",
		&[
			"#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17",
			"#666666",
		],
	),
];

/// Name of the palette used when the requested one is unknown.
pub const DEFAULT_PALETTE: &str = "Set1";

/// Names of every available palette.
pub fn palette_names() -> Vec<&'static str> {
	PALETTES.iter().map(|(name, _)| *name).collect()
}

/// `count` colors from the named palette.
///
/// Qualitative schemes are prefixes of their longest variant, so taking the
/// first `count` entries matches the sized scheme. Palettes shorter than
/// `count` cycle.
pub fn palette(name: &str, count: usize) -> Vec<Rgb> {
	let colors = PALETTES
		.iter()
		.find(|(n, _)| *n == name)
		.or_else(|| PALETTES.iter().find(|(n, _)| *n == DEFAULT_PALETTE))
		.map(|(_, colors)| *colors)
		.unwrap_or(&[]);
	if colors.is_empty() {
		return vec![NEUTRAL; count];
	}
	colors
		.iter()
		.cycle()
		.take(count)
		.filter_map(|hex| Rgb::from_hex(hex))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hsl_primaries() {
		assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
		assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
		assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
		assert_eq!(Rgb::from_hsl(0.0, 0.0, 0.5), Rgb::new(128, 128, 128));
	}

	#[test]
	fn wheel_runs_cool_to_warm() {
		// t = 0 → hue 210 (blue-ish), t = 1 → hue 0 (red)
		let cool = color_wheel(0.0);
		let warm = color_wheel(1.0);
		assert!(cool.b > cool.r);
		assert!(warm.r > warm.b);
		assert_eq!(warm, Rgb::from_hsl(0.0, 0.7, 0.5));
		assert_eq!(cool, Rgb::from_hsl(210.0, 0.7, 0.5));
	}

	#[test]
	fn css_hex() {
		assert_eq!(NEUTRAL.to_css(), "#646464");
		assert_eq!(Rgb::from_hex("#e41a1c"), Some(Rgb::new(0xe4, 0x1a, 0x1c)));
		assert_eq!(Rgb::from_hex("e41a1c"), None);
	}

	#[test]
	fn palette_prefix_and_fallback() {
		let set1 = palette("Set1", 3);
		assert_eq!(set1.len(), 3);
		assert_eq!(set1[0].to_css(), "#e41a1c");
		assert_eq!(palette("NoSuchPalette", 2), palette("Set1", 2));
	}

	#[test]
	fn short_palette_cycles() {
		let dark = palette("Dark2", 9);
		assert_eq!(dark.len(), 9);
		assert_eq!(dark[8], dark[0]);
	}
}
