//! Display configuration carried in the dataset's `display` object.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{Metadata, NodeTable};

/// A saved node position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
	pub x: f64,
	pub y: f64,
}

/// Viewer options. Every field has a default so a dataset may omit `display` entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConfig {
	/// Repulsion charge.
	#[serde(rename = "c", alias = "charge")]
	pub charge: f64,
	/// Gravity strength toward the centre.
	#[serde(rename = "g", alias = "gravity")]
	pub gravity: f64,
	/// Target link length.
	#[serde(rename = "l", alias = "linkLength")]
	pub link_length: f64,
	/// Base node radius in pixels.
	#[serde(rename = "r", alias = "radius")]
	pub radius: f64,
	pub link_strength: f64,
	pub color_palette: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub network_name: Option<String>,
	pub network_layer: usize,
	/// Dataset-level attribute registry; layer definitions are merged in here.
	#[serde(alias = "labels")]
	pub metadata: Metadata,
	/// Dataset-level node table shared by every network.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub nodes: Option<NodeTable>,
	pub name_to_match: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size_by: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color_by: Option<String>,
	#[serde(alias = "sizeInvertBinary")]
	pub invert_binary_sizes: bool,
	#[serde(alias = "colorInvertBinary")]
	pub invert_binary_colors: bool,
	pub scale_link_width: bool,
	pub scale_link_opacity: bool,
	pub freeze_node_movement: bool,
	pub show_node_names: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_coordinates: Option<Vec<Coordinate>>,
	/// Explicit node count; wins over the observed count when larger.
	#[serde(rename = "N", skip_serializing_if = "Option::is_none")]
	pub node_count: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub w: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub h: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_names: Option<Vec<String>>,
	/// Keys this viewer does not interpret, kept for export.
	#[serde(flatten)]
	pub extra: IndexMap<String, serde_json::Value>,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {
			charge: 60.0,
			gravity: 0.1,
			link_length: 20.0,
			radius: 5.0,
			link_strength: 1.0,
			color_palette: "Set1".into(),
			network_name: None,
			network_layer: 0,
			metadata: Metadata::new(),
			nodes: None,
			name_to_match: String::new(),
			size_by: None,
			color_by: None,
			invert_binary_sizes: false,
			invert_binary_colors: false,
			scale_link_width: false,
			scale_link_opacity: true,
			freeze_node_movement: false,
			show_node_names: false,
			node_coordinates: None,
			node_count: None,
			w: None,
			h: None,
			node_names: None,
			extra: IndexMap::new(),
		}
	}
}
