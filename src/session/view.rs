//! The active network layer as dense, index-aligned node and edge tables.

use std::collections::HashSet;

use log::debug;

use crate::config::Coordinate;
use crate::dataset::{AttrValue, Dataset, NodeAttributes, NodeIdentityMap, NodeTable};

/// Attribute that, when present, supplies a node's display name.
pub const NAME_ATTRIBUTE: &str = "name";

/// One node of the active layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
	pub idx: usize,
	/// Sum of incident edge weights, each unordered pair counted once.
	pub degree: f64,
	pub name: Option<String>,
	/// Seed position from saved coordinates.
	pub position: Option<Coordinate>,
	/// Resolved attribute values, category codes already replaced by labels.
	pub attributes: NodeAttributes,
}

impl NodeRecord {
	/// Name shown next to the node.
	pub fn display_name(&self) -> String {
		self.name.clone().unwrap_or_else(|| self.idx.to_string())
	}
}

/// An edge between two node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeView {
	pub source: usize,
	pub target: usize,
	pub weight: f64,
}

/// Nodes and edges of the selected `(network, layer)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveView {
	pub network: String,
	pub layer: usize,
	pub nodes: Vec<NodeRecord>,
	pub edges: Vec<EdgeView>,
}

impl ActiveView {
	pub fn weights(&self) -> Vec<f64> {
		self.edges.iter().map(|e| e.weight).collect()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}
}

/// Build the view of one layer over `node_count` global nodes.
pub fn build_view(
	dataset: &Dataset,
	identity: &NodeIdentityMap,
	network: &str,
	layer: usize,
	node_count: usize,
) -> ActiveView {
	let display = &dataset.display;
	let coordinates = display.node_coordinates.as_deref().unwrap_or(&[]);
	let mut nodes: Vec<NodeRecord> = (0..node_count)
		.map(|idx| NodeRecord {
			idx,
			position: coordinates.get(idx).copied(),
			..NodeRecord::default()
		})
		.collect();

	let Some(data) = dataset.layer(network, layer) else {
		return ActiveView {
			network: network.to_string(),
			layer,
			nodes,
			edges: Vec::new(),
		};
	};

	// dataset-level values first; the layer's own values win
	if let Some(shared) = &display.nodes {
		apply_table(&mut nodes, identity, shared);
	}
	apply_table(&mut nodes, identity, &data.nodes);
	substitute_categories(&mut nodes, dataset);

	let mut edges = Vec::with_capacity(data.edge_list.len());
	let mut seen = HashSet::new();
	for edge in &data.edge_list {
		let (Some(source), Some(target)) =
			(identity.index_of(&edge.source), identity.index_of(&edge.target))
		else {
			continue;
		};
		let weight = edge.weight();
		if seen.insert((source.min(target), source.max(target))) {
			for end in [source, target] {
				if let Some(node) = nodes.get_mut(end) {
					node.degree += weight;
				}
			}
		}
		edges.push(EdgeView {
			source,
			target,
			weight,
		});
	}

	let node_names = display.node_names.as_deref().unwrap_or(&[]);
	for node in &mut nodes {
		node.name = node
			.attributes
			.get(NAME_ATTRIBUTE)
			.filter(|v| !v.is_null())
			.map(AttrValue::to_string)
			.or_else(|| node_names.get(node.idx).cloned())
			.or_else(|| identity.id_at(node.idx).map(|id| id.to_string()));
	}

	let visible = visible_count(data.nodes.len(), &edges, node_count);
	nodes.truncate(visible);
	debug!(
		"view {}[{}]: {} of {} nodes, {} edges",
		network,
		layer,
		visible,
		node_count,
		edges.len()
	);

	ActiveView {
		network: network.to_string(),
		layer,
		nodes,
		edges,
	}
}

/// Nodes shown for a layer: its declared node table size when it has one
/// (never fewer than the edges reference), otherwise every node.
pub fn visible_count(table_len: usize, edges: &[EdgeView], node_count: usize) -> usize {
	if table_len == 0 {
		return node_count;
	}
	let referenced = edges
		.iter()
		.map(|e| e.source.max(e.target) + 1)
		.max()
		.unwrap_or(0);
	table_len.max(referenced).min(node_count)
}

fn apply_table(nodes: &mut [NodeRecord], identity: &NodeIdentityMap, table: &NodeTable) {
	for (id, attributes) in table.iter() {
		let Some(node) = identity.index_of(id).and_then(|idx| nodes.get_mut(idx)) else {
			continue;
		};
		for (name, value) in attributes {
			node.attributes.insert(name.clone(), value.clone());
		}
	}
}

/// Replace integer codes with their declared category labels.
fn substitute_categories(nodes: &mut [NodeRecord], dataset: &Dataset) {
	for (name, declared) in &dataset.display.metadata {
		let Some(categories) = &declared.categories else {
			continue;
		};
		for node in nodes.iter_mut() {
			let Some(value) = node.attributes.get_mut(name) else {
				continue;
			};
			let code = value
				.numeric()
				.filter(|n| n.fract() == 0.0 && *n >= 0.0)
				.map(|n| n as usize);
			if let Some(label) = code.and_then(|k| categories.get(k)) {
				*value = label.clone();
			}
		}
	}
}
