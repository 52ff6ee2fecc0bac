//! Dense node indices per (network, layer).

use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;

use super::{Dataset, NodeId};

/// First-seen bijection from identifier to index in `[0, len)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeIdentityMap {
	ids: IndexSet<NodeId>,
}

impl NodeIdentityMap {
	/// Assign the next free index to `id` unless it already has one.
	pub fn insert(&mut self, id: NodeId) -> usize {
		self.ids.insert_full(id).0
	}

	/// Index of an identifier.
	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.ids.get_index_of(id)
	}

	/// Identifier holding an index.
	pub fn id_at(&self, index: usize) -> Option<&NodeId> {
		self.ids.get_index(index)
	}

	/// Number of distinct identifiers.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// No identifier has been seen.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Identifiers in index order.
	pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
		self.ids.iter()
	}
}

/// Build the identity map of one layer.
///
/// Sources, in order: the layer's edge endpoints, the dataset-level node
/// table, the layer's node table. Missing networks or layers resolve to an
/// empty map.
pub fn resolve(dataset: &Dataset, network: &str, layer: usize) -> NodeIdentityMap {
	let mut map = NodeIdentityMap::default();
	let Some(layer) = dataset.layer(network, layer) else {
		return map;
	};

	for edge in &layer.edge_list {
		map.insert(edge.source.clone());
		map.insert(edge.target.clone());
	}
	if let Some(nodes) = &dataset.display.nodes {
		for id in nodes.keys() {
			map.insert(id.clone());
		}
	}
	for id in layer.nodes.keys() {
		map.insert(id.clone());
	}
	map
}

/// Global node count: the largest identity map over every layer, or the
/// dataset's explicit count if that is larger.
pub fn node_count(dataset: &Dataset) -> usize {
	let observed = dataset
		.networks
		.iter()
		.flat_map(|(name, network)| {
			(0..network.layers().len()).map(move |layer| resolve(dataset, name, layer).len())
		})
		.max()
		.unwrap_or(0);
	let count = dataset.display.node_count.map_or(observed, |n| n.max(observed));
	debug!("node count: observed {}, using {}", observed, count);
	count
}

/// Identity maps memoised per (network, layer), dropped whenever the global
/// node count changes.
#[derive(Clone, Debug, Default)]
pub struct IdentityCache {
	node_count: usize,
	maps: HashMap<(String, usize), NodeIdentityMap>,
}

impl IdentityCache {
	/// Record the current global node count, invalidating on change.
	pub fn set_node_count(&mut self, node_count: usize) {
		if node_count != self.node_count {
			self.maps.clear();
			self.node_count = node_count;
		}
	}

	/// Cached map for a layer, resolving it on first use.
	pub fn get(&mut self, dataset: &Dataset, network: &str, layer: usize) -> &NodeIdentityMap {
		self.maps
			.entry((network.to_string(), layer))
			.or_insert_with(|| resolve(dataset, network, layer))
	}

	/// Number of memoised maps.
	pub fn len(&self) -> usize {
		self.maps.len()
	}

	/// Nothing memoised yet.
	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::{EdgeRecord, Layer, Network, NodeAttributes, NodeTable, normalize};

	fn dataset_with(layer: Layer, shared: Option<NodeTable>) -> Dataset {
		let mut ds = Dataset::default();
		ds.networks.insert(
			"g".into(),
			Network {
				layers: Some(vec![layer]),
				..Network::default()
			},
		);
		ds.display.nodes = shared;
		ds
	}

	#[test]
	fn edges_then_shared_then_layer_nodes() {
		let layer = Layer {
			edge_list: vec![EdgeRecord::new("b", "a", None), EdgeRecord::new("a", "c", None)],
			nodes: [(NodeId::from("z"), NodeAttributes::new())]
				.into_iter()
				.collect(),
			..Layer::default()
		};
		let shared: NodeTable = [
			(NodeId::from("c"), NodeAttributes::new()),
			(NodeId::from("y"), NodeAttributes::new()),
		]
		.into_iter()
		.collect();
		let map = resolve(&dataset_with(layer, Some(shared)), "g", 0);

		let order: Vec<String> = map.iter().map(|id| id.to_string()).collect();
		assert_eq!(order, ["b", "a", "c", "y", "z"]);
		assert_eq!(map.index_of(&NodeId::from("c")), Some(2));
	}

	#[test]
	fn numeric_string_keys_merge_with_numeric_endpoints() {
		let ds = Dataset::from_json(
			r#"{"networks": {"g": {"edgeList": [[1, 2]], "nodes": {"2": {}, "3": {}}}}}"#,
		)
		.unwrap();
		let map = resolve(&normalize(ds), "g", 0);
		assert_eq!(map.len(), 3);
		assert_eq!(map.index_of(&NodeId::from(3usize)), Some(2));
	}

	#[test]
	fn missing_layer_resolves_empty() {
		let ds = dataset_with(Layer::default(), None);
		assert!(resolve(&ds, "g", 4).is_empty());
		assert!(resolve(&ds, "nope", 0).is_empty());
	}

	#[test]
	fn explicit_count_only_wins_when_larger() {
		let layer = Layer {
			edge_list: vec![EdgeRecord::new(0usize, 1usize, None)],
			..Layer::default()
		};
		let mut ds = dataset_with(layer, None);
		assert_eq!(node_count(&ds), 2);
		ds.display.node_count = Some(5);
		assert_eq!(node_count(&ds), 5);
		ds.display.node_count = Some(1);
		assert_eq!(node_count(&ds), 2);
	}

	#[test]
	fn cache_is_dropped_when_node_count_changes() {
		let ds = dataset_with(Layer::default(), None);
		let mut cache = IdentityCache::default();
		cache.set_node_count(3);
		cache.get(&ds, "g", 0);
		assert_eq!(cache.len(), 1);
		cache.set_node_count(3);
		assert_eq!(cache.len(), 1);
		cache.set_node_count(4);
		assert!(cache.is_empty());
	}
}
