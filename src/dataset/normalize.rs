//! Canonicalisation of a raw dataset.
//!
//! After [`normalize`] every network has at least one layer, every layer's
//! node table carries its metadata values, and the dataset-level registry
//! (`display.metadata`) holds the merged `type`/`categories` of every
//! attribute seen in any layer. Running it twice changes nothing.

use log::debug;

use super::{Dataset, Layer, Metadata, Network, NodeTable};

/// Normalise a dataset into its canonical multi-network, multi-layer form.
pub fn normalize(mut dataset: Dataset) -> Dataset {
	let registry = &mut dataset.display.metadata;

	for (name, network) in dataset.networks.iter_mut() {
		wrap_implicit_layer(network);
		if let Some(layers) = network.layers.as_mut() {
			for layer in layers.iter_mut() {
				merge_registry(registry, &layer.metadata);
				inject_values(&layer.metadata, &mut layer.nodes);
			}
			debug!("normalised network {:?} with {} layer(s)", name, layers.len());
		}
	}

	let display = &mut dataset.display;
	if !display.metadata.is_empty() || display.nodes.is_some() {
		let nodes = display.nodes.get_or_insert_with(NodeTable::new);
		inject_values(&display.metadata, nodes);
	}
	dataset
}

/// Move top-level `edgeList`/`nodes`/`metadata` into a single layer when the
/// network has none.
fn wrap_implicit_layer(network: &mut Network) {
	let edge_list = network.edge_list.take();
	let nodes = network.nodes.take();
	let metadata = network.metadata.take();

	if network.layers.as_ref().is_some_and(|layers| !layers.is_empty()) {
		return;
	}
	network.layers = Some(vec![Layer {
		edge_list: edge_list.unwrap_or_default(),
		nodes: nodes.unwrap_or_default(),
		metadata: metadata.unwrap_or_default(),
	}]);
}

/// Copy a layer's `type`/`categories` into the global registry. Later layers
/// overwrite earlier ones.
fn merge_registry(registry: &mut Metadata, metadata: &Metadata) {
	for (name, attribute) in metadata {
		let entry = registry.entry(name.clone()).or_default();
		if let Some(categories) = &attribute.categories {
			entry.categories = Some(categories.clone());
		}
		if let Some(kind) = &attribute.kind {
			entry.kind = Some(kind.clone());
		}
	}
}

/// Write each attribute's per-node values into the node table.
fn inject_values(metadata: &Metadata, nodes: &mut NodeTable) {
	for (name, attribute) in metadata {
		let Some(values) = &attribute.values else {
			continue;
		};
		for (id, value) in values.entries() {
			nodes.set(id, name, value.clone());
		}
	}
}
