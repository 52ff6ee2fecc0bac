//! The viewer session: one dataset, its current selections, and everything
//! derived from them.
//!
//! A [`Session`] is the only owner of viewer state. Events go in through
//! [`Session::apply`]; every display-affecting event reruns the pipeline in
//! dependency order (identity, view, attribute registry, encodings, legends)
//! so no stage ever reads a stale result of an earlier one.

use log::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::dataset::{Dataset, IdentityCache, MAX_NODE_COUNT, node_count, normalize};
use crate::encoding::{
	AttributeRegistry, Channel, ColorEncoding, LinkScales, NONE_ATTRIBUTE, SizeEncoding, color,
	encode_color, encode_size,
};
use crate::error::{DatasetError, Parameter, ParameterError, nonnegative};
use crate::layout::{FULL_ENERGY, LayoutCommand, LayoutModel, LayoutParameters};

mod export;
pub mod reveal;
pub mod view;

pub use reveal::{LabelReveal, POLL_INTERVAL, RevealPoll, STABLE_ALPHA};
pub use view::{ActiveView, EdgeView, NodeRecord, build_view};

/// Direction for stepping through networks or layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Previous,
	Next,
}

impl Step {
	fn target(self, current: usize, len: usize) -> Option<usize> {
		match self {
			Step::Previous => current.checked_sub(1),
			Step::Next => Some(current + 1).filter(|next| *next < len),
		}
	}
}

/// Something the viewer asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
	/// Show a network by name, at its layer 0.
	SelectNetwork(String),
	/// Show a layer of the current network.
	SelectLayer(usize),
	/// Move to the neighbouring network; a no-op at either end.
	StepNetwork(Step),
	/// Move to the neighbouring layer; a no-op at either end.
	StepLayer(Step),
	/// Color nodes by an attribute, or `none`.
	ColorBy(String),
	/// Size nodes by an attribute, or `none`.
	SizeBy(String),
	/// Flip a binary attribute on one channel.
	InvertBinary(Channel, bool),
	/// Pick the categorical palette by name.
	ColorPalette(String),
	/// Set a physical parameter; negative values are rejected.
	SetParameter(Parameter, f64),
	/// Pin every node in place, or release them.
	Freeze(bool),
	/// Show every node's name once the layout settles.
	ShowNodeNames(bool),
	/// Scale link width by edge weight.
	ScaleLinkWidth(bool),
	/// Scale link opacity by edge weight.
	ScaleLinkOpacity(bool),
	/// Highlight nodes whose name contains the text; empty clears.
	MatchNames(String),
}

/// What the renderer must do after an event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Update {
	/// Commands for the layout engine, in order.
	pub commands: Vec<LayoutCommand>,
	/// Nodes or edges changed; the renderer must rebuild its graph.
	pub topology_changed: bool,
	/// A label reveal was scheduled under this generation.
	pub reveal: Option<u64>,
}

/// A loaded dataset plus the current selections and their encodings.
pub struct Session {
	dataset: Dataset,
	networks: Vec<String>,
	node_count: usize,
	identity: IdentityCache,
	view: ActiveView,
	registry: AttributeRegistry,
	color: ColorEncoding,
	size: SizeEncoding,
	links: LinkScales,
	layout: LayoutModel,
	reveal: LabelReveal,
}

impl Session {
	/// Normalise `dataset` and open its configured (or first) network.
	pub fn new(dataset: Dataset) -> Result<Self, DatasetError> {
		let mut dataset = normalize(dataset);
		let networks: Vec<String> = dataset.networks.keys().cloned().collect();
		let Some(first) = networks.first().cloned() else {
			return Err(DatasetError::NoNetworks);
		};

		let display = &mut dataset.display;
		match &display.network_name {
			Some(name) if networks.contains(name) => {}
			Some(name) => {
				warn!("network {:?} not found, showing {:?}", name, first);
				display.network_name = Some(first);
				display.network_layer = 0;
			}
			None => display.network_name = Some(first),
		}
		if display.freeze_node_movement && display.node_coordinates.is_none() {
			debug!("no saved coordinates, starting unfrozen");
			display.freeze_node_movement = false;
		}

		let count = node_count(&dataset);
		if count > MAX_NODE_COUNT {
			return Err(DatasetError::TooManyNodes {
				count,
				limit: MAX_NODE_COUNT,
			});
		}
		dataset.display.node_count = Some(count);
		let mut identity = IdentityCache::default();
		identity.set_node_count(count);

		let layout = LayoutModel::new(LayoutParameters::from_display(&dataset.display));
		let mut session = Self {
			dataset,
			networks,
			node_count: count,
			identity,
			view: ActiveView::default(),
			registry: AttributeRegistry::default(),
			color: ColorEncoding::none(0),
			size: SizeEncoding::none(0),
			links: LinkScales::new(&[], false, true),
			layout,
			reveal: LabelReveal::default(),
		};
		if session.layer_count() <= session.dataset.display.network_layer {
			warn!(
				"layer {} not found, showing layer 0",
				session.dataset.display.network_layer
			);
			session.dataset.display.network_layer = 0;
		}
		session.rebuild();
		info!(
			"session loaded: {} networks, {} nodes",
			session.networks.len(),
			session.node_count
		);
		Ok(session)
	}

	/// Parse and open a dataset document.
	pub fn from_json(text: &str) -> Result<Self, DatasetError> {
		Self::new(Dataset::from_json(text)?)
	}

	/// Everything a freshly created renderer needs to catch up.
	pub fn start(&mut self) -> Update {
		let commands = self.layout.initial_commands();
		let reveal = self.dataset.display.show_node_names.then(|| self.reveal.schedule());
		Update {
			commands,
			topology_changed: true,
			reveal,
		}
	}

	/// Handle one event. Only a rejected parameter is an error; the previous
	/// value is kept.
	pub fn apply(&mut self, event: SessionEvent) -> Result<Update, ParameterError> {
		debug!("event {:?}", event);
		let mut update = Update::default();
		match event {
			SessionEvent::SelectNetwork(name) => {
				if !self.networks.contains(&name) {
					warn!("unknown network {:?} ignored", name);
				} else if Some(&name) != self.dataset.display.network_name.as_ref() {
					self.show(name, 0, &mut update);
				}
			}
			SessionEvent::SelectLayer(layer) => {
				if layer >= self.layer_count() {
					warn!("unknown layer {} ignored", layer);
				} else if layer != self.layer() {
					self.show(self.network().to_string(), layer, &mut update);
				}
			}
			SessionEvent::StepNetwork(step) => {
				let current = self
					.networks
					.iter()
					.position(|n| n == self.network())
					.unwrap_or(0);
				if let Some(next) = step.target(current, self.networks.len()) {
					let name = self.networks[next].clone();
					self.show(name, 0, &mut update);
				}
			}
			SessionEvent::StepLayer(step) => {
				if let Some(next) = step.target(self.layer(), self.layer_count()) {
					self.show(self.network().to_string(), next, &mut update);
				}
			}
			SessionEvent::ColorBy(name) => {
				self.dataset.display.color_by = Some(name);
				self.validate_selections();
				self.encode_color();
			}
			SessionEvent::SizeBy(name) => {
				self.dataset.display.size_by = Some(name);
				self.validate_selections();
				self.encode_size();
			}
			SessionEvent::InvertBinary(Channel::Color, invert) => {
				self.dataset.display.invert_binary_colors = invert;
				self.encode_color();
			}
			SessionEvent::InvertBinary(Channel::Size, invert) => {
				self.dataset.display.invert_binary_sizes = invert;
				self.encode_size();
			}
			SessionEvent::ColorPalette(name) => {
				let name = if color::palette_names().iter().any(|p| *p == name) {
					name
				} else {
					warn!("unknown palette {:?}, using {}", name, color::DEFAULT_PALETTE);
					color::DEFAULT_PALETTE.to_string()
				};
				self.dataset.display.color_palette = name;
				self.encode_color();
			}
			SessionEvent::SetParameter(Parameter::Radius, value) => {
				self.dataset.display.radius =
					nonnegative(Parameter::Radius, value).inspect_err(|err| warn!("{}", err))?;
				self.encode_size();
			}
			SessionEvent::SetParameter(parameter, value) => {
				update.commands = self.layout.set(parameter, value)?;
			}
			SessionEvent::Freeze(frozen) => {
				self.dataset.display.freeze_node_movement = frozen;
				update.commands = self.layout.set_frozen(frozen);
			}
			SessionEvent::ShowNodeNames(show) => {
				self.dataset.display.show_node_names = show;
				if show {
					update.reveal = Some(self.reveal.schedule());
				} else {
					self.reveal.cancel();
				}
			}
			SessionEvent::ScaleLinkWidth(scale) => {
				self.dataset.display.scale_link_width = scale;
				self.scale_links();
			}
			SessionEvent::ScaleLinkOpacity(scale) => {
				self.dataset.display.scale_link_opacity = scale;
				self.scale_links();
			}
			SessionEvent::MatchNames(pattern) => {
				self.dataset.display.name_to_match = pattern;
			}
		}

		// motion resumed, so labels wait for the layout to settle again
		let restarted = update
			.commands
			.iter()
			.any(|c| matches!(c, LayoutCommand::Restart { .. }));
		if restarted && self.dataset.display.show_node_names && update.reveal.is_none() {
			update.reveal = Some(self.reveal.schedule());
		}
		Ok(update)
	}

	fn show(&mut self, network: String, layer: usize, update: &mut Update) {
		info!("showing {}[{}]", network, layer);
		self.dataset.display.network_name = Some(network);
		self.dataset.display.network_layer = layer;
		self.rebuild();
		update.topology_changed = true;
		update.commands = if self.layout.is_frozen() {
			vec![LayoutCommand::PinAll]
		} else {
			vec![LayoutCommand::Restart { alpha: FULL_ENERGY }]
		};
	}

	/// Rerun the whole pipeline for the selected network layer.
	fn rebuild(&mut self) {
		let network = self.network().to_string();
		let layer = self.layer();
		self.identity.set_node_count(self.node_count);
		let identity = self.identity.get(&self.dataset, &network, layer);
		self.view = build_view(&self.dataset, identity, &network, layer, self.node_count);
		self.registry = AttributeRegistry::build(&self.view.nodes, &self.dataset.display.metadata);
		self.validate_selections();
		self.encode_color();
		self.encode_size();
		self.scale_links();
	}

	/// Reset channel selections the active layer cannot serve.
	fn validate_selections(&mut self) {
		let display = &mut self.dataset.display;
		if let Some(name) = display.color_by.as_deref() {
			if self.registry.get(name).is_none() {
				warn!("color attribute {:?} not in this layer, reset to none", name);
				display.color_by = Some(NONE_ATTRIBUTE.into());
			}
		}
		if let Some(name) = display.size_by.as_deref() {
			if !self.registry.sizeable(name) {
				warn!("size attribute {:?} not usable here, reset to none", name);
				display.size_by = Some(NONE_ATTRIBUTE.into());
			}
		}
	}

	fn encode_color(&mut self) {
		let display = &self.dataset.display;
		let name = display.color_by.as_deref().unwrap_or(NONE_ATTRIBUTE);
		self.color = match self.registry.get(name) {
			Some(descriptor) => encode_color(
				&self.view.nodes,
				descriptor,
				display.invert_binary_colors,
				&display.color_palette,
			),
			None => ColorEncoding::none(self.view.node_count()),
		};
	}

	fn encode_size(&mut self) {
		let display = &self.dataset.display;
		let name = display.size_by.as_deref().unwrap_or(NONE_ATTRIBUTE);
		self.size = match self.registry.get(name) {
			Some(descriptor) => encode_size(
				&self.view.nodes,
				descriptor,
				display.invert_binary_sizes,
				display.radius,
			),
			None => SizeEncoding::none(self.view.node_count()),
		};
	}

	fn scale_links(&mut self) {
		let display = &self.dataset.display;
		self.links = LinkScales::new(
			&self.view.weights(),
			display.scale_link_width,
			display.scale_link_opacity,
		);
	}

	/// Advance a label-reveal poller. A frozen layout counts as settled.
	pub fn poll_labels(&mut self, generation: u64, alpha: f64) -> RevealPoll {
		let alpha = if self.layout.is_frozen() { 0.0 } else { alpha };
		self.reveal.poll(generation, alpha)
	}

	pub fn labels_visible(&self) -> bool {
		self.reveal.is_visible()
	}

	pub fn dataset(&self) -> &Dataset {
		&self.dataset
	}

	pub fn display(&self) -> &DisplayConfig {
		&self.dataset.display
	}

	/// Network names in document order.
	pub fn networks(&self) -> &[String] {
		&self.networks
	}

	pub fn network(&self) -> &str {
		self.dataset.display.network_name.as_deref().unwrap_or_default()
	}

	pub fn layer(&self) -> usize {
		self.dataset.display.network_layer
	}

	/// Layers in the selected network.
	pub fn layer_count(&self) -> usize {
		self.dataset
			.networks
			.get(self.network())
			.map_or(0, |n| n.layers().len())
	}

	/// Global node count over every network and layer.
	pub fn node_count(&self) -> usize {
		self.node_count
	}

	pub fn view(&self) -> &ActiveView {
		&self.view
	}

	pub fn registry(&self) -> &AttributeRegistry {
		&self.registry
	}

	pub fn color(&self) -> &ColorEncoding {
		&self.color
	}

	pub fn size(&self) -> &SizeEncoding {
		&self.size
	}

	pub fn links(&self) -> &LinkScales {
		&self.links
	}

	pub fn layout(&self) -> &LayoutModel {
		&self.layout
	}

	/// Rendered radius of node `idx`.
	pub fn node_radius(&self, idx: usize) -> f64 {
		self.dataset.display.radius * self.size.multipliers.get(idx).copied().unwrap_or(1.0)
	}

	/// Per node: whether its display name contains the match pattern.
	pub fn highlighted(&self) -> Vec<bool> {
		let pattern = &self.dataset.display.name_to_match;
		self.view
			.nodes
			.iter()
			.map(|node| !pattern.is_empty() && node.display_name().contains(pattern.as_str()))
			.collect()
	}

	/// Size and color encode the same attribute, so one legend serves both.
	pub fn shared_legend(&self) -> bool {
		self.color.attribute == self.size.attribute && self.color.attribute != NONE_ATTRIBUTE
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;
	use crate::dataset::AttrValue;
	use crate::encoding::{AttributeType, EncodingKind};

	const TWO_NETWORKS: &str = r#"{
		"networks": {
			"first": {
				"layers": [
					{
						"edgeList": [[0, 1], [1, 2]],
						"metadata": {
							"texture": {"values": ["gooey", "fishy", "chewy"]},
							"power": {"values": [1, 2, 3]}
						}
					},
					{"edgeList": [[0, 2, 5]]}
				]
			},
			"second": {"edgeList": [[0, 1], [1, 2], [2, 3]]}
		},
		"display": {"colorBy": "texture", "sizeBy": "power"}
	}"#;

	fn session() -> Session {
		Session::from_json(TWO_NETWORKS).unwrap()
	}

	#[test]
	fn loads_first_network_with_selections() {
		let session = session();
		assert_eq!(session.network(), "first");
		assert_eq!(session.node_count(), 4);
		assert_eq!(session.color().kind.name(), "categorical");
		assert_eq!(session.size().kind, EncodingKind::Scalar);
	}

	#[test]
	fn empty_dataset_is_rejected() {
		assert!(matches!(
			Session::from_json("{}"),
			Err(DatasetError::NoNetworks)
		));
	}

	#[test]
	fn oversized_node_count_is_rejected() {
		let result = Session::from_json(
			r#"{"networks": {"n": {"edgeList": [[0, 1]]}}, "display": {"N": 2000000000}}"#,
		);
		assert!(matches!(
			result,
			Err(DatasetError::TooManyNodes {
				count: 2_000_000_000,
				limit: MAX_NODE_COUNT
			})
		));
	}

	#[test]
	fn switching_layer_resets_missing_attributes() {
		let mut session = session();
		let update = session.apply(SessionEvent::SelectLayer(1)).unwrap();
		assert!(update.topology_changed);
		assert_eq!(session.display().color_by.as_deref(), Some("none"));
		assert_eq!(session.color().kind, EncodingKind::None);
		assert!(approx_eq!(f64, session.view().edges[0].weight, 5.0));
	}

	#[test]
	fn size_rejects_categorical_attribute() {
		let mut session = session();
		session.apply(SessionEvent::SizeBy("texture".into())).unwrap();
		assert_eq!(session.display().size_by.as_deref(), Some("none"));
		assert_eq!(session.size().multipliers, vec![1.0; session.view().node_count()]);
	}

	#[test]
	fn stepping_stays_in_bounds() {
		let mut session = session();
		let update = session.apply(SessionEvent::StepNetwork(Step::Previous)).unwrap();
		assert_eq!(update, Update::default());
		session.apply(SessionEvent::StepNetwork(Step::Next)).unwrap();
		assert_eq!(session.network(), "second");
		session.apply(SessionEvent::StepNetwork(Step::Next)).unwrap();
		assert_eq!(session.network(), "second");
		session.apply(SessionEvent::StepLayer(Step::Next)).unwrap();
		assert_eq!(session.layer(), 0);
	}

	#[test]
	fn negative_radius_is_rejected() {
		let mut session = session();
		let err = session
			.apply(SessionEvent::SetParameter(Parameter::Radius, -1.0))
			.unwrap_err();
		assert_eq!(err.to_string(), "Node radius must be nonnegative (got -1)");
		assert!(approx_eq!(f64, session.display().radius, 5.0));
	}

	#[test]
	fn radius_scales_legend_radius() {
		let mut session = session();
		session
			.apply(SessionEvent::SetParameter(Parameter::Radius, 10.0))
			.unwrap();
		assert!(approx_eq!(f64, session.size().max_radius, 15.0, epsilon = 1e-9));
		assert!(approx_eq!(f64, session.node_radius(2), 15.0, epsilon = 1e-9));
	}

	#[test]
	fn name_matching_highlights_substrings() {
		let mut session = session();
		session.apply(SessionEvent::MatchNames("2".into())).unwrap();
		assert_eq!(session.highlighted(), [false, false, true]);
		session.apply(SessionEvent::MatchNames(String::new())).unwrap();
		assert!(session.highlighted().iter().all(|h| !h));
	}

	#[test]
	fn freeze_is_forced_off_without_coordinates() {
		let session = Session::from_json(
			r#"{"networks": {"n": {"edgeList": [[0, 1]]}}, "display": {"freezeNodeMovement": true}}"#,
		)
		.unwrap();
		assert!(!session.layout().is_frozen());
	}

	#[test]
	fn restarts_reschedule_label_reveal() {
		let mut session = session();
		let shown = session.apply(SessionEvent::ShowNodeNames(true)).unwrap();
		let first = shown.reveal.unwrap();
		let update = session
			.apply(SessionEvent::SetParameter(Parameter::Charge, 30.0))
			.unwrap();
		let second = update.reveal.unwrap();
		assert!(second > first);
		assert_eq!(session.poll_labels(first, 0.0), RevealPoll::Superseded);
		assert_eq!(session.poll_labels(second, 0.0), RevealPoll::Reveal);
		assert!(session.labels_visible());
	}

	#[test]
	fn frozen_layout_reveals_labels_at_once() {
		let mut session = session();
		session.apply(SessionEvent::Freeze(true)).unwrap();
		let generation = session
			.apply(SessionEvent::ShowNodeNames(true))
			.unwrap()
			.reveal
			.unwrap();
		assert_eq!(session.poll_labels(generation, 0.63), RevealPoll::Reveal);
		assert!(session.labels_visible());
	}

	#[test]
	fn layer_values_override_dataset_values() {
		let session = Session::from_json(
			r#"{
				"networks": {"n": {
					"edgeList": [[0, 1], [1, 2]],
					"metadata": {"kind": {"type": "categorical", "categories": ["a", "b", "c"], "values": [2, 0, 1]}}
				}},
				"display": {"metadata": {
					"kind": {"type": "scalar", "values": [1, 2, 3]},
					"hunger": {"values": [4, 9, 2]}
				}}
			}"#,
		)
		.unwrap();

		let kind = session.registry().get("kind").unwrap();
		assert_eq!(kind.kind, AttributeType::Categorical);
		assert_eq!(kind.categories, Some(["a", "b", "c"].map(AttrValue::from).to_vec()));
		let labels: Vec<_> = session
			.view()
			.nodes
			.iter()
			.map(|n| n.attributes["kind"].clone())
			.collect();
		assert_eq!(labels, ["c", "a", "b"].map(AttrValue::from));

		assert_eq!(session.registry().get("hunger").unwrap().kind, AttributeType::Scalar);
		assert_eq!(session.view().nodes[0].attributes["hunger"], AttrValue::Number(4.0));
	}

	#[test]
	fn shared_legend_when_channels_match() {
		let mut session = session();
		assert!(!session.shared_legend());
		session.apply(SessionEvent::ColorBy("power".into())).unwrap();
		assert!(session.shared_legend());
	}
}
