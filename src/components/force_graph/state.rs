use std::collections::HashSet;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::GraphData;
use crate::config::Coordinate;
use crate::layout::{Energy, LayoutCommand, LayoutEngine, LayoutParameters};

/// Extra pick tolerance around a node, in world units.
pub const HIT_SLOP: f64 = 4.0;
/// Link length the spring constant is calibrated for.
const REFERENCE_DISTANCE: f64 = 20.0;
const BASE_SPRING: f64 = 0.05;
/// Converts the viewer's charge into the engine's repulsion.
const CHARGE_SCALE: f64 = 2.5;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Index into [`GraphData::nodes`].
	pub idx: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
}

fn simulation_parameters(params: &LayoutParameters) -> SimulationParameters {
	SimulationParameters {
		force_charge: (params.charge * CHARGE_SCALE) as f32,
		force_spring: (BASE_SPRING
			* params.link_strength
			* (REFERENCE_DISTANCE / params.link_distance.max(1.0))) as f32,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub data: GraphData,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub energy: Energy,
	params: LayoutParameters,
	/// Engine index of each data node.
	handles: Vec<DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl ForceGraphState {
	pub fn new(data: GraphData, params: LayoutParameters, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(simulation_parameters(&params)),
			data: GraphData::default(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			energy: Energy::default(),
			params,
			handles: Vec::new(),
			edges: Vec::new(),
		};
		state.rebuild(data, &[]);
		state
	}

	/// Replace the drawn data. A topology change rebuilds the engine graph;
	/// nodes that survive keep their positions and pins.
	pub fn sync(&mut self, data: GraphData, topology_changed: bool) {
		if topology_changed {
			let previous = self.node_states();
			self.rebuild(data, &previous);
		} else {
			self.data = data;
		}
	}

	/// Positions and pins indexed like the data nodes.
	fn node_states(&self) -> Vec<Option<(f32, f32, bool)>> {
		let mut states = vec![None; self.handles.len()];
		self.graph.visit_nodes(|node| {
			let idx = node.data.user_data.idx;
			if let Some(slot) = states.get_mut(idx) {
				*slot = Some((node.x(), node.y(), node.data.is_anchor));
			}
		});
		states
	}

	fn rebuild(&mut self, data: GraphData, previous: &[Option<(f32, f32, bool)>]) {
		let mut graph = ForceGraph::new(simulation_parameters(&self.params));
		let count = data.nodes.len().max(1) as f64;
		let mut handles = Vec::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count;
			let seed = (100.0 * angle.cos() as f32, 100.0 * angle.sin() as f32);
			let (x, y, is_anchor) = match (previous.get(node.idx).copied().flatten(), node.position)
			{
				(Some(kept), _) => kept,
				(None, Some(at)) => (at.x as f32, at.y as f32, self.params.frozen),
				(None, None) => (seed.0, seed.1, self.params.frozen),
			};
			handles.push(graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo { idx: node.idx },
			}));
		}

		let mut edges = Vec::with_capacity(data.links.len());
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (handles.get(link.source), handles.get(link.target)) {
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				edges.push((src, tgt));
			}
		}

		debug!("graph rebuilt: {} nodes, {} links", handles.len(), edges.len());
		self.graph = graph;
		self.handles = handles;
		self.edges = edges;
		self.data = data;
		self.hover = HoverState::default();
		self.drag = DragState::default();
	}

	/// Current node positions, indexed like the data nodes.
	pub fn positions(&self) -> Vec<Coordinate> {
		self.node_states()
			.into_iter()
			.map(|s| {
				s.map_or_else(Coordinate::default, |(x, y, _)| Coordinate {
					x: x as f64,
					y: y as f64,
				})
			})
			.collect()
	}

	/// Engine handle of data node `idx`.
	pub fn handle(&self, idx: usize) -> Option<DefaultNodeIdx> {
		self.handles.get(idx).copied()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let radius = self.radius_of(node.data.user_data.idx) + HIT_SLOP;
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn radius_of(&self, idx: usize) -> f64 {
		self.data.nodes.get(idx).map_or(0.0, |n| n.radius)
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		self.hover.node = node;
		self.hover.neighbors.clear();
		if let Some(idx) = node {
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
	}

	pub fn is_neighbor(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.neighbors.contains(&idx)
	}

	/// Move one node, pinning it when the layout is frozen.
	pub fn drag_node_to(&mut self, handle: DefaultNodeIdx, x: f32, y: f32) {
		let pin = self.params.frozen;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
		self.drag.active = true;
		if !pin {
			self.energy.restart(self.energy.alpha.max(0.3));
		}
	}

	/// Let go of the dragged node; it stays put only while frozen.
	pub fn release_drag(&mut self) {
		if let (Some(handle), false) = (self.drag.node_idx, self.params.frozen) {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == handle {
					node.data.is_anchor = false;
				}
			});
		}
		self.drag = DragState::default();
	}

	pub fn tick(&mut self, dt: f32) {
		if !self.energy.tick() {
			return;
		}
		self.graph.update(dt);

		// pull toward the origin, proportional to distance
		let pull = (self.params.gravity * self.energy.alpha) as f32;
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x -= node.data.x * pull;
				node.data.y -= node.data.y * pull;
			}
		});
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn set_all_anchors(&mut self, anchored: bool) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = anchored);
	}
}

impl LayoutEngine for ForceGraphState {
	fn execute(&mut self, command: &LayoutCommand) {
		match command {
			LayoutCommand::Apply(params) => {
				let frozen = self.params.frozen;
				self.params = LayoutParameters { frozen, ..*params };
				let data = std::mem::take(&mut self.data);
				let previous = self.node_states();
				self.rebuild(data, &previous);
			}
			LayoutCommand::Stop => self.energy.stop(),
			LayoutCommand::Restart { alpha } => self.energy.restart(*alpha),
			LayoutCommand::PinAll => {
				self.params.frozen = true;
				self.set_all_anchors(true);
			}
			LayoutCommand::UnpinAll => {
				self.params.frozen = false;
				self.set_all_anchors(false);
			}
		}
	}

	fn alpha(&self) -> f64 {
		self.energy.alpha
	}
}
