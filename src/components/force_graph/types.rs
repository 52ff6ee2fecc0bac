use crate::config::Coordinate;
use crate::encoding::{NEUTRAL, Rgb};
use crate::session::Session;

/// A node as the canvas draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub idx: usize,
	pub label: String,
	pub color: String,
	pub radius: f64,
	/// Name matches the search pattern.
	pub highlighted: bool,
	pub position: Option<Coordinate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: usize,
	pub target: usize,
	pub width: f64,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub label: String,
	pub color: String,
	pub radius: f64,
}

/// One titled legend column.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendView {
	pub title: String,
	pub entries: Vec<LegendEntry>,
}

/// Everything the canvas needs for one frame of a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	pub legends: Vec<LegendView>,
	pub show_labels: bool,
}

impl GraphData {
	pub fn from_session(session: &Session) -> Self {
		let color = session.color();
		let highlighted = session.highlighted();
		let nodes = session
			.view()
			.nodes
			.iter()
			.map(|node| GraphNode {
				idx: node.idx,
				label: node.display_name(),
				color: color.colors.get(node.idx).copied().unwrap_or(NEUTRAL).to_css(),
				radius: session.node_radius(node.idx),
				highlighted: highlighted.get(node.idx).copied().unwrap_or(false),
				position: node.position,
			})
			.collect();

		let scales = session.links();
		let links = session
			.view()
			.edges
			.iter()
			.map(|edge| GraphLink {
				source: edge.source,
				target: edge.target,
				width: scales.width(edge.weight),
				opacity: scales.opacity(edge.weight),
			})
			.collect();

		Self {
			nodes,
			links,
			legends: legends(session),
			show_labels: session.labels_visible(),
		}
	}
}

fn legends(session: &Session) -> Vec<LegendView> {
	let (color, size) = (session.color(), session.size());
	let radius = session.display().radius;
	let fill = |colors: &[Rgb], i: usize| colors.get(i).copied().unwrap_or(NEUTRAL).to_css();
	let mut legends = Vec::new();

	if !size.legend.is_empty() {
		// a shared legend takes its fill from the color encoding
		let colors: &[Rgb] = if session.shared_legend() {
			&color.legend_colors
		} else {
			&[]
		};
		legends.push(LegendView {
			title: size.attribute.clone(),
			entries: size
				.legend
				.labels
				.iter()
				.zip(&size.legend_multipliers)
				.enumerate()
				.map(|(i, (label, multiplier))| LegendEntry {
					label: label.clone(),
					color: fill(colors, i),
					radius: radius * multiplier,
				})
				.collect(),
		});
	}
	if !color.legend.is_empty() && !session.shared_legend() {
		legends.push(LegendView {
			title: color.attribute.clone(),
			entries: color
				.legend
				.labels
				.iter()
				.enumerate()
				.map(|(i, label)| LegendEntry {
					label: label.clone(),
					color: fill(color.legend_colors.as_slice(), i),
					radius,
				})
				.collect(),
		});
	}
	legends
}
