//! Saving a session back into the dataset document shape.

use log::info;

use super::Session;
use crate::config::Coordinate;
use crate::dataset::Dataset;
use crate::error::DatasetError;

impl Session {
	/// The normalised dataset with the current display settings, layout
	/// parameters and node positions folded into `display`.
	pub fn export(&self, coordinates: &[Coordinate]) -> Dataset {
		let mut dataset = self.dataset.clone();
		let params = self.layout.parameters();
		let display = &mut dataset.display;
		display.charge = params.charge;
		display.gravity = params.gravity;
		display.link_length = params.link_distance;
		display.link_strength = params.link_strength;
		display.freeze_node_movement = params.frozen;
		if !coordinates.is_empty() {
			display.node_coordinates = Some(coordinates.to_vec());
		}
		dataset
	}

	pub fn export_json(&self, coordinates: &[Coordinate]) -> Result<String, DatasetError> {
		let json = self.export(coordinates).to_json()?;
		info!("exported {} bytes", json.len());
		Ok(json)
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use crate::config::Coordinate;
	use crate::error::Parameter;
	use crate::session::{Session, SessionEvent};

	const DATA: &str = r#"{
		"networks": {"n": {"edgeList": [["a", "b", 2], ["b", "c"]],
			"metadata": {"hunger": {"values": {"a": 1, "b": 4, "c": 9}}}}},
		"display": {"colorBy": "hunger", "futureOption": [1, 2]}
	}"#;

	#[test]
	fn export_reloads_to_the_same_view() {
		let mut session = Session::from_json(DATA).unwrap();
		session
			.apply(SessionEvent::SetParameter(Parameter::Gravity, 0.4))
			.unwrap();
		session.apply(SessionEvent::Freeze(true)).unwrap();
		let coordinates = [
			Coordinate { x: 1.0, y: 1.0 },
			Coordinate { x: 2.0, y: 2.0 },
			Coordinate { x: 3.0, y: 3.0 },
		];

		let json = session.export_json(&coordinates).unwrap();
		let reloaded = Session::from_json(&json).unwrap();

		assert!(approx_eq!(f64, reloaded.layout().parameters().gravity, 0.4));
		assert!(reloaded.layout().is_frozen());
		assert_eq!(reloaded.view().edges, session.view().edges);
		assert_eq!(reloaded.color().colors, session.color().colors);
		assert_eq!(reloaded.view().nodes[2].position, Some(coordinates[2]));
		assert_eq!(
			reloaded.display().extra.get("futureOption"),
			Some(&serde_json::json!([1, 2]))
		);
	}

	#[test]
	fn export_without_coordinates_keeps_saved_ones() {
		let session = Session::from_json(DATA).unwrap();
		let exported = session.export(&[]);
		assert_eq!(exported.display.node_coordinates, None);
		assert_eq!(exported.display.color_by.as_deref(), Some("hunger"));
	}
}
