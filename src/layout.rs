//! User-tunable simulation parameters and the free/frozen state machine.
//!
//! The model never touches a physics engine directly. Every accepted change
//! yields [`LayoutCommand`]s which the renderer hands to its [`LayoutEngine`].

use log::{debug, warn};

use crate::config::DisplayConfig;
use crate::error::{Parameter, ParameterError, nonnegative};

/// Energy a restarted simulation begins with.
pub const FULL_ENERGY: f64 = 1.0;
/// Energy below which a simulation counts as settled.
pub const ALPHA_MIN: f64 = 0.001;

/// Snapshot of the physical parameters, read-only to the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParameters {
	pub charge: f64,
	pub gravity: f64,
	pub link_distance: f64,
	pub link_strength: f64,
	pub frozen: bool,
}

impl Default for LayoutParameters {
	fn default() -> Self {
		Self::from_display(&DisplayConfig::default())
	}
}

impl LayoutParameters {
	pub fn from_display(display: &DisplayConfig) -> Self {
		Self {
			charge: display.charge,
			gravity: display.gravity,
			link_distance: display.link_length,
			link_strength: display.link_strength,
			frozen: display.freeze_node_movement,
		}
	}
}

/// An instruction for the layout engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutCommand {
	/// Use these parameters from now on.
	Apply(LayoutParameters),
	/// Halt the simulation.
	Stop,
	/// Resume the simulation with the given energy.
	Restart { alpha: f64 },
	/// Fix every node at its current position.
	PinAll,
	/// Release every pinned node.
	UnpinAll,
}

/// Something that runs a force simulation.
pub trait LayoutEngine {
	fn execute(&mut self, command: &LayoutCommand);

	/// Current simulation energy.
	fn alpha(&self) -> f64;

	fn run(&mut self, commands: &[LayoutCommand]) {
		for command in commands {
			self.execute(command);
		}
	}
}

/// Owner of the layout parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutModel {
	params: LayoutParameters,
}

impl LayoutModel {
	pub fn new(params: LayoutParameters) -> Self {
		Self { params }
	}

	pub fn parameters(&self) -> LayoutParameters {
		self.params
	}

	pub fn is_frozen(&self) -> bool {
		self.params.frozen
	}

	/// Change one parameter. Negative or NaN values are rejected and the
	/// previous value is kept.
	pub fn set(
		&mut self,
		parameter: Parameter,
		value: f64,
	) -> Result<Vec<LayoutCommand>, ParameterError> {
		let value = nonnegative(parameter, value).inspect_err(|err| warn!("{}", err))?;
		let slot = match parameter {
			Parameter::Charge => &mut self.params.charge,
			Parameter::Gravity => &mut self.params.gravity,
			Parameter::LinkDistance => &mut self.params.link_distance,
			Parameter::LinkStrength => &mut self.params.link_strength,
			Parameter::Radius => return Ok(Vec::new()),
		};
		*slot = value;
		debug!("{} set to {}", parameter, value);

		// pinned nodes stay put through the restart
		Ok(vec![
			LayoutCommand::Apply(self.params),
			LayoutCommand::Restart { alpha: FULL_ENERGY },
		])
	}

	/// Switch between free and frozen. Setting the current mode again is a no-op.
	pub fn set_frozen(&mut self, frozen: bool) -> Vec<LayoutCommand> {
		if frozen == self.params.frozen {
			return Vec::new();
		}
		self.params.frozen = frozen;
		debug!("layout {}", if frozen { "frozen" } else { "released" });
		if frozen {
			vec![LayoutCommand::Stop, LayoutCommand::PinAll]
		} else {
			vec![
				LayoutCommand::UnpinAll,
				LayoutCommand::Restart { alpha: FULL_ENERGY },
			]
		}
	}

	/// Commands that bring a fresh engine in line with the model.
	pub fn initial_commands(&self) -> Vec<LayoutCommand> {
		let mut commands = vec![LayoutCommand::Apply(self.params)];
		if self.params.frozen {
			commands.extend([LayoutCommand::Stop, LayoutCommand::PinAll]);
		} else {
			commands.push(LayoutCommand::Restart { alpha: FULL_ENERGY });
		}
		commands
	}
}

/// Simulation energy with exponential decay toward a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Energy {
	pub alpha: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	running: bool,
}

impl Default for Energy {
	fn default() -> Self {
		Self {
			alpha: FULL_ENERGY,
			alpha_min: ALPHA_MIN,
			// reaches alpha_min after 300 ticks
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			alpha_target: 0.0,
			running: true,
		}
	}
}

impl Energy {
	/// Whether ticks still move nodes.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Decay one step. Returns whether the simulation should keep moving.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		if self.alpha < self.alpha_min {
			self.running = false;
		}
		self.running
	}

	/// Reheat to `alpha` and resume ticking.
	pub fn restart(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	/// Halt ticking; alpha keeps its value.
	pub fn stop(&mut self) {
		self.running = false;
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;

	#[derive(Default)]
	struct MockEngine {
		positions: Vec<(f64, f64)>,
		pinned: Vec<bool>,
		energy: Energy,
		applied: Option<LayoutParameters>,
	}

	impl MockEngine {
		fn with_nodes(positions: &[(f64, f64)]) -> Self {
			Self {
				positions: positions.to_vec(),
				pinned: vec![false; positions.len()],
				..Self::default()
			}
		}

		fn step(&mut self) {
			if !self.energy.tick() {
				return;
			}
			for (pos, pinned) in self.positions.iter_mut().zip(&self.pinned) {
				if !pinned {
					pos.0 += 1.0;
				}
			}
		}
	}

	impl LayoutEngine for MockEngine {
		fn execute(&mut self, command: &LayoutCommand) {
			match command {
				LayoutCommand::Apply(params) => self.applied = Some(*params),
				LayoutCommand::Stop => self.energy.stop(),
				LayoutCommand::Restart { alpha } => self.energy.restart(*alpha),
				LayoutCommand::PinAll => self.pinned.iter_mut().for_each(|p| *p = true),
				LayoutCommand::UnpinAll => self.pinned.iter_mut().for_each(|p| *p = false),
			}
		}

		fn alpha(&self) -> f64 {
			self.energy.alpha
		}
	}

	#[test]
	fn freeze_pins_and_unfreeze_restarts_at_full_energy() {
		let mut model = LayoutModel::default();
		let mut engine = MockEngine::with_nodes(&[(0.0, 0.0), (5.0, 5.0)]);
		for _ in 0..10 {
			engine.step();
		}
		let before = engine.positions.clone();

		engine.run(&model.set_frozen(true));
		assert!(engine.pinned.iter().all(|p| *p));
		assert!(!engine.energy.is_running());
		for _ in 0..10 {
			engine.step();
		}
		assert_eq!(engine.positions, before);

		engine.run(&model.set_frozen(false));
		assert!(engine.pinned.iter().all(|p| !*p));
		assert_eq!(engine.alpha(), FULL_ENERGY);
		engine.step();
		assert_ne!(engine.positions, before);
	}

	#[test]
	fn repeated_freeze_is_a_no_op() {
		let mut model = LayoutModel::default();
		assert_eq!(model.set_frozen(true).len(), 2);
		assert!(model.set_frozen(true).is_empty());
	}

	#[test]
	fn negative_parameter_keeps_previous_value() {
		let mut model = LayoutModel::default();
		let err = model.set(Parameter::Charge, -3.0).unwrap_err();
		assert_eq!(err.to_string(), "Repulsion must be nonnegative (got -3)");
		assert!(approx_eq!(f64, model.parameters().charge, 60.0));
	}

	#[test]
	fn accepted_change_restarts_at_full_energy() {
		let mut model = LayoutModel::default();
		let commands = model.set(Parameter::Gravity, 0.3).unwrap();
		assert!(approx_eq!(f64, model.parameters().gravity, 0.3));
		assert_eq!(
			commands,
			[
				LayoutCommand::Apply(model.parameters()),
				LayoutCommand::Restart { alpha: FULL_ENERGY }
			]
		);

		let mut engine = MockEngine::with_nodes(&[(0.0, 0.0)]);
		engine.energy.alpha = 0.05;
		engine.run(&commands);
		assert_eq!(engine.alpha(), FULL_ENERGY);
		assert_eq!(engine.applied.map(|p| p.gravity), Some(0.3));
	}

	#[test]
	fn frozen_nodes_stay_pinned_through_parameter_changes() {
		let mut model = LayoutModel::default();
		let mut engine = MockEngine::with_nodes(&[(1.0, 2.0)]);
		engine.run(&model.set_frozen(true));
		engine.run(&model.set(Parameter::LinkDistance, 40.0).unwrap());
		engine.step();
		assert_eq!(engine.positions, [(1.0, 2.0)]);
		assert!(model.is_frozen());
	}

	#[test]
	fn energy_settles_after_about_three_hundred_ticks() {
		let mut energy = Energy::default();
		let mut ticks = 0;
		while energy.tick() {
			ticks += 1;
		}
		assert!((295..=305).contains(&ticks), "settled after {} ticks", ticks);
		assert!(energy.alpha < ALPHA_MIN);
	}
}
