//! Dummy output unit.
//!
//! This file implements [`OutputUnit`] without any hardware.
//!
//! Nothing calls the render callback on its own, the "real-time
//! thread" is whoever calls [`DummyUnitHandle::render`].
//! Every unit created from the same handle shares its state,
//! so a test can keep the handle and look inside the unit the
//! device created.
//!
//! This is used for testing purposes.

//---------------------------------------------------------------------------------------------------- use
use std::sync::{Arc,Mutex,MutexGuard,PoisonError};
use crate::{
	error::OutputError,
	format::StreamDescription,
	unit::{
		AudioBuffer,Bus,OutputUnit,RenderArgs,
		RenderCallback,RenderFlags,Scope,UnitStep,
	},
	macros::{debug2,trace2},
};

//---------------------------------------------------------------------------------------------------- DummyUnitHandle
/// Shared view into every [`DummyUnit`] created with it.
#[derive(Clone,Default)]
pub struct DummyUnitHandle {
	state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
	alive: usize,
	created: usize,
	steps: Vec<UnitStep>,
	fail: Option<UnitStep>,

	format: Option<StreamDescription>,
	maximum_frames: Option<u32>,
	output_enabled: bool,
	input_enabled: bool,
	callback: Option<RenderCallback>,
	initialized: bool,
	running: bool,
}

/// The output of [`DummyUnitHandle::render`].
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Rendered {
	/// The rendered bytes.
	pub data: Vec<u8>,
	/// Was the silence flag set?
	pub silent: bool,
}

impl DummyUnitHandle {
	/// Bytes the buffers are filled with before rendering.
	pub const GARBAGE: u8 = 0xAA;

	/// Create a handle with no units.
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Make every future `step` fail with [`OutputError::Status`].
	pub fn fail_at(&self, step: UnitStep) {
		self.lock().fail = Some(step);
	}

	/// Undo [`Self::fail_at`].
	pub fn clear_failure(&self) {
		self.lock().fail = None;
	}

	/// Act as the real-time thread: ask for `frames` frames.
	///
	/// The buffer handed to the callback is sized for `frames` in
	/// the unit's stream format and pre-filled with [`Self::GARBAGE`].
	///
	/// Returns `None` if the unit is not running.
	pub fn render(&self, frames: u32) -> Option<Rendered> {
		let mut state = self.lock();
		let format = state.format?;
		let channels = format.channels_per_frame;
		let len = frames as usize * format.bytes_per_frame as usize;
		if !state.running {
			return None;
		}
		let callback = state.callback.as_mut()?;

		let mut data = vec![Self::GARBAGE; len];
		let mut flags = RenderFlags::default();
		let mut buffers = [AudioBuffer {
			channels,
			data: &mut data,
		}];

		trace2!("DummyUnit - render(), frames: {frames}, len: {len}");
		(*callback)(&mut RenderArgs {
			flags: &mut flags,
			frames,
			buffers: &mut buffers,
		});

		Some(Rendered {
			data,
			silent: flags.output_is_silence,
		})
	}

	/// Units currently alive.
	pub fn alive(&self) -> usize {
		self.lock().alive
	}

	/// Units created in total.
	pub fn created(&self) -> usize {
		self.lock().created
	}

	/// Every step attempted, across all units, in order.
	pub fn steps(&self) -> Vec<UnitStep> {
		self.lock().steps.clone()
	}

	/// Is the current unit running?
	pub fn is_running(&self) -> bool {
		self.lock().running
	}

	/// Is the current unit initialized?
	pub fn is_initialized(&self) -> bool {
		self.lock().initialized
	}

	/// Does the current unit have a render callback?
	pub fn has_callback(&self) -> bool {
		self.lock().callback.is_some()
	}

	/// The current unit's stream format.
	pub fn format(&self) -> Option<StreamDescription> {
		self.lock().format
	}

	/// The current unit's maximum frames per render call.
	pub fn maximum_frames(&self) -> Option<u32> {
		self.lock().maximum_frames
	}

	/// Is output enabled on [`Bus::OUTPUT`]?
	pub fn output_enabled(&self) -> bool {
		self.lock().output_enabled
	}

	/// Is input enabled on [`Bus::INPUT`]?
	pub fn input_enabled(&self) -> bool {
		self.lock().input_enabled
	}
}

impl std::fmt::Debug for DummyUnitHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.lock();
		f.debug_struct("DummyUnitHandle")
			.field("alive", &state.alive)
			.field("created", &state.created)
			.field("initialized", &state.initialized)
			.field("running", &state.running)
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- DummyUnit
/// A fake [`OutputUnit`], see [`DummyUnitHandle`].
#[derive(Debug)]
pub struct DummyUnit {
	handle: DummyUnitHandle,
}

impl DummyUnit {
	/// Record `step`, fail if it was set to fail.
	fn step(state: &mut State, step: UnitStep) -> Result<(), OutputError> {
		state.steps.push(step);
		if state.fail == Some(step) {
			debug2!("DummyUnit - failing {step}");
			Err(OutputError::Status { step, status: -1 })
		} else {
			Ok(())
		}
	}
}

//---------------------------------------------------------------------------------------------------- `OutputUnit` Impl
impl OutputUnit for DummyUnit {
	type Config = DummyUnitHandle;

	fn new(handle: DummyUnitHandle) -> Result<Self, OutputError> {
		{
			let mut state = handle.lock();
			Self::step(&mut state, UnitStep::New)?;
			state.alive += 1;
			state.created += 1;
			state.format = None;
			state.maximum_frames = None;
			state.output_enabled = false;
			state.input_enabled = false;
			state.callback = None;
			state.initialized = false;
			state.running = false;
		}
		Ok(Self { handle })
	}

	fn set_stream_format(
		&mut self,
		format: StreamDescription,
		scope: Scope,
		bus: Bus,
	) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::StreamFormat)?;
		if bus != Bus::OUTPUT || scope != Scope::Input {
			return Err(OutputError::UnsupportedBus(bus));
		}
		if format.channels_per_frame == 0 || format.channels_per_frame > 2 {
			return Err(OutputError::InvalidFormat);
		}
		state.format = Some(format);
		Ok(())
	}

	fn set_maximum_frames(&mut self, frames: u32) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::MaximumFrames)?;
		state.maximum_frames = Some(frames);
		Ok(())
	}

	fn set_io_enabled(
		&mut self,
		scope: Scope,
		bus: Bus,
		enabled: bool,
	) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::EnableIo)?;
		match (scope, bus) {
			(Scope::Output, Bus::OUTPUT) => state.output_enabled = enabled,
			(Scope::Input, Bus::INPUT) => state.input_enabled = enabled,
			_ => return Err(OutputError::UnsupportedBus(bus)),
		}
		Ok(())
	}

	fn set_render_callback(&mut self, callback: RenderCallback) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::RenderCallback)?;
		state.callback = Some(callback);
		Ok(())
	}

	fn initialize(&mut self) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::Initialize)?;
		if state.format.is_none() {
			return Err(OutputError::InvalidFormat);
		}
		if state.callback.is_none() {
			return Err(OutputError::MissingCallback);
		}
		state.initialized = true;
		Ok(())
	}

	fn start(&mut self) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::Start)?;
		if !state.initialized {
			return Err(OutputError::NotInitialized);
		}
		state.running = true;
		Ok(())
	}

	fn stop(&mut self) -> Result<(), OutputError> {
		let mut state = self.handle.lock();
		Self::step(&mut state, UnitStep::Stop)?;
		state.running = false;
		Ok(())
	}
}

impl Drop for DummyUnit {
	fn drop(&mut self) {
		let callback = {
			let mut state = self.handle.lock();
			state.alive -= 1;
			state.running = false;
			state.initialized = false;
			state.callback.take()
		};
		// Dropped outside the lock, it may own
		// the last reference to something big.
		drop(callback);
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use crate::format::{AudioFormat,Channels};

	fn format() -> StreamDescription {
		AudioFormat::new(Channels::Stereo, 48_000, 480).unwrap().into()
	}

	#[test]
	fn steps_must_be_in_order() {
		let handle = DummyUnitHandle::new();
		let mut unit = DummyUnit::new(handle.clone()).unwrap();

		assert!(matches!(unit.start(), Err(OutputError::NotInitialized)));
		assert!(matches!(unit.initialize(), Err(OutputError::InvalidFormat)));
		unit.set_stream_format(format(), Scope::Input, Bus::OUTPUT).unwrap();
		assert!(matches!(unit.initialize(), Err(OutputError::MissingCallback)));
		unit.set_render_callback(Box::new(|_| {})).unwrap();
		unit.initialize().unwrap();
		unit.start().unwrap();
		assert!(handle.is_running());

		drop(unit);
		assert_eq!(handle.alive(), 0);
		assert!(!handle.has_callback());
		assert!(!handle.is_running());
	}

	#[test]
	fn only_fixed_buses() {
		let handle = DummyUnitHandle::new();
		let mut unit = DummyUnit::new(handle.clone()).unwrap();
		assert!(matches!(
			unit.set_io_enabled(Scope::Output, Bus::INPUT, true),
			Err(OutputError::UnsupportedBus(Bus::INPUT)),
		));
		unit.set_io_enabled(Scope::Output, Bus::OUTPUT, true).unwrap();
		unit.set_io_enabled(Scope::Input, Bus::INPUT, false).unwrap();
		assert!(handle.output_enabled());
		assert!(!handle.input_enabled());
	}

	#[test]
	fn injected_failure() {
		let handle = DummyUnitHandle::new();
		handle.fail_at(UnitStep::New);
		assert!(matches!(
			DummyUnit::new(handle.clone()),
			Err(OutputError::Status { step: UnitStep::New, .. }),
		));
		assert_eq!(handle.alive(), 0);
		assert_eq!(handle.created(), 0);
	}

	#[test]
	fn render_only_while_running() {
		let handle = DummyUnitHandle::new();
		let mut unit = DummyUnit::new(handle.clone()).unwrap();
		unit.set_stream_format(format(), Scope::Input, Bus::OUTPUT).unwrap();
		unit.set_render_callback(Box::new(|args| {
			args.buffers[0].data.fill(1);
		})).unwrap();
		unit.initialize().unwrap();
		assert_eq!(handle.render(480), None);

		unit.start().unwrap();
		let rendered = handle.render(480).unwrap();
		assert_eq!(rendered.data.len(), 480 * 4);
		assert!(rendered.data.iter().all(|b| *b == 1));

		unit.stop().unwrap();
		assert_eq!(handle.render(480), None);
	}
}
