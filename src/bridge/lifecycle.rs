//! Renderer lifecycle requests.

//---------------------------------------------------------------------------------------------------- Use
use std::sync::Arc;
use crate::{
	bridge::{Bridge,context::ContextHandle,render},
	error::{DeviceError,OutputError},
	format::{AudioFormat,StreamDescription},
	host::HostContext,
	session::AudioSession,
	state::DeviceState,
	unit::{Bus,OutputUnit,Scope},
	macros::{debug2,info2,warn2},
};

//----------------------------------------------------------------------------------------------------
impl<S, U> Bridge<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	/// Nothing is allocated until `start()`.
	pub(super) fn initialize(&mut self) -> Result<(), DeviceError> {
		if self.state == DeviceState::Uninitialized {
			debug2!("Bridge - initialized");
			self.state = DeviceState::Initialized;
		}
		Ok(())
	}

	/// The cached format, else the session's current one (then cached).
	pub(super) fn render_format(&mut self) -> Result<AudioFormat, DeviceError> {
		if let Some(format) = self.format {
			return Ok(format);
		}

		let Some(format) = AudioFormat::from_session(&*self.session) else {
			warn2!(
				"Bridge - session reported an invalid format, sample_rate: {}, io_buffer_duration: {:?}",
				self.session.sample_rate(),
				self.session.io_buffer_duration(),
			);
			return Err(DeviceError::InvalidFormat);
		};

		debug2!("Bridge - render format: {format:?}");
		self.format = Some(format);
		Ok(format)
	}

	#[cold]
	#[inline(never)]
	/// Build the output unit and start it.
	///
	/// If the session is interrupted the unit is built
	/// and initialized, but only started once the
	/// interruption ends.
	pub(super) fn start(&mut self, host: Arc<dyn HostContext>) -> Result<(), DeviceError> {
		if self.state == DeviceState::Uninitialized {
			return Err(DeviceError::NotInitialized);
		}
		if self.unit.is_some() {
			return Err(DeviceError::AlreadyRendering);
		}
		debug_assert!(self.state.can_start());
		debug_assert!(!self.arena.is_occupied());

		let format = self.render_format()?;
		let handle = self.arena.install(host, format.frames_per_buffer());

		// On failure the unit was already dropped (disposed),
		// which dropped the callback and its handle.
		let mut unit = match self.build_unit(format, handle) {
			Ok(unit) => unit,
			Err(e) => {
				warn2!("Bridge - building output unit failed: {e}");
				self.arena.release();
				return Err(e.into());
			},
		};

		if self.interrupted {
			info2!("Bridge - interrupted, output unit will start when the interruption ends");
			self.unit = Some(unit);
			self.unit_running = false;
			self.state = DeviceState::Interrupted;
			return Ok(());
		}

		if let Err(e) = unit.start() {
			warn2!("Bridge - starting output unit failed: {e}");
			self.arena.retire();
			drop(unit);
			self.arena.release();
			return Err(e.into());
		}

		info2!("Bridge - rendering, format: {format:?}");
		self.unit = Some(unit);
		self.unit_running = true;
		self.state = DeviceState::Rendering;
		Ok(())
	}

	#[cold]
	#[inline(never)]
	/// Stop and dispose of the output unit.
	pub(super) fn stop(&mut self) -> Result<(), DeviceError> {
		if self.unit.is_none() {
			return Err(DeviceError::NotRendering);
		}

		self.teardown();
		self.state = DeviceState::Stopped;
		info2!("Bridge - stopped");
		Ok(())
	}

	//---------------------------------------------------------------------------------------------------- Unit
	/// Instantiate and configure a unit, in order.
	fn build_unit(&self, format: AudioFormat, handle: ContextHandle) -> Result<U, OutputError> {
		let mut unit = U::new(self.unit_config.clone())?;

		unit.set_stream_format(StreamDescription::from(format), Scope::Input, Bus::OUTPUT)?;
		unit.set_maximum_frames(format.frames_per_buffer())?;
		unit.set_io_enabled(Scope::Output, Bus::OUTPUT, true)?;
		unit.set_io_enabled(Scope::Input, Bus::INPUT, false)?;
		unit.set_render_callback(render::callback(handle))?;
		unit.initialize()?;

		Ok(unit)
	}

	/// Retire the context, stop and dispose the unit, release the context.
	///
	/// Errors from stopping are logged, the unit is disposed regardless.
	pub(super) fn teardown(&mut self) {
		let Some(mut unit) = self.unit.take() else {
			return;
		};

		self.arena.retire();

		if self.unit_running {
			if let Err(e) = unit.stop() {
				warn2!("Bridge - stopping output unit failed: {e}");
			}
		}

		drop(unit);
		self.arena.release();
		self.unit_running = false;
	}

	/// Start the existing unit, if it is not running.
	pub(super) fn resume_unit(&mut self) {
		let Some(unit) = self.unit.as_mut() else {
			return;
		};
		if self.unit_running {
			return;
		}

		match unit.start() {
			Ok(()) => self.unit_running = true,
			Err(e) => warn2!("Bridge - restarting output unit failed: {e}"),
		}
	}

	/// Stop the existing unit (without disposing of it).
	pub(super) fn pause_unit(&mut self) {
		let Some(unit) = self.unit.as_mut() else {
			return;
		};
		if !self.unit_running {
			return;
		}

		if let Err(e) = unit.stop() {
			warn2!("Bridge - stopping output unit failed: {e}");
		}
		self.unit_running = false;
	}
}
