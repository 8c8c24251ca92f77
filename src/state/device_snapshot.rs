//! Device snapshot.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	format::AudioFormat,
	state::DeviceState,
};

//---------------------------------------------------------------------------------------------------- DeviceSnapshot
/// An observation of the device's state.
///
/// This is a copy, it does not change as the device does.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub struct DeviceSnapshot {
	/// The lifecycle state.
	pub state: DeviceState,
	/// Is the session currently interrupted?
	pub interrupted: bool,
	/// Is the output unit currently running?
	///
	/// This can be `false` while [`DeviceState::Rendering`],
	/// e.g. after the media services were lost, or when the
	/// unit failed to restart after an interruption ended.
	pub unit_running: bool,
	/// The cached render format, if any.
	pub format: Option<AudioFormat>,
}

impl DeviceSnapshot {
	/// The snapshot of a device that was just created.
	pub const NEW: Self = Self {
		state: DeviceState::Uninitialized,
		interrupted: false,
		unit_running: false,
		format: None,
	};
}
