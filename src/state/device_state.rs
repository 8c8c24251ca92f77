//! Device lifecycle states.

//---------------------------------------------------------------------------------------------------- use
use strum::{
	AsRefStr,Display,EnumCount,EnumIter,
	EnumString,EnumVariantNames,IntoStaticStr,
};

#[allow(unused_imports)] // docs
use crate::host::Renderer;

//---------------------------------------------------------------------------------------------------- DeviceState
/// Where the device is in its lifecycle.
///
/// ```text
/// Uninitialized -> Initialized -> Rendering <-> Interrupted
///
/// (Rendering | Interrupted) -> Stopped -> (Rendering | Interrupted)
/// ```
///
/// Starting while the session is interrupted
/// goes straight to [`DeviceState::Interrupted`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceState {
	#[default]
	/// [`Renderer::initialize_renderer`] was never called.
	Uninitialized,
	/// Initialized, never started.
	Initialized,
	/// An output unit exists and is running.
	Rendering,
	/// An output unit exists but an interruption is holding it.
	Interrupted,
	/// The output unit was disposed by [`Renderer::stop_rendering`].
	Stopped,
}

impl DeviceState {
	/// Can [`Renderer::start_rendering`] be called in this state?
	///
	/// ```rust
	/// # use hostaudio::state::DeviceState;
	/// assert!(!DeviceState::Uninitialized.can_start());
	/// assert!(DeviceState::Initialized.can_start());
	/// assert!(!DeviceState::Rendering.can_start());
	/// assert!(!DeviceState::Interrupted.can_start());
	/// assert!(DeviceState::Stopped.can_start());
	/// ```
	pub const fn can_start(self) -> bool {
		matches!(self, Self::Initialized | Self::Stopped)
	}

	/// Does an output unit exist in this state?
	///
	/// ```rust
	/// # use hostaudio::state::DeviceState;
	/// assert!(!DeviceState::Uninitialized.has_unit());
	/// assert!(!DeviceState::Initialized.has_unit());
	/// assert!(DeviceState::Rendering.has_unit());
	/// assert!(DeviceState::Interrupted.has_unit());
	/// assert!(!DeviceState::Stopped.has_unit());
	/// ```
	pub const fn has_unit(self) -> bool {
		matches!(self, Self::Rendering | Self::Interrupted)
	}
}
