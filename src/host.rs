//! The host SDK's side of the device.
//!
//! The host owns the call lifecycle, it sees the device
//! through the [`AudioDevice`] capability interface and
//! supplies samples through a [`HostContext`].

//---------------------------------------------------------------------------------------------------- use
use std::sync::Arc;
use crate::{
	error::DeviceError,
	format::AudioFormat,
};

//---------------------------------------------------------------------------------------------------- HostContext
/// The host's opaque per-call context.
///
/// # Invariants
/// - [`HostContext::read_render_data`] is called on the output
///   unit's real-time thread, it must not block or allocate
/// - after [`Renderer::stop_rendering`] returns, the
///   device never touches the context again
pub trait HostContext: Send + Sync + 'static {
	/// Fill `data` entirely with interleaved 16-bit PCM.
	///
	/// `data.len()` is always `frames_per_buffer * bytes_per_frame`
	/// of the format last returned by [`Renderer::render_format`].
	fn read_render_data(&self, data: &mut [u8]);

	/// The active format changed, the host should
	/// re-query [`Renderer::render_format`].
	fn format_changed(&self);
}

//---------------------------------------------------------------------------------------------------- Renderer
/// The playback capability.
pub trait Renderer {
	/// The format rendering happens in.
	fn render_format(&mut self) -> Result<AudioFormat, DeviceError>;

	/// Prepare for rendering.
	fn initialize_renderer(&mut self) -> Result<(), DeviceError>;

	/// Build and start the output unit, pulling samples from `host`.
	fn start_rendering(&mut self, host: Arc<dyn HostContext>) -> Result<(), DeviceError>;

	/// Stop and dispose of the output unit.
	fn stop_rendering(&mut self) -> Result<(), DeviceError>;
}

//---------------------------------------------------------------------------------------------------- Capturer
/// The recording capability.
pub trait Capturer {
	/// The format capturing happens in.
	fn capture_format(&mut self) -> Result<AudioFormat, DeviceError>;

	/// Prepare for capturing.
	fn initialize_capturer(&mut self) -> Result<(), DeviceError>;

	/// Start pushing captured samples to `host`.
	fn start_capturing(&mut self, host: Arc<dyn HostContext>) -> Result<(), DeviceError>;

	/// Stop capturing.
	fn stop_capturing(&mut self) -> Result<(), DeviceError>;
}

//---------------------------------------------------------------------------------------------------- AudioDevice
/// What the host SDK holds.
///
/// A capability that returns `None` is not offered,
/// e.g. a playback-only device has no [`Capturer`].
pub trait AudioDevice {
	/// The playback capability, if offered.
	fn renderer(&mut self) -> Option<&mut dyn Renderer>;

	/// The recording capability, if offered.
	fn capturer(&mut self) -> Option<&mut dyn Capturer> {
		None
	}
}
