//! Device lifecycle errors.

//---------------------------------------------------------------------------------------------------- use
use crate::error::OutputError;

#[allow(unused_imports)] // docs
use crate::host::Renderer;

//---------------------------------------------------------------------------------------------------- DeviceError
/// The result of a failed [`Renderer`] lifecycle call.
///
/// This is all the host ever sees of a failure,
/// what it does about it is up to the host.
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
	#[error("the renderer is not initialized")]
	/// `start_rendering()` before `initialize_renderer()`.
	NotInitialized,

	#[error("the device is already rendering")]
	/// `start_rendering()` while an output unit exists.
	AlreadyRendering,

	#[error("the device is not rendering")]
	/// `stop_rendering()` without a matching `start_rendering()`.
	NotRendering,

	#[error("the session reported an invalid format")]
	/// The session's sample rate or buffer duration was `0` or out of range.
	InvalidFormat,

	#[error("output unit error: {0}")]
	/// Building or starting the output unit failed.
	Unit(#[from] OutputError),

	#[error("the device bridge thread is gone")]
	/// The bridge thread exited (it panicked).
	Disconnected,
}

//---------------------------------------------------------------------------------------------------- DeviceInitError
/// Failed to create a [`crate::Device`].
#[derive(thiserror::Error, Debug)]
pub enum DeviceInitError {
	#[error("failed to spawn thread: {0}")]
	/// Failed to spawn an OS thread.
	ThreadSpawn(#[from] std::io::Error),

	#[error("the device bridge thread exited during initialization")]
	/// The bridge thread panicked before it was ready.
	Disconnected,
}
