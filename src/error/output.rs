//! Output unit errors.

//---------------------------------------------------------------------------------------------------- use
use std::borrow::Cow;
use crate::unit::{Bus,UnitStep};

//---------------------------------------------------------------------------------------------------- OutputError
/// Error that occurs when building, starting or
/// stopping the hardware output unit.
///
/// This can be due to many reasons, e.g:
/// - No output hardware exists
/// - The audio server disconnected/was killed
/// - The stream format is not accepted by the hardware
///
/// Output backends will generally have the same
/// errors, so instead of being generic per backend,
/// each one will just conform to this enum.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
	#[error("no matching audio output component was found")]
	/// No output component (hardware/server) matched.
	ComponentNotFound,

	#[error("audio hardware/server is unavailable")]
	/// The audio hardware/server is unavailable.
	DeviceUnavailable,

	#[error("audio format is invalid or unsupported")]
	/// The stream format is invalid or unsupported.
	InvalidFormat,

	#[error("{0} does not support the requested i/o configuration")]
	/// A bus was asked to do something it cannot.
	UnsupportedBus(Bus),

	#[error("render callback must be set before initializing")]
	/// `initialize()` was called before the render callback was set.
	MissingCallback,

	#[error("output unit is not initialized")]
	/// `start()` was called before `initialize()`.
	NotInitialized,

	#[error("output unit {step} failed with status {status}")]
	/// A platform call returned a non-zero status.
	Status {
		/// The step that failed.
		step: UnitStep,
		/// The raw status code.
		status: i32,
	},

	#[error("unknown error: {0}")]
	/// An unknown or very specific error occurred.
	///
	/// The `str` will contain more information.
	Unknown(Cow<'static, str>),
}
