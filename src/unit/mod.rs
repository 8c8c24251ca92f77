//! Hardware output units.
//!
//! An [`OutputUnit`] is the lowest level connection to the output
//! hardware: it is configured step-by-step, then calls a render
//! callback on a real-time thread whenever it needs samples.
//!
//! The steps map 1:1 onto how a platform I/O unit is built:
//! 1. [`OutputUnit::new`] (find the component, instantiate it)
//! 2. [`OutputUnit::set_stream_format`]
//!    (+ [`OutputUnit::set_maximum_frames`])
//! 3. [`OutputUnit::set_io_enabled`] (output bus on, input bus off)
//! 4. [`OutputUnit::set_render_callback`]
//! 5. [`OutputUnit::initialize`]
//! 6. [`OutputUnit::start`]
//!
//! Dropping the unit must uninitialize and dispose of it,
//! and drop the render callback.

//---------------------------------------------------------------------------------------------------- use
use strum::{
	AsRefStr,Display,EnumCount,EnumIter,
	EnumString,EnumVariantNames,IntoStaticStr,
};
use crate::{
	error::OutputError,
	format::StreamDescription,
};

cfg_if::cfg_if! {
	if #[cfg(any(test, feature = "dummy"))] {
		mod dummy;
		pub use dummy::{DummyUnit,DummyUnitHandle,Rendered};
	}
}

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub use self::cpal::{CpalUnit,CpalUnitConfig};

//---------------------------------------------------------------------------------------------------- Bus
/// An I/O bus (element) of an output unit.
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
pub struct Bus(pub u32);

impl Bus {
	/// The hardware output bus.
	pub const OUTPUT: Self = Self(0);
	/// The hardware input bus.
	pub const INPUT: Self = Self(1);
}

impl std::fmt::Display for Bus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "bus {}", self.0)
	}
}

//---------------------------------------------------------------------------------------------------- Scope
/// Which side of a bus a property applies to.
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Scope {
	/// The side data enters the unit from.
	Input,
	/// The side data leaves the unit from.
	Output,
}

//---------------------------------------------------------------------------------------------------- UnitStep
/// A step in an output unit's lifecycle, used to label failures.
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum UnitStep {
	/// [`OutputUnit::new`]
	New,
	/// [`OutputUnit::set_stream_format`]
	StreamFormat,
	/// [`OutputUnit::set_maximum_frames`]
	MaximumFrames,
	/// [`OutputUnit::set_io_enabled`]
	EnableIo,
	/// [`OutputUnit::set_render_callback`]
	RenderCallback,
	/// [`OutputUnit::initialize`]
	Initialize,
	/// [`OutputUnit::start`]
	Start,
	/// [`OutputUnit::stop`]
	Stop,
}

//---------------------------------------------------------------------------------------------------- Render types
/// A single buffer of interleaved samples handed to the render callback.
#[derive(Debug)]
pub struct AudioBuffer<'a> {
	/// Interleaved channels in `data`.
	pub channels: u32,
	/// Raw interleaved 16-bit samples.
	pub data: &'a mut [u8],
}

/// Flags the render callback can set.
#[derive(Copy,Clone,Default,Debug,PartialEq,Eq)]
pub struct RenderFlags {
	/// The buffer only contains silence.
	pub output_is_silence: bool,
}

/// Everything the render callback receives.
#[derive(Debug)]
pub struct RenderArgs<'a, 'b> {
	/// In/out flags.
	pub flags: &'a mut RenderFlags,
	/// Frames the hardware asked for.
	pub frames: u32,
	/// The buffers to fill.
	pub buffers: &'a mut [AudioBuffer<'b>],
}

/// The render callback an [`OutputUnit`] calls on its real-time thread.
pub type RenderCallback = Box<dyn FnMut(&mut RenderArgs<'_, '_>) + Send + 'static>;

//---------------------------------------------------------------------------------------------------- OutputUnit
/// A hardware output unit.
///
/// # Invariants
/// - the render callback must never be called
///   before `start()` or after `stop()` returns
/// - `stop()` must be callable any amount of times
/// - units are created, used and dropped on a single thread,
///   so implementors do not need to be `Send`
pub trait OutputUnit: Sized + 'static {
	/// Backend specific configuration used to create the unit.
	type Config: Clone + Send + 'static;

	/// Find the output component and create an instance of it.
	fn new(config: Self::Config) -> Result<Self, OutputError>;

	/// Set the stream format on `scope` of `bus`.
	fn set_stream_format(
		&mut self,
		format: StreamDescription,
		scope: Scope,
		bus: Bus,
	) -> Result<(), OutputError>;

	/// The most frames a single render call will ask for.
	///
	/// Platform units take this from the session, backends
	/// that choose their own buffer size should use it.
	fn set_maximum_frames(&mut self, _frames: u32) -> Result<(), OutputError> {
		Ok(())
	}

	/// Enable or disable I/O on `scope` of `bus`.
	fn set_io_enabled(
		&mut self,
		scope: Scope,
		bus: Bus,
		enabled: bool,
	) -> Result<(), OutputError>;

	/// Register the render callback.
	fn set_render_callback(&mut self, callback: RenderCallback) -> Result<(), OutputError>;

	/// Allocate resources, after this the unit is ready to start.
	fn initialize(&mut self) -> Result<(), OutputError>;

	/// Start calling the render callback.
	fn start(&mut self) -> Result<(), OutputError>;

	/// Stop calling the render callback, keep the unit configured.
	fn stop(&mut self) -> Result<(), OutputError>;
}
