//! Output unit over `cpal`.
//!
//! This file implements the abstract [`OutputUnit`]
//! trait using `cpal` as a backend.
//!
//! `cpal` builds a stream in one go, so the configuration
//! steps are only recorded and the stream is built in
//! `initialize()`. `cpal` samples are `i16`'s, the render
//! callback writes bytes into a scratch buffer allocated
//! up-front that is then copied into `cpal`'s buffer.

//---------------------------------------------------------------------------------------------------- use
use std::borrow::Cow;
use crossbeam::channel::Receiver;
use cpal::traits::{DeviceTrait,HostTrait,StreamTrait};
use crate::{
	error::OutputError,
	format::{SAMPLE_SIZE,StreamDescription},
	unit::{
		AudioBuffer,Bus,OutputUnit,RenderArgs,
		RenderCallback,RenderFlags,Scope,
	},
	macros::{debug2,error2,trace2},
};

//---------------------------------------------------------------------------------------------------- CpalUnitConfig
/// Which device a [`CpalUnit`] opens.
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct CpalUnitConfig {
	/// Output device name, `None` is the default output device.
	pub device_name: Option<String>,
}

//---------------------------------------------------------------------------------------------------- CpalUnit
/// An [`OutputUnit`] backed by a `cpal` output stream.
pub struct CpalUnit {
	device: cpal::Device,

	format: Option<StreamDescription>,
	maximum_frames: Option<u32>,
	output_enabled: bool,
	callback: Option<RenderCallback>,

	/// Built in `initialize()`.
	stream: Option<cpal::Stream>,
	/// Errors reported by `cpal`'s error callback.
	error: Option<Receiver<cpal::StreamError>>,
}

impl std::fmt::Debug for CpalUnit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CpalUnit")
			.field("format", &self.format)
			.field("maximum_frames", &self.maximum_frames)
			.field("output_enabled", &self.output_enabled)
			.field("initialized", &self.stream.is_some())
			.finish_non_exhaustive()
	}
}

impl CpalUnit {
	/// Forward any error `cpal` reported since the last call.
	fn check_error(&self) -> Result<(), OutputError> {
		match self.error.as_ref().map(Receiver::try_recv) {
			Some(Ok(error)) => {
				error2!("CpalUnit - stream error: {error}");
				Err(error.into())
			},
			_ => Ok(()),
		}
	}
}

//---------------------------------------------------------------------------------------------------- `OutputUnit` Impl
impl OutputUnit for CpalUnit {
	type Config = CpalUnitConfig;

	#[cold]
	#[inline(never)]
	fn new(config: CpalUnitConfig) -> Result<Self, OutputError> {
		debug2!("CpalUnit - new(), config: {config:?}");

		let host = cpal::default_host();

		let device = match config.device_name {
			None => host.default_output_device(),
			Some(name) => host
				.output_devices()
				.map_err(|e| OutputError::Unknown(Cow::Owned(e.to_string())))?
				.find(|d| d.name().map_or(false, |n| n == name)),
		};

		let Some(device) = device else {
			return Err(OutputError::ComponentNotFound);
		};

		Ok(Self {
			device,
			format: None,
			maximum_frames: None,
			output_enabled: false,
			callback: None,
			stream: None,
			error: None,
		})
	}

	fn set_stream_format(
		&mut self,
		format: StreamDescription,
		scope: Scope,
		bus: Bus,
	) -> Result<(), OutputError> {
		if bus != Bus::OUTPUT || scope != Scope::Input {
			return Err(OutputError::UnsupportedBus(bus));
		}
		if !(1..=2).contains(&format.channels_per_frame)
			|| format.bytes_per_frame as usize != format.channels_per_frame as usize * SAMPLE_SIZE
		{
			return Err(OutputError::InvalidFormat);
		}
		self.format = Some(format);
		Ok(())
	}

	fn set_maximum_frames(&mut self, frames: u32) -> Result<(), OutputError> {
		if frames == 0 {
			return Err(OutputError::InvalidFormat);
		}
		self.maximum_frames = Some(frames);
		Ok(())
	}

	fn set_io_enabled(
		&mut self,
		scope: Scope,
		bus: Bus,
		enabled: bool,
	) -> Result<(), OutputError> {
		match (scope, bus, enabled) {
			(Scope::Output, Bus::OUTPUT, enabled) => {
				self.output_enabled = enabled;
				Ok(())
			},
			// Streams are output-only, input is always "disabled".
			(Scope::Input, Bus::INPUT, false) => Ok(()),
			_ => Err(OutputError::UnsupportedBus(bus)),
		}
	}

	fn set_render_callback(&mut self, callback: RenderCallback) -> Result<(), OutputError> {
		self.callback = Some(callback);
		Ok(())
	}

	#[cold]
	#[inline(never)]
	fn initialize(&mut self) -> Result<(), OutputError> {
		let Some(format) = self.format else {
			return Err(OutputError::InvalidFormat);
		};
		if !self.output_enabled {
			return Err(OutputError::UnsupportedBus(Bus::OUTPUT));
		}
		let Some(mut callback) = self.callback.take() else {
			return Err(OutputError::MissingCallback);
		};

		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let sample_rate = format.sample_rate.round() as u32;
		#[allow(clippy::cast_possible_truncation)]
		let channels = format.channels_per_frame as cpal::ChannelCount;
		let buffer_size = match self.maximum_frames {
			Some(frames) => cpal::BufferSize::Fixed(frames),
			None => cpal::BufferSize::Default,
		};

		let config = cpal::StreamConfig {
			channels,
			sample_rate: cpal::SampleRate(sample_rate),
			buffer_size,
		};
		debug2!("CpalUnit - initialize(), config: {config:?}");

		// INVARIANT: the data callback must not allocate,
		// the scratch buffer is sized for the largest
		// buffer we told `cpal` to ask for.
		let frames = self.maximum_frames.unwrap_or(4096) as usize;
		let mut scratch = vec![0_u8; frames * format.bytes_per_frame as usize];
		let channels_per_frame = format.channels_per_frame;

		let data_callback = move |output: &mut [i16], _: &cpal::OutputCallbackInfo| {
			let len = output.len() * SAMPLE_SIZE;
			if len > scratch.len() {
				trace2!("CpalUnit - {len} bytes requested, scratch is {}, rendering silence", scratch.len());
				output.fill(0);
				return;
			}

			#[allow(clippy::cast_possible_truncation)]
			let frames = (output.len() / channels_per_frame as usize) as u32;
			let mut flags = RenderFlags::default();
			let mut buffers = [AudioBuffer {
				channels: channels_per_frame,
				data: &mut scratch[..len],
			}];

			callback(&mut RenderArgs {
				flags: &mut flags,
				frames,
				buffers: &mut buffers,
			});

			if flags.output_is_silence {
				output.fill(0);
				return;
			}

			for (sample, bytes) in output.iter_mut().zip(scratch[..len].chunks_exact(SAMPLE_SIZE)) {
				*sample = i16::from_ne_bytes([bytes[0], bytes[1]]);
			}
		};

		let (error_send, error_recv) = crossbeam::channel::unbounded();
		let error_callback = move |error: cpal::StreamError| {
			drop(error_send.try_send(error));
		};

		let stream = self.device.build_output_stream(&config, data_callback, error_callback, None)?;

		// `cpal` streams may start on creation.
		stream.pause()?;

		self.stream = Some(stream);
		self.error = Some(error_recv);
		Ok(())
	}

	fn start(&mut self) -> Result<(), OutputError> {
		debug2!("CpalUnit - start()");
		self.check_error()?;
		match self.stream.as_ref() {
			Some(stream) => Ok(stream.play()?),
			None => Err(OutputError::NotInitialized),
		}
	}

	fn stop(&mut self) -> Result<(), OutputError> {
		debug2!("CpalUnit - stop()");
		match self.stream.as_ref() {
			Some(stream) => Ok(stream.pause()?),
			None => Ok(()),
		}
	}
}

//---------------------------------------------------------------------------------------------------- Error re-map
impl From<cpal::StreamError> for OutputError {
	fn from(error: cpal::StreamError) -> Self {
		use cpal::StreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::BuildStreamError> for OutputError {
	fn from(error: cpal::BuildStreamError) -> Self {
		use cpal::BuildStreamError as E;
		match error {
			E::DeviceNotAvailable | E::InvalidArgument | E::StreamIdOverflow => Self::DeviceUnavailable,
			E::StreamConfigNotSupported => Self::InvalidFormat,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PlayStreamError> for OutputError {
	fn from(error: cpal::PlayStreamError) -> Self {
		use cpal::PlayStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PauseStreamError> for OutputError {
	fn from(error: cpal::PauseStreamError) -> Self {
		use cpal::PauseStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}
