//! Audio formats.
//!
//! [`AudioFormat`] is what the host is told the device renders,
//! [`PreferredFormat`] is what the device asks the session for.
//!
//! The session is free to grant something else, so an
//! [`AudioFormat`] is always derived from the _live_ session
//! values and never from the preferred ones.

//---------------------------------------------------------------------------------------------------- use
use std::time::Duration;
use strum::{
	AsRefStr,Display,EnumCount,EnumIter,
	EnumString,EnumVariantNames,IntoStaticStr,
};
use crate::session::AudioSession;

//---------------------------------------------------------------------------------------------------- Constants
/// Size in bytes of a single sample.
///
/// Samples are always signed 16-bit linear PCM.
pub const SAMPLE_SIZE: usize = std::mem::size_of::<i16>();

/// Bits per channel, see [`SAMPLE_SIZE`].
pub const BITS_PER_CHANNEL: u32 = (SAMPLE_SIZE * 8) as u32;

//---------------------------------------------------------------------------------------------------- Channels
/// The channel layout of a rendered stream.
///
/// Only mono and (interleaved) stereo are supported,
/// any session reporting more than 2 output channels
/// is clamped to [`Channels::Stereo`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Channels {
	/// 1 channel.
	Mono,
	#[default]
	/// 2 interleaved channels.
	Stereo,
}

impl Channels {
	/// Clamp a session's output channel count.
	///
	/// ```rust
	/// # use hostaudio::format::Channels;
	/// assert_eq!(Channels::from_output_channels(0), Channels::Mono);
	/// assert_eq!(Channels::from_output_channels(1), Channels::Mono);
	/// assert_eq!(Channels::from_output_channels(2), Channels::Stereo);
	/// assert_eq!(Channels::from_output_channels(8), Channels::Stereo);
	/// ```
	pub const fn from_output_channels(count: u32) -> Self {
		if count >= 2 {
			Self::Stereo
		} else {
			Self::Mono
		}
	}

	/// The channel count.
	pub const fn count(self) -> u32 {
		match self {
			Self::Mono   => 1,
			Self::Stereo => 2,
		}
	}
}

//---------------------------------------------------------------------------------------------------- AudioFormat
/// The format the device renders in.
///
/// This is an immutable value; the only way to obtain
/// a (valid) one is [`AudioFormat::new`] or from a live session.
///
/// Deserialization goes through the same checks as [`AudioFormat::new`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedAudioFormat"))]
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub struct AudioFormat {
	channels: Channels,
	sample_rate: u32,
	frames_per_buffer: u32,
}

impl AudioFormat {
	/// Create a format.
	///
	/// Returns `None` if `sample_rate` or `frames_per_buffer` is `0`.
	///
	/// ```rust
	/// # use hostaudio::format::*;
	/// let format = AudioFormat::new(Channels::Stereo, 48_000, 480).unwrap();
	/// assert_eq!(format.bytes_per_buffer(), 480 * 2 * 2);
	///
	/// assert!(AudioFormat::new(Channels::Mono, 0, 480).is_none());
	/// assert!(AudioFormat::new(Channels::Mono, 48_000, 0).is_none());
	/// ```
	pub const fn new(channels: Channels, sample_rate: u32, frames_per_buffer: u32) -> Option<Self> {
		if sample_rate == 0 || frames_per_buffer == 0 {
			return None;
		}

		Some(Self {
			channels,
			sample_rate,
			frames_per_buffer,
		})
	}

	/// Derive the format from raw session values.
	///
	/// `frames_per_buffer` is `sample_rate * io_buffer_duration`,
	/// rounded to the nearest frame.
	///
	/// ```rust
	/// # use hostaudio::format::*;
	/// # use std::time::Duration;
	/// let format = AudioFormat::from_session_values(44_100.0, Duration::from_millis(10), 1).unwrap();
	/// assert_eq!(format.channels(), Channels::Mono);
	/// assert_eq!(format.sample_rate(), 44_100);
	/// assert_eq!(format.frames_per_buffer(), 441);
	/// ```
	pub fn from_session_values(
		sample_rate: f64,
		io_buffer_duration: Duration,
		output_channels: u32,
	) -> Option<Self> {
		if !sample_rate.is_finite() || sample_rate < 1.0 || sample_rate > f64::from(u32::MAX) {
			return None;
		}

		let frames = (sample_rate * io_buffer_duration.as_secs_f64() + 0.5).floor();
		if frames > f64::from(u32::MAX) {
			return None;
		}

		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		Self::new(
			Channels::from_output_channels(output_channels),
			sample_rate.round() as u32,
			frames as u32,
		)
	}

	/// Derive the format from the session's current values.
	pub fn from_session<S: AudioSession>(session: &S) -> Option<Self> {
		Self::from_session_values(
			session.sample_rate(),
			session.io_buffer_duration(),
			session.output_channels(),
		)
	}

	/// Channel layout.
	pub const fn channels(&self) -> Channels {
		self.channels
	}

	/// Sample rate in Hz.
	pub const fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Frames in a single hardware buffer.
	pub const fn frames_per_buffer(&self) -> u32 {
		self.frames_per_buffer
	}

	/// Bytes in a single interleaved frame.
	pub const fn bytes_per_frame(&self) -> usize {
		self.channels.count() as usize * SAMPLE_SIZE
	}

	/// Bytes in a single hardware buffer.
	pub const fn bytes_per_buffer(&self) -> usize {
		self.frames_per_buffer as usize * self.bytes_per_frame()
	}
}

#[cfg(feature = "serde")]
/// The serialized shape of [`AudioFormat`], before validation.
#[derive(serde::Deserialize)]
struct UncheckedAudioFormat {
	channels: Channels,
	sample_rate: u32,
	frames_per_buffer: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedAudioFormat> for AudioFormat {
	type Error = &'static str;

	fn try_from(f: UncheckedAudioFormat) -> Result<Self, Self::Error> {
		Self::new(f.channels, f.sample_rate, f.frames_per_buffer)
			.ok_or("sample_rate and frames_per_buffer must be non-zero")
	}
}

//---------------------------------------------------------------------------------------------------- PreferredFormat
/// What the device requests from the session.
///
/// Every field is only a _preference_, the session may grant another value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct PreferredFormat {
	/// Preferred sample rate in Hz.
	pub sample_rate: f64,
	/// Preferred channel layout.
	pub channels: Channels,
	/// Preferred duration of a single hardware buffer.
	pub io_buffer_duration: Duration,
}

impl PreferredFormat {
	/// Stereo, 48kHz, 10ms buffers.
	///
	/// ```rust
	/// # use hostaudio::format::*;
	/// assert_eq!(PreferredFormat::DEFAULT.sample_rate, 48_000.0);
	/// assert_eq!(PreferredFormat::DEFAULT.channels, Channels::Stereo);
	/// assert_eq!(PreferredFormat::DEFAULT.io_buffer_duration.as_millis(), 10);
	/// ```
	pub const DEFAULT: Self = Self {
		sample_rate: 48_000.0,
		channels: Channels::Stereo,
		io_buffer_duration: Duration::from_millis(10),
	};
}

impl Default for PreferredFormat {
	fn default() -> Self {
		Self::DEFAULT
	}
}

//---------------------------------------------------------------------------------------------------- StreamDescription
/// The stream description handed to an output unit.
///
/// Always packed, signed, interleaved 16-bit linear PCM.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct StreamDescription {
	/// Frames per second.
	pub sample_rate: f64,
	/// Bytes in a packet, equal to `bytes_per_frame`.
	pub bytes_per_packet: u32,
	/// Always `1`.
	pub frames_per_packet: u32,
	/// `channels_per_frame * SAMPLE_SIZE`.
	pub bytes_per_frame: u32,
	/// Interleaved channel count.
	pub channels_per_frame: u32,
	/// Always [`BITS_PER_CHANNEL`].
	pub bits_per_channel: u32,
}

impl From<AudioFormat> for StreamDescription {
	#[allow(clippy::cast_possible_truncation)]
	fn from(format: AudioFormat) -> Self {
		let bytes_per_frame = format.bytes_per_frame() as u32;

		Self {
			sample_rate: f64::from(format.sample_rate()),
			bytes_per_packet: bytes_per_frame,
			frames_per_packet: 1,
			bytes_per_frame,
			channels_per_frame: format.channels().count(),
			bits_per_channel: BITS_PER_CHANNEL,
		}
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	#[cfg(feature = "serde")]
	fn deserialize_is_checked() {
		let unchecked = |sample_rate, frames_per_buffer| UncheckedAudioFormat {
			channels: Channels::Mono,
			sample_rate,
			frames_per_buffer,
		};

		assert!(AudioFormat::try_from(unchecked(0, 441)).is_err());
		assert!(AudioFormat::try_from(unchecked(44_100, 0)).is_err());
		assert_eq!(
			AudioFormat::try_from(unchecked(44_100, 441)),
			Ok(AudioFormat::new(Channels::Mono, 44_100, 441).unwrap()),
		);
	}

	#[test]
	fn frames_round_to_nearest() {
		// 22050 * 0.023219954 = 511.999...
		let format = AudioFormat::from_session_values(22_050.0, Duration::from_nanos(23_219_954), 2).unwrap();
		assert_eq!(format.frames_per_buffer(), 512);

		let format = AudioFormat::from_session_values(48_000.0, Duration::from_millis(10), 2).unwrap();
		assert_eq!(format.frames_per_buffer(), 480);
		assert_eq!(format.channels(), Channels::Stereo);
	}

	#[test]
	fn invalid_session_values() {
		assert_eq!(AudioFormat::from_session_values(0.0, Duration::from_millis(10), 2), None);
		assert_eq!(AudioFormat::from_session_values(f64::NAN, Duration::from_millis(10), 2), None);
		assert_eq!(AudioFormat::from_session_values(48_000.0, Duration::ZERO, 2), None);
	}

	#[test]
	fn stream_description() {
		let mono = StreamDescription::from(AudioFormat::new(Channels::Mono, 44_100, 441).unwrap());
		assert_eq!(mono.bytes_per_frame, 2);
		assert_eq!(mono.bytes_per_packet, 2);
		assert_eq!(mono.channels_per_frame, 1);
		assert_eq!(mono.bits_per_channel, 16);
		assert_eq!(mono.sample_rate, 44_100.0);

		let stereo = StreamDescription::from(AudioFormat::new(Channels::Stereo, 48_000, 480).unwrap());
		assert_eq!(stereo.bytes_per_frame, 4);
		assert_eq!(stereo.frames_per_packet, 1);
	}
}
