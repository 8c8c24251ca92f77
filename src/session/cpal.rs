//! Audio session over `cpal`.
//!
//! Desktop platforms have no shared audio session, so
//! this emulates one on top of the default output device:
//! preferences are stored, and on activation they are
//! checked against what the device actually supports.
//!
//! `cpal` has no route or interruption notifications,
//! applications forward their own with [`CpalSession::post`].

//---------------------------------------------------------------------------------------------------- use
use std::{
	borrow::Cow,
	sync::Mutex,
	time::Duration,
};
use crossbeam::channel::Sender;
use cpal::traits::{DeviceTrait,HostTrait};
use crate::{
	error::SessionError,
	format::{Channels,PreferredFormat},
	session::{
		AudioSession,Category,SessionEvent,
		Subscribers,SubscriptionId,lock,
	},
	macros::{debug2,warn2},
};

//---------------------------------------------------------------------------------------------------- CpalSession
/// An [`AudioSession`] emulated over `cpal`'s default output device.
#[derive(Debug)]
pub struct CpalSession {
	inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
	preferred: PreferredFormat,
	category: Category,
	active: bool,

	sample_rate: f64,
	output_channels: u32,
	io_buffer_duration: Duration,

	subscribers: Subscribers,
}

impl CpalSession {
	#[cold]
	#[inline(never)]
	/// Create the session.
	///
	/// Until activation, the values reported are the
	/// default output device's defaults (if it exists).
	pub fn new() -> Self {
		let preferred = PreferredFormat::DEFAULT;

		let (sample_rate, output_channels) = cpal::default_host()
			.default_output_device()
			.and_then(|device| device.default_output_config().ok())
			.map_or((preferred.sample_rate, preferred.channels.count()), |config| {
				(f64::from(config.sample_rate().0), u32::from(config.channels()))
			});

		Self {
			inner: Mutex::new(Inner {
				preferred,
				category: Category::DEFAULT,
				active: false,
				sample_rate,
				output_channels,
				io_buffer_duration: preferred.io_buffer_duration,
				subscribers: Subscribers::new(),
			}),
		}
	}

	/// Is the session active?
	pub fn is_active(&self) -> bool {
		lock(&self.inner).active
	}

	/// The current category.
	pub fn category(&self) -> Category {
		lock(&self.inner).category
	}

	/// Deliver `event` to every subscriber.
	pub fn post(&self, event: SessionEvent) {
		lock(&self.inner).subscribers.post(event);
	}

	/// Settle the preferences against the default output device.
	fn negotiate(inner: &mut Inner) -> Result<(), SessionError> {
		let device = cpal::default_host()
			.default_output_device()
			.ok_or(SessionError::Unavailable)?;

		let default = device
			.default_output_config()
			.map_err(|e| SessionError::Rejected(Cow::Owned(e.to_string())))?;

		let ranges = device
			.supported_output_configs()
			.map_err(|e| SessionError::Rejected(Cow::Owned(e.to_string())))?;

		// Fall back to the device's default if nothing matches.
		let mut sample_rate = default.sample_rate().0;
		let mut channels = u32::from(default.channels());
		let mut buffer_size = default.buffer_size().clone();

		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let wanted_rate = inner.preferred.sample_rate.round() as u32;
		let wanted_channels = inner.preferred.channels.count();

		for range in ranges {
			if u32::from(range.channels()) == wanted_channels
				&& (range.min_sample_rate().0..=range.max_sample_rate().0).contains(&wanted_rate)
			{
				sample_rate = wanted_rate;
				channels = wanted_channels;
				buffer_size = range.buffer_size().clone();
				break;
			}
		}

		let sample_rate = f64::from(sample_rate);
		let io_buffer_duration = match buffer_size {
			cpal::SupportedBufferSize::Range { min, max } => {
				#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
				let frames = (sample_rate * inner.preferred.io_buffer_duration.as_secs_f64()).round() as u32;
				let frames = frames.clamp(min, max);
				Duration::from_secs_f64(f64::from(frames) / sample_rate)
			},
			cpal::SupportedBufferSize::Unknown => inner.preferred.io_buffer_duration,
		};

		debug2!("CpalSession - granted sample_rate: {sample_rate}, channels: {channels}, io_buffer_duration: {io_buffer_duration:?}");
		inner.sample_rate = sample_rate;
		inner.output_channels = channels;
		inner.io_buffer_duration = io_buffer_duration;
		Ok(())
	}
}

impl Default for CpalSession {
	fn default() -> Self {
		Self::new()
	}
}

//---------------------------------------------------------------------------------------------------- `AudioSession` Impl
impl AudioSession for CpalSession {
	fn set_preferred_sample_rate(&self, sample_rate: f64) -> Result<(), SessionError> {
		if !sample_rate.is_finite() || sample_rate < 1.0 {
			return Err(SessionError::Rejected(Cow::Borrowed("sample rate must be positive")));
		}
		lock(&self.inner).preferred.sample_rate = sample_rate;
		Ok(())
	}

	fn set_preferred_output_channels(&self, channels: u32) -> Result<(), SessionError> {
		if channels == 0 {
			return Err(SessionError::Rejected(Cow::Borrowed("channel count must be positive")));
		}
		lock(&self.inner).preferred.channels = Channels::from_output_channels(channels);
		Ok(())
	}

	fn set_preferred_io_buffer_duration(&self, duration: Duration) -> Result<(), SessionError> {
		lock(&self.inner).preferred.io_buffer_duration = duration;
		Ok(())
	}

	fn set_category(&self, category: Category) -> Result<(), SessionError> {
		match category {
			Category::Ambient | Category::SoloAmbient | Category::Playback => {
				lock(&self.inner).category = category;
				Ok(())
			},
			_ => {
				warn2!("CpalSession - category {category} needs input, which is not supported");
				Err(SessionError::Rejected(Cow::Borrowed("input categories are not supported")))
			},
		}
	}

	fn set_active(&self, active: bool) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		if active {
			Self::negotiate(&mut inner)?;
		}
		inner.active = active;
		Ok(())
	}

	fn sample_rate(&self) -> f64 {
		lock(&self.inner).sample_rate
	}

	fn io_buffer_duration(&self) -> Duration {
		lock(&self.inner).io_buffer_duration
	}

	fn output_channels(&self) -> u32 {
		lock(&self.inner).output_channels
	}

	fn subscribe(&self, events: Sender<SessionEvent>) -> SubscriptionId {
		lock(&self.inner).subscribers.subscribe(events)
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		lock(&self.inner).subscribers.unsubscribe(id);
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn preferences_are_stored_once() {
		let session = CpalSession::new();

		session.set_preferred_output_channels(1).unwrap();
		assert_eq!(lock(&session.inner).preferred.channels, Channels::Mono);

		session.set_preferred_output_channels(6).unwrap();
		assert_eq!(lock(&session.inner).preferred.channels, Channels::Stereo);

		assert!(session.set_preferred_output_channels(0).is_err());
		assert_eq!(lock(&session.inner).preferred.channels, Channels::Stereo);
	}
}
