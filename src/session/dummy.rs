//! Dummy audio session.
//!
//! This file implements [`AudioSession`] without any platform.
//!
//! It behaves like a real shared session would:
//! - before activation it reports the hardware's values
//! - on activation it grants the preferences (or whatever it was told to grant)
//! - events are only delivered when [`DummySession::post`] is called
//!
//! This is used for testing purposes.

//---------------------------------------------------------------------------------------------------- use
use std::{
	sync::Mutex,
	time::Duration,
};
use crossbeam::channel::Sender;
use crate::{
	error::SessionError,
	session::{
		AudioSession,Category,SessionEvent,SessionRequest,
		Subscribers,SubscriptionId,lock,
	},
	macros::debug2,
};

//---------------------------------------------------------------------------------------------------- SessionValues
/// Values a [`DummySession`] reports.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct SessionValues {
	/// Sample rate in Hz.
	pub sample_rate: f64,
	/// Output channels of the current route.
	pub output_channels: u32,
	/// I/O buffer duration.
	pub io_buffer_duration: Duration,
}

//---------------------------------------------------------------------------------------------------- DummyCall
/// A call made on a [`DummySession`], see [`DummySession::calls`].
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum DummyCall {
	/// One of the `set_*` requests.
	Request(SessionRequest),
	/// [`AudioSession::subscribe`]
	Subscribe,
	/// [`AudioSession::unsubscribe`]
	Unsubscribe,
}

//---------------------------------------------------------------------------------------------------- DummySession
/// A fake [`AudioSession`].
#[derive(Debug)]
pub struct DummySession {
	inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
	/// What the route reports while inactive.
	hardware: SessionValues,
	/// What the route reports right now.
	current: SessionValues,
	/// If set, activation grants this instead of the preferences.
	grant: Option<SessionValues>,

	preferred_sample_rate: Option<f64>,
	preferred_output_channels: Option<u32>,
	preferred_io_buffer_duration: Option<Duration>,

	category: Option<Category>,
	active: bool,

	rejected: Vec<SessionRequest>,
	calls: Vec<DummyCall>,
	subscribers: Subscribers,
}

impl DummySession {
	/// What the "hardware" reports before activation,
	/// 44.1kHz stereo with 1024 frame buffers.
	pub const HARDWARE: SessionValues = SessionValues {
		sample_rate: 44_100.0,
		output_channels: 2,
		io_buffer_duration: Duration::from_nanos(23_219_954),
	};

	/// A session that grants every preference.
	pub fn new() -> Self {
		Self::with_hardware(Self::HARDWARE)
	}

	/// A session whose hardware reports `hardware` before activation.
	pub fn with_hardware(hardware: SessionValues) -> Self {
		Self {
			inner: Mutex::new(Inner {
				hardware,
				current: hardware,
				grant: None,
				preferred_sample_rate: None,
				preferred_output_channels: None,
				preferred_io_buffer_duration: None,
				category: None,
				active: false,
				rejected: Vec::new(),
				calls: Vec::new(),
				subscribers: Subscribers::new(),
			}),
		}
	}

	/// On activation, grant `values` regardless of the preferences.
	pub fn grant(&self, values: SessionValues) {
		lock(&self.inner).grant = Some(values);
	}

	/// Make every future `request` fail.
	pub fn reject(&self, request: SessionRequest) {
		lock(&self.inner).rejected.push(request);
	}

	/// Change the current route's values.
	///
	/// This does _not_ post a [`SessionEvent::RouteChange`], use [`Self::post`].
	pub fn set_route(&self, values: SessionValues) {
		let mut inner = lock(&self.inner);
		inner.hardware = values;
		inner.current = values;
	}

	/// Deliver `event` to every subscriber.
	pub fn post(&self, event: SessionEvent) {
		lock(&self.inner).subscribers.post(event);
	}

	/// Every call made on this session, in order.
	pub fn calls(&self) -> Vec<DummyCall> {
		lock(&self.inner).calls.clone()
	}

	/// Is the session active?
	pub fn is_active(&self) -> bool {
		lock(&self.inner).active
	}

	/// The category set, if any.
	pub fn category(&self) -> Option<Category> {
		lock(&self.inner).category
	}

	/// How many subscribers are currently registered?
	pub fn subscriber_count(&self) -> usize {
		lock(&self.inner).subscribers.len()
	}

	/// Record `request`, fail if it was rejected.
	fn request(inner: &mut Inner, request: SessionRequest) -> Result<(), SessionError> {
		inner.calls.push(DummyCall::Request(request));

		if inner.rejected.contains(&request) {
			debug2!("DummySession - rejecting {request}");
			Err(SessionError::Rejected(request.as_ref().to_owned().into()))
		} else {
			Ok(())
		}
	}
}

impl Default for DummySession {
	fn default() -> Self {
		Self::new()
	}
}

//---------------------------------------------------------------------------------------------------- `AudioSession` Impl
impl AudioSession for DummySession {
	fn set_preferred_sample_rate(&self, sample_rate: f64) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		Self::request(&mut inner, SessionRequest::SampleRate)?;
		inner.preferred_sample_rate = Some(sample_rate);
		Ok(())
	}

	fn set_preferred_output_channels(&self, channels: u32) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		Self::request(&mut inner, SessionRequest::OutputChannels)?;
		inner.preferred_output_channels = Some(channels);
		Ok(())
	}

	fn set_preferred_io_buffer_duration(&self, duration: Duration) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		Self::request(&mut inner, SessionRequest::IoBufferDuration)?;
		inner.preferred_io_buffer_duration = Some(duration);
		Ok(())
	}

	fn set_category(&self, category: Category) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		Self::request(&mut inner, SessionRequest::Category)?;
		inner.category = Some(category);
		Ok(())
	}

	fn set_active(&self, active: bool) -> Result<(), SessionError> {
		let mut inner = lock(&self.inner);
		Self::request(&mut inner, SessionRequest::Activate)?;

		inner.active = active;
		inner.current = if !active {
			inner.hardware
		} else if let Some(grant) = inner.grant {
			grant
		} else {
			SessionValues {
				sample_rate: inner.preferred_sample_rate.unwrap_or(inner.hardware.sample_rate),
				output_channels: inner.preferred_output_channels.unwrap_or(inner.hardware.output_channels),
				io_buffer_duration: inner.preferred_io_buffer_duration.unwrap_or(inner.hardware.io_buffer_duration),
			}
		};

		Ok(())
	}

	fn sample_rate(&self) -> f64 {
		lock(&self.inner).current.sample_rate
	}

	fn io_buffer_duration(&self) -> Duration {
		lock(&self.inner).current.io_buffer_duration
	}

	fn output_channels(&self) -> u32 {
		lock(&self.inner).current.output_channels
	}

	fn subscribe(&self, events: Sender<SessionEvent>) -> SubscriptionId {
		let mut inner = lock(&self.inner);
		inner.calls.push(DummyCall::Subscribe);
		inner.subscribers.subscribe(events)
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		let mut inner = lock(&self.inner);
		inner.calls.push(DummyCall::Unsubscribe);
		inner.subscribers.unsubscribe(id);
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn hardware_values_until_active() {
		let session = DummySession::new();
		session.set_preferred_sample_rate(48_000.0).unwrap();
		assert_eq!(session.sample_rate(), 44_100.0);

		session.set_active(true).unwrap();
		assert_eq!(session.sample_rate(), 48_000.0);
		assert_eq!(session.output_channels(), 2);

		session.set_active(false).unwrap();
		assert_eq!(session.sample_rate(), 44_100.0);
	}

	#[test]
	fn grant_overrides_preferences() {
		let session = DummySession::new();
		session.grant(SessionValues {
			sample_rate: 16_000.0,
			output_channels: 1,
			io_buffer_duration: Duration::from_millis(20),
		});
		session.set_preferred_sample_rate(48_000.0).unwrap();
		session.set_active(true).unwrap();
		assert_eq!(session.sample_rate(), 16_000.0);
		assert_eq!(session.output_channels(), 1);
		assert_eq!(session.io_buffer_duration(), Duration::from_millis(20));
	}
}
