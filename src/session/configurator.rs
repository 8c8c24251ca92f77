//! Session configuration.

//---------------------------------------------------------------------------------------------------- use
use crossbeam::channel::Sender;
use crate::{
	config::DeviceConfig,
	error::SessionError,
	session::{AudioSession,SessionEvent,SessionRequest,SubscriptionId},
	macros::{debug2,warn2},
};

//---------------------------------------------------------------------------------------------------- Configured
/// The outcome of [`configure`].
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Configured {
	/// The event subscription made on the session.
	pub subscription: SubscriptionId,
	/// Requests the session rejected, in the order they were made.
	pub failed: Vec<SessionRequest>,
}

//---------------------------------------------------------------------------------------------------- configure
#[cold]
#[inline(never)]
/// Apply the preferred format and category to `session` and activate it.
///
/// Every request is attempted exactly once, in order:
/// 1. preferred sample rate
/// 2. preferred output channel count
/// 3. preferred I/O buffer duration
/// 4. category
/// 5. (subscribe `events`)
/// 6. activation
///
/// Failures are logged and collected in [`Configured::failed`], they
/// never stop the following requests. The session may also _accept_ a
/// request and still grant another value, so callers must read the
/// session's values back after this returns.
///
/// `events` is subscribed before activation so that no
/// event posted during activation can be missed.
pub fn configure<S: AudioSession>(
	session: &S,
	config: &DeviceConfig,
	events: Sender<SessionEvent>,
) -> Configured {
	let preferred = &config.preferred;
	debug2!("Session - configure(), preferred: {preferred:?}, category: {}", config.category);

	let mut failed = Vec::new();
	let mut attempt = |request: SessionRequest, result: Result<(), SessionError>| {
		if let Err(e) = result {
			warn2!("Session - {request} request failed: {e}");
			failed.push(request);
		}
	};

	attempt(SessionRequest::SampleRate, session.set_preferred_sample_rate(preferred.sample_rate));
	attempt(SessionRequest::OutputChannels, session.set_preferred_output_channels(preferred.channels.count()));
	attempt(SessionRequest::IoBufferDuration, session.set_preferred_io_buffer_duration(preferred.io_buffer_duration));
	attempt(SessionRequest::Category, session.set_category(config.category));

	let subscription = session.subscribe(events);

	attempt(SessionRequest::Activate, session.set_active(true));

	debug2!(
		"Session - configured, sample_rate: {}, io_buffer_duration: {:?}, output_channels: {}",
		session.sample_rate(),
		session.io_buffer_duration(),
		session.output_channels(),
	);

	Configured {
		subscription,
		failed,
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::{DummySession,DummyCall,Category};
	use pretty_assertions::assert_eq;
	use std::time::Duration;

	#[test]
	fn requests_in_order_subscribe_before_activate() {
		let session = DummySession::new();
		let (send, _recv) = crossbeam::channel::unbounded();

		let configured = configure(&session, &DeviceConfig::DEFAULT, send);
		assert_eq!(configured.failed, vec![]);
		assert_eq!(session.calls(), vec![
			DummyCall::Request(SessionRequest::SampleRate),
			DummyCall::Request(SessionRequest::OutputChannels),
			DummyCall::Request(SessionRequest::IoBufferDuration),
			DummyCall::Request(SessionRequest::Category),
			DummyCall::Subscribe,
			DummyCall::Request(SessionRequest::Activate),
		]);
		assert_eq!(session.category(), Some(Category::Playback));
		assert!(session.is_active());
		assert_eq!(session.subscriber_count(), 1);
	}

	#[test]
	fn failures_are_not_fatal() {
		let session = DummySession::new();
		session.reject(SessionRequest::SampleRate);
		session.reject(SessionRequest::Category);
		let (send, _recv) = crossbeam::channel::unbounded();

		let configured = configure(&session, &DeviceConfig::DEFAULT, send);
		assert_eq!(configured.failed, vec![SessionRequest::SampleRate, SessionRequest::Category]);

		// Everything after the failures was still attempted, once.
		assert!(session.is_active());
		assert_eq!(session.category(), None);
		assert_eq!(session.calls().len(), 6);

		// The rejected sample rate was never applied,
		// the rest of the preferences were.
		assert_eq!(session.sample_rate(), DummySession::HARDWARE.sample_rate);
		assert_eq!(session.io_buffer_duration(), Duration::from_millis(10));
	}
}
