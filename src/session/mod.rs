//! The shared audio session.
//!
//! An [`AudioSession`] is the process-wide audio configuration
//! (sample rate, channel count, buffer duration, category) that
//! all audio I/O in the process goes through.
//!
//! The device never owns the session, it only:
//! - asks for _preferred_ values once ([`configure`])
//! - reads back the _actual_ values whenever it needs a format
//! - listens to [`SessionEvent`]'s

//---------------------------------------------------------------------------------------------------- use
use std::{
	sync::Mutex,
	time::Duration,
};
use crossbeam::channel::Sender;
use strum::{
	AsRefStr,Display,EnumCount,EnumIter,
	EnumString,EnumVariantNames,IntoStaticStr,
};
use crate::{
	error::SessionError,
	macros::trace2,
};

mod configurator;
pub use configurator::{configure,Configured};

cfg_if::cfg_if! {
	if #[cfg(any(test, feature = "dummy"))] {
		mod dummy;
		pub use dummy::{DummySession,DummyCall,SessionValues};
	}
}

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub use self::cpal::CpalSession;

//---------------------------------------------------------------------------------------------------- AudioSession
/// The platform's shared audio session.
///
/// Implementors are shared between the host's threads and the
/// device's bridge thread, so every function takes `&self`.
///
/// # Invariants
/// - `set_preferred_*` are _requests_, the getters must
///   report what the session actually granted, not the request
/// - `subscribe()`'d senders must receive every [`SessionEvent`]
///   posted until `unsubscribe()` is called
pub trait AudioSession: Send + Sync + 'static {
	/// Request a preferred sample rate (Hz).
	fn set_preferred_sample_rate(&self, sample_rate: f64) -> Result<(), SessionError>;

	/// Request a preferred output channel count.
	fn set_preferred_output_channels(&self, channels: u32) -> Result<(), SessionError>;

	/// Request a preferred I/O buffer duration.
	fn set_preferred_io_buffer_duration(&self, duration: Duration) -> Result<(), SessionError>;

	/// Set the session's category.
	fn set_category(&self, category: Category) -> Result<(), SessionError>;

	/// Activate or deactivate the session.
	fn set_active(&self, active: bool) -> Result<(), SessionError>;

	/// The current sample rate (Hz).
	fn sample_rate(&self) -> f64;

	/// The current I/O buffer duration.
	fn io_buffer_duration(&self) -> Duration;

	/// The current output channel count of the active route.
	fn output_channels(&self) -> u32;

	/// Start delivering session events to `events`.
	fn subscribe(&self, events: Sender<SessionEvent>) -> SubscriptionId;

	/// Stop delivering events to the subscriber `id`.
	fn unsubscribe(&self, id: SubscriptionId);
}

//---------------------------------------------------------------------------------------------------- Category
/// Session categories.
///
/// The device only ever asks for [`Category::Playback`]
/// by default, the rest exist so hosts can override it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
	/// Mixes with others, silenced by the ringer switch.
	Ambient,
	/// Not mixable, silenced by the ringer switch.
	SoloAmbient,
	#[default]
	/// Playback only, not silenced by the ringer switch.
	Playback,
	/// Recording only.
	Record,
	/// Simultaneous playback and recording.
	PlayAndRecord,
	/// Multiple simultaneous routes.
	MultiRoute,
}

impl Category {
	/// [`Category::Playback`]
	pub const DEFAULT: Self = Self::Playback;
}

//---------------------------------------------------------------------------------------------------- SessionRequest
/// A single request the configurator makes to the session.
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionRequest {
	/// [`AudioSession::set_preferred_sample_rate`]
	SampleRate,
	/// [`AudioSession::set_preferred_output_channels`]
	OutputChannels,
	/// [`AudioSession::set_preferred_io_buffer_duration`]
	IoBufferDuration,
	/// [`AudioSession::set_category`]
	Category,
	/// [`AudioSession::set_active`]
	Activate,
}

//---------------------------------------------------------------------------------------------------- RouteChangeReason
/// Why the session's route changed.
///
/// Every reason is handled the same way (the route may
/// have changed the sample rate or channel count), it is
/// only carried for logging.
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,EnumVariantNames,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RouteChangeReason {
	#[default]
	/// Unknown.
	Unknown,
	/// e.g. headphones plugged in.
	NewDeviceAvailable,
	/// e.g. headphones unplugged.
	OldDeviceUnavailable,
	/// The session's category changed.
	CategoryChange,
	/// The output route was overridden.
	Override,
	/// The device woke from sleep.
	WakeFromSleep,
	/// No route exists for the current category.
	NoSuitableRouteForCategory,
	/// The set of inputs/outputs did not change but their configuration did.
	RouteConfigurationChange,
}

//---------------------------------------------------------------------------------------------------- SessionEvent
/// Notifications posted by the session.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[derive(AsRefStr,Display,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionEvent {
	/// Another audio client took over (phone call, alarm, etc).
	InterruptionBegan,
	/// The interruption is over.
	InterruptionEnded {
		/// The session hinted that playback should resume.
		should_resume: bool,
	},
	/// The audio route changed.
	RouteChange(RouteChangeReason),
	/// The platform's media services were lost.
	MediaServicesLost,
	/// The platform's media services were restored.
	MediaServicesReset,
}

//---------------------------------------------------------------------------------------------------- SubscriptionId
/// Handle returned by [`AudioSession::subscribe`].
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
pub struct SubscriptionId(pub u64);

//---------------------------------------------------------------------------------------------------- Subscribers
/// A list of event subscribers.
///
/// Shared building block for session backends.
#[cfg_attr(not(any(test, feature = "dummy", feature = "cpal")), allow(dead_code))]
#[derive(Debug,Default)]
pub(crate) struct Subscribers {
	next: u64,
	list: Vec<(SubscriptionId, Sender<SessionEvent>)>,
}

#[cfg_attr(not(any(test, feature = "dummy", feature = "cpal")), allow(dead_code))]
impl Subscribers {
	pub(crate) const fn new() -> Self {
		Self {
			next: 0,
			list: Vec::new(),
		}
	}

	pub(crate) fn subscribe(&mut self, events: Sender<SessionEvent>) -> SubscriptionId {
		let id = SubscriptionId(self.next);
		self.next += 1;
		self.list.push((id, events));
		id
	}

	pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) {
		self.list.retain(|(i, _)| *i != id);
	}

	pub(crate) fn len(&self) -> usize {
		self.list.len()
	}

	/// Send `event` to every subscriber.
	///
	/// Subscribers whose receiver is gone are dropped.
	pub(crate) fn post(&mut self, event: SessionEvent) {
		trace2!("Session - posting {event} to {} subscriber(s)", self.list.len());
		self.list.retain(|(_, sender)| sender.send(event).is_ok());
	}
}

/// Lock a backend's state, ignoring poison.
///
/// Session state is plain data, a panic
/// mid-update cannot leave it torn.
#[cfg_attr(not(any(test, feature = "dummy", feature = "cpal")), allow(dead_code))]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn subscribers_post_and_drop_closed() {
		let mut subs = Subscribers::new();
		let (a_send, a_recv) = crossbeam::channel::unbounded();
		let (b_send, b_recv) = crossbeam::channel::unbounded();

		let a = subs.subscribe(a_send);
		let b = subs.subscribe(b_send);
		assert_ne!(a, b);
		assert_eq!(subs.len(), 2);

		subs.post(SessionEvent::MediaServicesLost);
		assert_eq!(a_recv.try_recv().unwrap(), SessionEvent::MediaServicesLost);
		assert_eq!(b_recv.try_recv().unwrap(), SessionEvent::MediaServicesLost);

		drop(b_recv);
		subs.post(SessionEvent::InterruptionBegan);
		assert_eq!(subs.len(), 1);

		subs.unsubscribe(a);
		assert_eq!(subs.len(), 0);
	}

	#[test]
	fn event_names() {
		assert_eq!(SessionEvent::InterruptionBegan.as_ref(), "interruption_began");
		assert_eq!(SessionEvent::RouteChange(RouteChangeReason::Override).as_ref(), "route_change");
		assert_eq!(RouteChangeReason::NewDeviceAvailable.to_string(), "new_device_available");
		assert_eq!(Category::PlayAndRecord.as_ref(), "play_and_record");
	}
}
