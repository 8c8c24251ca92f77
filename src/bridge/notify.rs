//! Session event handlers.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	bridge::Bridge,
	format::AudioFormat,
	session::{AudioSession,RouteChangeReason,SessionEvent},
	state::DeviceState,
	unit::OutputUnit,
	macros::{debug2,info2,trace2,warn2},
};

//----------------------------------------------------------------------------------------------------
impl<S, U> Bridge<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	/// Map a session event to its handler.
	pub(super) fn handle_event(&mut self, event: SessionEvent) {
		debug2!("Bridge - session event: {event}");

		match event {
			SessionEvent::InterruptionBegan => self.interruption_began(),
			SessionEvent::InterruptionEnded { should_resume } => self.interruption_ended(should_resume),
			SessionEvent::RouteChange(reason) => self.route_change(reason),
			SessionEvent::MediaServicesLost => self.media_services_lost(),
			SessionEvent::MediaServicesReset => self.media_services_reset(),
		}
	}

	fn interruption_began(&mut self) {
		self.interrupted = true;
		self.pause_unit();
		if self.state == DeviceState::Rendering {
			self.state = DeviceState::Interrupted;
		}
	}

	fn interruption_ended(&mut self, should_resume: bool) {
		// The unit restarts regardless of the hint.
		debug2!("Bridge - interruption ended, should_resume: {should_resume}");

		// The interruption is over even if the unit fails to
		// restart, that case looks like lost media services:
		// `Rendering` with the unit not running.
		self.interrupted = false;
		self.resume_unit();
		if self.state == DeviceState::Interrupted {
			self.state = DeviceState::Rendering;
		}
	}

	fn route_change(&mut self, reason: RouteChangeReason) {
		if self.interrupted || self.unit.is_none() {
			trace2!("Bridge - ignoring route change ({reason}), interrupted: {}", self.interrupted);
			return;
		}

		let Some(format) = AudioFormat::from_session(&*self.session) else {
			warn2!("Bridge - route change ({reason}) left the session with an invalid format");
			return;
		};

		if self.format == Some(format) {
			trace2!("Bridge - route change ({reason}), format unchanged");
			return;
		}

		info2!("Bridge - route change ({reason}), format changed: {:?} -> {format:?}", self.format);
		self.format = None;
		if let Some(host) = self.arena.host() {
			host.format_changed();
		}
	}

	fn media_services_lost(&mut self) {
		warn2!("Bridge - media services lost");
		self.pause_unit();
	}

	fn media_services_reset(&mut self) {
		info2!("Bridge - media services reset");
		if !self.interrupted {
			self.resume_unit();
		}
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use crate::{
		format::{AudioFormat,Channels},
		host::Renderer,
		session::{RouteChangeReason,SessionEvent,SessionValues},
		state::DeviceState,
		tests::{TestHost,init},
		unit::UnitStep,
	};
	use pretty_assertions::assert_eq;
	use std::time::Duration;

	const HEADPHONES: SessionValues = SessionValues {
		sample_rate: 44_100.0,
		output_channels: 1,
		io_buffer_duration: Duration::from_millis(10),
	};

	#[test]
	fn interruption_stops_and_restarts() {
		let (mut device, session, unit) = init();
		let host = TestHost::new(1);
		device.initialize_renderer().unwrap();
		device.start_rendering(host.clone()).unwrap();

		session.post(SessionEvent::InterruptionBegan);
		let snapshot = device.snapshot().unwrap();
		assert_eq!(snapshot.state, DeviceState::Interrupted);
		assert!(snapshot.interrupted);
		assert!(!snapshot.unit_running);
		assert!(!unit.is_running());
		// Stopped, not disposed.
		assert_eq!(unit.alive(), 1);
		assert_eq!(unit.render(480), None);

		session.post(SessionEvent::InterruptionEnded { should_resume: false });
		let snapshot = device.snapshot().unwrap();
		assert_eq!(snapshot.state, DeviceState::Rendering);
		assert!(!snapshot.interrupted);
		assert!(snapshot.unit_running);
		assert_eq!(unit.created(), 1);
		assert!(!unit.render(480).unwrap().silent);
	}

	#[test]
	fn start_while_interrupted() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();

		session.post(SessionEvent::InterruptionBegan);
		device.start_rendering(TestHost::new(1)).unwrap();

		assert_eq!(device.snapshot().unwrap().state, DeviceState::Interrupted);
		assert!(unit.is_initialized());
		assert!(!unit.is_running());
		assert!(!unit.steps().contains(&UnitStep::Start));

		session.post(SessionEvent::InterruptionEnded { should_resume: true });
		assert_eq!(device.snapshot().unwrap().state, DeviceState::Rendering);
		assert!(unit.is_running());
	}

	#[test]
	fn stop_while_interrupted() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();

		session.post(SessionEvent::InterruptionBegan);
		device.stop_rendering().unwrap();
		assert_eq!(unit.alive(), 0);

		// Nothing to restart.
		session.post(SessionEvent::InterruptionEnded { should_resume: true });
		let snapshot = device.snapshot().unwrap();
		assert_eq!(snapshot.state, DeviceState::Stopped);
		assert_eq!(unit.created(), 1);
	}

	#[test]
	fn route_change_while_interrupted_is_ignored() {
		let (mut device, session, _) = init();
		let host = TestHost::new(1);
		device.initialize_renderer().unwrap();
		device.start_rendering(host.clone()).unwrap();
		let before = device.snapshot().unwrap();

		session.post(SessionEvent::InterruptionBegan);
		session.set_route(HEADPHONES);
		session.post(SessionEvent::RouteChange(RouteChangeReason::NewDeviceAvailable));

		let after = device.snapshot().unwrap();
		assert_eq!(after.format, before.format);
		assert_eq!(host.format_changes(), 0);
	}

	#[test]
	fn route_change_without_unit_is_ignored() {
		let (mut device, session, _) = init();
		let before = device.render_format().unwrap();

		session.set_route(HEADPHONES);
		session.post(SessionEvent::RouteChange(RouteChangeReason::OldDeviceUnavailable));
		assert_eq!(device.snapshot().unwrap().format, Some(before));
	}

	#[test]
	fn route_change_signals_format_change() {
		let (mut device, session, _) = init();
		let host = TestHost::new(1);
		device.initialize_renderer().unwrap();
		device.start_rendering(host.clone()).unwrap();

		session.set_route(HEADPHONES);
		session.post(SessionEvent::RouteChange(RouteChangeReason::NewDeviceAvailable));

		assert_eq!(device.snapshot().unwrap().format, None);
		assert_eq!(host.format_changes(), 1);
		assert_eq!(
			device.render_format().unwrap(),
			AudioFormat::new(Channels::Mono, 44_100, 441).unwrap(),
		);
	}

	#[test]
	fn route_change_same_format() {
		let (mut device, session, _) = init();
		let host = TestHost::new(1);
		device.initialize_renderer().unwrap();
		device.start_rendering(host.clone()).unwrap();

		session.post(SessionEvent::RouteChange(RouteChangeReason::CategoryChange));
		assert!(device.snapshot().unwrap().format.is_some());
		assert_eq!(host.format_changes(), 0);
	}

	#[test]
	fn media_services() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();

		session.post(SessionEvent::MediaServicesLost);
		let snapshot = device.snapshot().unwrap();
		assert!(!snapshot.unit_running);
		assert!(!unit.is_running());
		assert_eq!(unit.alive(), 1);

		session.post(SessionEvent::MediaServicesReset);
		assert!(device.snapshot().unwrap().unit_running);
		assert!(unit.is_running());
	}

	#[test]
	fn media_reset_while_interrupted() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();

		session.post(SessionEvent::InterruptionBegan);
		session.post(SessionEvent::MediaServicesLost);
		session.post(SessionEvent::MediaServicesReset);
		assert!(!device.snapshot().unwrap().unit_running);
		assert!(!unit.is_running());

		session.post(SessionEvent::InterruptionEnded { should_resume: true });
		// Wait for the bridge to handle the event.
		assert!(device.snapshot().unwrap().unit_running);
		assert!(unit.is_running());
	}

	#[test]
	fn failed_resume_keeps_state_consistent() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();

		session.post(SessionEvent::InterruptionBegan);
		unit.fail_at(UnitStep::Start);
		session.post(SessionEvent::InterruptionEnded { should_resume: true });

		let snapshot = device.snapshot().unwrap();
		assert_eq!(snapshot.state, DeviceState::Rendering);
		assert!(!snapshot.interrupted);
		assert!(!snapshot.unit_running);
		assert!(!unit.is_running());
		assert_eq!(unit.alive(), 1);

		// Same recovery path as lost media services.
		unit.clear_failure();
		session.post(SessionEvent::MediaServicesReset);
		let snapshot = device.snapshot().unwrap();
		assert_eq!(snapshot.state, DeviceState::Rendering);
		assert!(snapshot.unit_running);
		assert!(unit.is_running());
	}

	#[test]
	fn events_before_lifecycle_are_ordered() {
		let (mut device, session, unit) = init();
		device.initialize_renderer().unwrap();

		// Queued before the start request, must be seen by it.
		session.post(SessionEvent::InterruptionBegan);
		session.post(SessionEvent::InterruptionEnded { should_resume: true });
		session.post(SessionEvent::InterruptionBegan);
		device.start_rendering(TestHost::new(1)).unwrap();

		assert!(!unit.is_running());
		assert_eq!(device.snapshot().unwrap().state, DeviceState::Interrupted);
	}
}
