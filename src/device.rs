//! The public device handle.

//---------------------------------------------------------------------------------------------------- Use
use std::{
	marker::PhantomData,
	sync::Arc,
	thread::JoinHandle,
};
use crossbeam::channel::{Receiver,Sender,bounded,unbounded};
use crate::{
	bridge::{Bridge,Channels,InitArgs},
	config::DeviceConfig,
	error::{DeviceError,DeviceInitError},
	format::AudioFormat,
	host::{AudioDevice,HostContext,Renderer},
	session::AudioSession,
	state::DeviceSnapshot,
	unit::OutputUnit,
	macros::{debug2,info2},
};

//---------------------------------------------------------------------------------------------------- Device
/// A playback-only audio device.
///
/// This is the handle the host SDK holds, it offers the
/// [`Renderer`] capability through [`AudioDevice`] and no
/// capture capability.
///
/// All work happens on an internal bridge thread, every
/// function here sends a request to it and waits for the
/// response. Session events are handled on the same thread,
/// so they are never concurrent with a lifecycle call.
///
/// Dropping the `Device` stops rendering (if needed),
/// unsubscribes from the session and shuts the thread down,
/// see [`DeviceConfig::shutdown_blocking`].
pub struct Device<S: AudioSession, U: OutputUnit> {
	shutdown_blocking: bool,
	bridge: Option<JoinHandle<()>>,

	shutdown: Sender<()>,
	shutdown_hang: Sender<()>,
	shutdown_done: Receiver<()>,

	recv_result: Receiver<Result<(), DeviceError>>,
	send_initialize: Sender<()>,
	send_start: Sender<Arc<dyn HostContext>>,
	send_stop: Sender<()>,

	recv_format: Receiver<Result<AudioFormat, DeviceError>>,
	send_format: Sender<()>,

	recv_snapshot: Receiver<DeviceSnapshot>,
	send_snapshot: Sender<()>,

	_marker: PhantomData<(Arc<S>, fn() -> U)>,
}

impl<S: AudioSession, U: OutputUnit> std::fmt::Debug for Device<S, U> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Device")
			.field("shutdown_blocking", &self.shutdown_blocking)
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- Device Impl
impl<S, U> Device<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	#[cold]
	#[inline(never)]
	/// Create the device.
	///
	/// This spawns the bridge thread, which configures and activates
	/// `session` with `config` (see [`crate::session::configure`])
	/// before this function returns.
	///
	/// `unit_config` is used every time an output unit is built.
	///
	/// # Errors
	/// If the thread could not be spawned, or exited during initialization.
	pub fn init(
		config: DeviceConfig,
		session: Arc<S>,
		unit_config: U::Config,
	) -> Result<Self, DeviceInitError> {
		info2!("Device - initializing...");
		debug2!("Device - config: {config:#?}");

		// Shutdown.
		let (shutdown, shutdown_recv)           = bounded(1);
		let (shutdown_hang, shutdown_hang_recv) = bounded(1);
		let (shutdown_done_send, shutdown_done) = bounded(1);

		// Session events. The session may post
		// any amount of these, it must never block.
		let (to_events, events) = unbounded();

		// Lifecycle.
		let (send_result, recv_result)         = bounded(1);
		let (send_initialize, recv_initialize) = bounded(1);
		let (send_start, recv_start)           = bounded(1);
		let (send_stop, recv_stop)             = bounded(1);
		let (send_format_ret, recv_format)     = bounded(1);
		let (send_format, recv_format_req)     = bounded(1);
		let (send_snapshot_ret, recv_snapshot) = bounded(1);
		let (send_snapshot, recv_snapshot_req) = bounded(1);

		let (ready, ready_recv) = bounded(1);

		let channels = Channels {
			shutdown: shutdown_recv,
			shutdown_hang: shutdown_hang_recv,
			shutdown_done: shutdown_done_send,
			events,
			send_result,
			recv_initialize,
			recv_start,
			recv_stop,
			send_format: send_format_ret,
			recv_format: recv_format_req,
			send_snapshot: send_snapshot_ret,
			recv_snapshot: recv_snapshot_req,
		};

		let bridge = Bridge::<S, U>::init(InitArgs {
			config,
			session,
			unit_config,
			channels,
			to_events,
			ready,
			_unit: PhantomData,
		})?;

		// The session must be configured before the host gets
		// the device, its first `render_format()` depends on it.
		if ready_recv.recv().is_err() {
			return Err(DeviceInitError::Disconnected);
		}

		info2!("Device - initializing ... OK");
		Ok(Self {
			shutdown_blocking: config.shutdown_blocking,
			bridge: Some(bridge),
			shutdown,
			shutdown_hang,
			shutdown_done,
			recv_result,
			send_initialize,
			send_start,
			send_stop,
			recv_format,
			send_format,
			recv_snapshot,
			send_snapshot,
			_marker: PhantomData,
		})
	}

	/// Observe the device's current state.
	///
	/// Session events posted before this call are reflected in the snapshot.
	///
	/// # Errors
	/// [`DeviceError::Disconnected`] if the bridge thread is gone.
	pub fn snapshot(&mut self) -> Result<DeviceSnapshot, DeviceError> {
		Self::call(&self.send_snapshot, (), &self.recv_snapshot)
	}

	#[inline]
	/// Send a request to the bridge and wait for its response.
	///
	/// Every caller holds `&mut self`, so there is
	/// never more than 1 response in flight.
	fn call<T, R>(to: &Sender<T>, request: T, from: &Receiver<R>) -> Result<R, DeviceError> {
		to.send(request).map_err(|_| DeviceError::Disconnected)?;
		from.recv().map_err(|_| DeviceError::Disconnected)
	}
}

//---------------------------------------------------------------------------------------------------- `Renderer` Impl
impl<S, U> Renderer for Device<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	fn render_format(&mut self) -> Result<AudioFormat, DeviceError> {
		Self::call(&self.send_format, (), &self.recv_format)?
	}

	fn initialize_renderer(&mut self) -> Result<(), DeviceError> {
		Self::call(&self.send_initialize, (), &self.recv_result)?
	}

	fn start_rendering(&mut self, host: Arc<dyn HostContext>) -> Result<(), DeviceError> {
		Self::call(&self.send_start, host, &self.recv_result)?
	}

	fn stop_rendering(&mut self) -> Result<(), DeviceError> {
		Self::call(&self.send_stop, (), &self.recv_result)?
	}
}

//---------------------------------------------------------------------------------------------------- `AudioDevice` Impl
impl<S, U> AudioDevice for Device<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	fn renderer(&mut self) -> Option<&mut dyn Renderer> {
		Some(self)
	}
}

//---------------------------------------------------------------------------------------------------- Drop
impl<S: AudioSession, U: OutputUnit> Drop for Device<S, U> {
	#[cold]
	#[inline(never)]
	fn drop(&mut self) {
		if self.shutdown_blocking {
			info2!("Device - waiting on shutdown ...");
			// Tell the bridge to shutdown,
			// and to tell us when it's done.
			if self.shutdown_hang.try_send(()).is_ok() {
				drop(self.shutdown_done.recv());
			}
			if let Some(bridge) = self.bridge.take() {
				drop(bridge.join());
			}
			info2!("Device - waiting on shutdown ... OK");
		} else {
			// Tell the bridge to shutdown,
			// and to not notify us.
			drop(self.shutdown.try_send(()));
			info2!("Device - async shutdown ... OK");
		}
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		config::DeviceConfig,
		session::{DummyCall,DummySession,SessionEvent,SessionRequest},
		state::DeviceState,
		tests::{TestHost,init,init_with},
		unit::{DummyUnit,DummyUnitHandle},
	};
	use pretty_assertions::assert_eq;

	#[test]
	fn init_configures_session() {
		let (mut device, session, unit) = init();
		assert!(session.is_active());
		assert_eq!(session.subscriber_count(), 1);
		assert_eq!(session.calls().last(), Some(&DummyCall::Request(SessionRequest::Activate)));
		assert_eq!(device.snapshot().unwrap(), DeviceSnapshot::NEW);
		assert_eq!(unit.created(), 0);
	}

	#[test]
	fn init_with_rejected_requests() {
		let session = DummySession::new();
		session.reject(SessionRequest::SampleRate);
		session.reject(SessionRequest::Category);
		let (mut device, session, _) = init_with(session, DummyUnitHandle::new());

		assert!(session.is_active());
		assert_eq!(session.subscriber_count(), 1);
		assert_eq!(device.snapshot().unwrap(), DeviceSnapshot::NEW);
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();
	}

	#[test]
	fn playback_only() {
		let (mut device, _, _) = init();
		assert!(device.capturer().is_none());

		let renderer = device.renderer().unwrap();
		renderer.initialize_renderer().unwrap();
		renderer.start_rendering(TestHost::new(1)).unwrap();
		assert_eq!(device.snapshot().unwrap().state, DeviceState::Rendering);
	}

	#[test]
	fn drop_stops_and_unsubscribes() {
		let (mut device, session, unit) = init();
		let host = TestHost::new(1);
		device.initialize_renderer().unwrap();
		device.start_rendering(host.clone()).unwrap();

		drop(device);
		assert_eq!(unit.alive(), 0);
		assert!(!unit.is_running());
		assert_eq!(session.subscriber_count(), 0);
		assert_eq!(session.calls().last(), Some(&DummyCall::Unsubscribe));
		assert_eq!(Arc::strong_count(&host), 1);

		// Nobody is listening anymore.
		session.post(SessionEvent::InterruptionBegan);
	}

	#[test]
	fn drop_non_blocking() {
		let session = Arc::new(DummySession::new());
		let unit = DummyUnitHandle::new();
		let config = DeviceConfig {
			shutdown_blocking: false,
			..DeviceConfig::DEFAULT
		};

		let mut device = Device::<DummySession, DummyUnit>::init(config, Arc::clone(&session), unit.clone()).unwrap();
		device.initialize_renderer().unwrap();
		device.start_rendering(TestHost::new(1)).unwrap();
		drop(device);

		// The bridge exits in the background, wait for it.
		while session.subscriber_count() != 0 {
			std::thread::yield_now();
		}
		assert_eq!(unit.alive(), 0);
	}
}
