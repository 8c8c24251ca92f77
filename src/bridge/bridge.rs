//! The render bridge.
//!
//! The bridge thread owns everything stateful about the
//! device: the output unit, the render context, the cached
//! format and the interruption flag. Lifecycle requests from
//! the [`Device`] and events from the session are handled in
//! one loop, so no two of them ever run concurrently.

//---------------------------------------------------------------------------------------------------- Use
use std::{
	marker::PhantomData,
	sync::Arc,
	thread::JoinHandle,
};
use crossbeam::channel::{Receiver,Select,Sender};
use crate::{
	bridge::context::ContextArena,
	config::DeviceConfig,
	error::DeviceError,
	format::AudioFormat,
	host::HostContext,
	session::{configure,AudioSession,SessionEvent,SubscriptionId},
	state::{DeviceSnapshot,DeviceState},
	unit::OutputUnit,
	macros::{debug2,info2,select_recv,try_send},
};

#[allow(unused_imports)] // docs
use crate::Device;

//---------------------------------------------------------------------------------------------------- Constants
/// The bridge thread's name.
const BRIDGE_THREAD_NAME: &str = "hostaudio Bridge";

//---------------------------------------------------------------------------------------------------- Bridge
/// The render bridge, see the module docs.
pub(crate) struct Bridge<S: AudioSession, U: OutputUnit> {
	pub(super) session: Arc<S>,
	pub(super) subscription: SubscriptionId,
	pub(super) unit_config: U::Config,

	pub(super) state: DeviceState,
	pub(super) interrupted: bool,
	/// The output unit, only `Some` between
	/// a successful start and the matching stop.
	pub(super) unit: Option<U>,
	pub(super) unit_running: bool,
	/// Cached render format.
	pub(super) format: Option<AudioFormat>,
	pub(super) arena: ContextArena,

	/// Keeps the event channel connected for as long as the
	/// bridge lives, a disconnected receiver is always "ready".
	_to_events: Sender<SessionEvent>,
}

//---------------------------------------------------------------------------------------------------- Channels
/// The bridge's side of the channels.
///
/// Kept outside of [`Bridge`] since `Select` needs `&`
/// to the receivers while the handlers need `&mut self`.
#[allow(clippy::missing_docs_in_private_items)]
pub(crate) struct Channels {
	// Shutdown signal.
	pub(crate) shutdown: Receiver<()>,
	pub(crate) shutdown_hang: Receiver<()>,
	pub(crate) shutdown_done: Sender<()>,

	// Session events.
	pub(crate) events: Receiver<SessionEvent>,

	// Shared return channel for the
	// lifecycle calls that return nothing.
	pub(crate) send_result: Sender<Result<(), DeviceError>>,

	pub(crate) recv_initialize: Receiver<()>,
	pub(crate) recv_start: Receiver<Arc<dyn HostContext>>,
	pub(crate) recv_stop: Receiver<()>,

	pub(crate) send_format: Sender<Result<AudioFormat, DeviceError>>,
	pub(crate) recv_format: Receiver<()>,

	pub(crate) send_snapshot: Sender<DeviceSnapshot>,
	pub(crate) recv_snapshot: Receiver<()>,
}

//---------------------------------------------------------------------------------------------------- InitArgs
#[allow(clippy::missing_docs_in_private_items)]
pub(crate) struct InitArgs<S: AudioSession, U: OutputUnit> {
	pub(crate) config: DeviceConfig,
	pub(crate) session: Arc<S>,
	pub(crate) unit_config: U::Config,
	pub(crate) channels: Channels,
	/// The session's event sender, handed to the session.
	pub(crate) to_events: Sender<SessionEvent>,
	/// Signalled once the session is configured.
	pub(crate) ready: Sender<()>,
	pub(crate) _unit: PhantomData<fn() -> U>,
}

//---------------------------------------------------------------------------------------------------- Bridge Impl
impl<S, U> Bridge<S, U>
where
	S: AudioSession,
	U: OutputUnit,
{
	//---------------------------------------------------------------------------------------------------- Init
	#[cold]
	#[inline(never)]
	/// Spawn the bridge thread.
	///
	/// The thread configures and activates the session,
	/// signals `ready`, then enters the main loop.
	pub(crate) fn init(args: InitArgs<S, U>) -> Result<JoinHandle<()>, std::io::Error> {
		std::thread::Builder::new()
			.name(BRIDGE_THREAD_NAME.into())
			.spawn(move || {
				let InitArgs {
					config,
					session,
					unit_config,
					channels,
					to_events,
					ready,
					_unit,
				} = args;

				let configured = configure(&*session, &config, to_events.clone());
				if !configured.failed.is_empty() {
					info2!("Bridge - session configured, failed requests: {:?}", configured.failed);
				}

				let this = Self {
					session,
					subscription: configured.subscription,
					unit_config,
					state: DeviceState::Uninitialized,
					interrupted: false,
					unit: None,
					unit_running: false,
					format: None,
					arena: ContextArena::new(),
					_to_events: to_events,
				};

				try_send!(ready, ());

				Self::main(this, channels);
			})
	}

	//---------------------------------------------------------------------------------------------------- Main Loop
	#[cold]
	#[inline(never)]
	/// `Bridge`'s main function.
	fn main(mut self, c: Channels) {
		let mut select = Select::new();

		// INVARIANT:
		// The order these are selected MUST match
		// the order of the match function mappings below.
		assert_eq!(0, select.recv(&c.events));
		assert_eq!(1, select.recv(&c.recv_initialize));
		assert_eq!(2, select.recv(&c.recv_start));
		assert_eq!(3, select.recv(&c.recv_stop));
		assert_eq!(4, select.recv(&c.recv_format));
		assert_eq!(5, select.recv(&c.recv_snapshot));
		assert_eq!(6, select.recv(&c.shutdown));
		assert_eq!(7, select.recv(&c.shutdown_hang));

		loop {
			let index = select.ready();

			// INVARIANT:
			// Events that arrived before a request are
			// applied before it, a request never observes
			// a state the session already moved past.
			if index != 0 {
				self.drain_events(&c.events);
			}

			match index {
				0 => self.handle_event(select_recv!(c.events)),

				1 => { select_recv!(c.recv_initialize); try_send!(c.send_result, self.initialize()) },
				2 => { let host = select_recv!(c.recv_start); try_send!(c.send_result, self.start(host)) },
				3 => { select_recv!(c.recv_stop); try_send!(c.send_result, self.stop()) },
				4 => { select_recv!(c.recv_format); try_send!(c.send_format, self.render_format()) },
				5 => { select_recv!(c.recv_snapshot); try_send!(c.send_snapshot, self.snapshot()) },

				// Shutdown.
				6 => {
					select_recv!(c.shutdown);
					debug2!("Bridge - shutting down");
					self.shutdown();
					return;
				},
				// Same as shutdown but tells the
				// hanging `Device` when we are done.
				7 => {
					select_recv!(c.shutdown_hang);
					debug2!("Bridge - shutting down (hang)");
					self.shutdown();
					drop(c.shutdown_done.try_send(()));
					return;
				},

				_ => unreachable!(),
			}
		}
	}

	/// Apply every session event currently queued.
	fn drain_events(&mut self, events: &Receiver<SessionEvent>) {
		while let Ok(event) = events.try_recv() {
			self.handle_event(event);
		}
	}

	//---------------------------------------------------------------------------------------------------- Misc Functions
	/// The current observable state.
	pub(super) const fn snapshot(&self) -> DeviceSnapshot {
		debug_assert!(self.state.has_unit() == self.unit.is_some());
		DeviceSnapshot {
			state: self.state,
			interrupted: self.interrupted,
			unit_running: self.unit_running,
			format: self.format,
		}
	}

	#[cold]
	#[inline(never)]
	/// Tear down the unit (if any) and leave the session.
	fn shutdown(&mut self) {
		if self.unit.is_some() {
			self.teardown();
			self.state = DeviceState::Stopped;
		}
		self.session.unsubscribe(self.subscription);
		info2!("Bridge - shutdown ... OK");
	}
}
