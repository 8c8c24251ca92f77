//! These are helper functions used for testing throughout the codebase.

//---------------------------------------------------------------------------------------------------- Use
use std::sync::{
	Arc,
	atomic::{AtomicUsize,Ordering},
};
use crate::{
	config::DeviceConfig,
	device::Device,
	host::HostContext,
	session::DummySession,
	unit::{DummyUnit,DummyUnitHandle},
};

//---------------------------------------------------------------------------------------------------- TestHost
/// A host context that fills every buffer
/// with one byte and counts what happens.
#[derive(Debug)]
pub(crate) struct TestHost {
	pattern: u8,
	reads: AtomicUsize,
	last_len: AtomicUsize,
	format_changes: AtomicUsize,
}

impl TestHost {
	pub(crate) fn new(pattern: u8) -> Arc<Self> {
		Arc::new(Self {
			pattern,
			reads: AtomicUsize::new(0),
			last_len: AtomicUsize::new(0),
			format_changes: AtomicUsize::new(0),
		})
	}

	pub(crate) fn reads(&self) -> usize {
		self.reads.load(Ordering::Acquire)
	}

	pub(crate) fn last_len(&self) -> usize {
		self.last_len.load(Ordering::Acquire)
	}

	pub(crate) fn format_changes(&self) -> usize {
		self.format_changes.load(Ordering::Acquire)
	}
}

impl HostContext for TestHost {
	fn read_render_data(&self, data: &mut [u8]) {
		data.fill(self.pattern);
		self.last_len.store(data.len(), Ordering::Release);
		self.reads.fetch_add(1, Ordering::AcqRel);
	}

	fn format_changed(&self) {
		self.format_changes.fetch_add(1, Ordering::AcqRel);
	}
}

//---------------------------------------------------------------------------------------------------- Test Init Helpers
/// Init the `Device` with default values and the dummy backends.
pub(crate) fn init() -> (
	Device<DummySession, DummyUnit>,
	Arc<DummySession>,
	DummyUnitHandle,
) {
	init_with(DummySession::new(), DummyUnitHandle::new())
}

/// Init the `Device` with default values around `session` and `unit`.
pub(crate) fn init_with(session: DummySession, unit: DummyUnitHandle) -> (
	Device<DummySession, DummyUnit>,
	Arc<DummySession>,
	DummyUnitHandle,
) {
	let session = Arc::new(session);
	let device = Device::init(DeviceConfig::DEFAULT, Arc::clone(&session), unit.clone()).unwrap();
	(device, session, unit)
}
