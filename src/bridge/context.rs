//! The render context.
//!
//! The only state shared between the bridge and the real-time
//! render callback. It lives in a single-slot arena owned by
//! the bridge; the callback only ever holds a [`ContextHandle`].
//!
//! Lifetime:
//! 1. [`ContextArena::install`] (start)
//! 2. the callback [`ContextHandle::enter`]'s on every render
//! 3. [`ContextArena::retire`] (stop) - after this returns, no
//!    callback is inside the context and none will enter again
//! 4. [`ContextArena::release`] - the context is dropped

//---------------------------------------------------------------------------------------------------- Use
use std::sync::{
	Arc,
	atomic::{AtomicBool,AtomicUsize,Ordering},
};
use crossbeam::utils::Backoff;
use crate::{
	host::HostContext,
	macros::{debug2,error2},
};

//---------------------------------------------------------------------------------------------------- RenderContext
/// What the render callback needs.
pub(crate) struct RenderContext {
	/// The host's context, where samples come from.
	pub(crate) host: Arc<dyn HostContext>,
	/// The frame count fixed at start.
	pub(crate) expected_frames: u32,

	retired: AtomicBool,
	in_flight: AtomicUsize,
}

impl std::fmt::Debug for RenderContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RenderContext")
			.field("expected_frames", &self.expected_frames)
			.field("retired", &self.retired.load(Ordering::Relaxed))
			.field("in_flight", &self.in_flight.load(Ordering::Relaxed))
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- ContextHandle
/// The callback's (non-owning, in spirit) reference to the context.
pub(crate) struct ContextHandle {
	generation: u64,
	context: Arc<RenderContext>,
}

impl ContextHandle {
	#[inline]
	/// Enter the context for the duration of one render.
	///
	/// Returns `None` once the context is retired.
	pub(crate) fn enter(&self) -> Option<ContextGuard<'_>> {
		let context = &*self.context;

		// INVARIANT:
		// Both this and `retire()` must be `SeqCst`, either
		// we see `retired` or `retire()` sees our increment.
		context.in_flight.fetch_add(1, Ordering::SeqCst);
		if context.retired.load(Ordering::SeqCst) {
			context.in_flight.fetch_sub(1, Ordering::SeqCst);
			return None;
		}

		Some(ContextGuard { context })
	}

	#[inline]
	/// The arena generation this handle was created in.
	pub(crate) const fn generation(&self) -> u64 {
		self.generation
	}
}

/// Proof that the context is not retired, see [`ContextHandle::enter`].
pub(crate) struct ContextGuard<'a> {
	context: &'a RenderContext,
}

impl std::ops::Deref for ContextGuard<'_> {
	type Target = RenderContext;

	#[inline]
	fn deref(&self) -> &Self::Target {
		self.context
	}
}

impl Drop for ContextGuard<'_> {
	#[inline]
	fn drop(&mut self) {
		self.context.in_flight.fetch_sub(1, Ordering::SeqCst);
	}
}

//---------------------------------------------------------------------------------------------------- ContextArena
/// Single-slot owner of the [`RenderContext`].
#[derive(Debug,Default)]
pub(crate) struct ContextArena {
	slot: Option<Arc<RenderContext>>,
	generation: u64,
}

impl ContextArena {
	pub(crate) const fn new() -> Self {
		Self {
			slot: None,
			generation: 0,
		}
	}

	/// Does a context exist?
	pub(crate) const fn is_occupied(&self) -> bool {
		self.slot.is_some()
	}

	/// The host of the current context.
	pub(crate) fn host(&self) -> Option<&Arc<dyn HostContext>> {
		self.slot.as_ref().map(|c| &c.host)
	}

	/// Create the context and return the callback's handle to it.
	///
	/// INVARIANT: the slot must be empty, the bridge
	/// checks this before building a unit.
	pub(crate) fn install(&mut self, host: Arc<dyn HostContext>, expected_frames: u32) -> ContextHandle {
		debug_assert!(self.slot.is_none(), "render context installed twice");

		self.generation += 1;
		let context = Arc::new(RenderContext {
			host,
			expected_frames,
			retired: AtomicBool::new(false),
			in_flight: AtomicUsize::new(0),
		});
		self.slot = Some(Arc::clone(&context));

		debug2!("Bridge - render context installed, generation: {}, expected_frames: {expected_frames}", self.generation);
		ContextHandle {
			generation: self.generation,
			context,
		}
	}

	/// Stop any future render from entering the context,
	/// and wait for the ones already inside to leave.
	pub(crate) fn retire(&self) {
		let Some(context) = self.slot.as_ref() else {
			return;
		};

		context.retired.store(true, Ordering::SeqCst);

		let backoff = Backoff::new();
		while context.in_flight.load(Ordering::SeqCst) != 0 {
			backoff.snooze();
		}
	}

	/// Drop the context.
	///
	/// Must be called after [`Self::retire`] and after the
	/// unit (and thus the callback's handle) was dropped.
	pub(crate) fn release(&mut self) {
		let Some(context) = self.slot.take() else {
			return;
		};

		self.retire_context(&context);

		// The unit dropped its callback, so we
		// should be holding the last reference.
		if Arc::into_inner(context).is_none() {
			error2!("Bridge - render context still referenced after the output unit was disposed");
		}
	}

	fn retire_context(&self, context: &RenderContext) {
		if !context.retired.load(Ordering::SeqCst) {
			debug2!("Bridge - releasing a render context that was not retired, generation: {}", self.generation);
			context.retired.store(true, Ordering::SeqCst);
		}
	}
}
