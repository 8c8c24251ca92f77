//! The real-time render path.
//!
//! Everything in here runs on the output unit's real-time
//! thread: no locks, no allocation, no blocking, no logging
//! above `trace`.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	bridge::context::ContextHandle,
	unit::{AudioBuffer,RenderArgs,RenderCallback},
	macros::trace2,
};

//---------------------------------------------------------------------------------------------------- Render
/// Wrap `handle` into the callback handed to the output unit.
pub(crate) fn callback(handle: ContextHandle) -> RenderCallback {
	Box::new(move |args| render(&handle, args))
}

#[inline]
/// Fill the hardware buffer from the host context.
///
/// # Panics
/// The output unit must hand over exactly 1 interleaved
/// buffer of 1 or 2 channels, anything else is a bug.
pub(crate) fn render(handle: &ContextHandle, args: &mut RenderArgs<'_, '_>) {
	assert_eq!(args.buffers.len(), 1, "output unit must render into exactly 1 interleaved buffer");
	let buffer = &mut args.buffers[0];
	assert!((1..=2).contains(&buffer.channels), "output unit buffer must have 1 or 2 channels, found: {}", buffer.channels);

	let Some(context) = handle.enter() else {
		trace2!("Bridge - render after retirement, generation: {}", handle.generation());
		silence(buffer, &mut args.flags.output_is_silence);
		return;
	};

	if args.frames != context.expected_frames {
		trace2!("Bridge - {} frames requested, expected: {}, rendering silence", args.frames, context.expected_frames);
		silence(buffer, &mut args.flags.output_is_silence);
		return;
	}

	// Straight into the hardware buffer.
	context.host.read_render_data(buffer.data);
	args.flags.output_is_silence = false;
}

#[inline]
fn silence(buffer: &mut AudioBuffer<'_>, output_is_silence: &mut bool) {
	buffer.data.fill(0);
	*output_is_silence = true;
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		bridge::context::ContextArena,
		tests::TestHost,
		unit::RenderFlags,
	};
	use pretty_assertions::assert_eq;

	fn run(
		handle: &ContextHandle,
		frames: u32,
		channels: u32,
		data: &mut [u8],
	) -> bool {
		let mut flags = RenderFlags::default();
		let mut buffers = [AudioBuffer { channels, data }];
		render(handle, &mut RenderArgs {
			flags: &mut flags,
			frames,
			buffers: &mut buffers,
		});
		flags.output_is_silence
	}

	/// Frame counts around the common buffer sizes and the edges.
	const FRAMES: [u32; 8] = [1, 2, 441, 479, 480, 481, 1024, 4096];

	#[test]
	fn matching_frames_read_from_host() {
		for channels in [1, 2] {
			for frames in FRAMES {
				let host = TestHost::new(7);
				let mut arena = ContextArena::new();
				let handle = arena.install(host.clone(), frames);

				let len = frames as usize * channels as usize * 2;
				let mut data = vec![0xAA; len];
				let silent = run(&handle, frames, channels, &mut data);

				assert!(!silent, "frames: {frames}, channels: {channels}");
				assert_eq!(host.reads(), 1, "frames: {frames}, channels: {channels}");
				assert_eq!(host.last_len(), len, "frames: {frames}, channels: {channels}");
				assert!(data.iter().all(|b| *b == 7), "frames: {frames}, channels: {channels}");
			}
		}
	}

	#[test]
	fn mismatched_frames_render_silence() {
		for expected in FRAMES {
			for requested in FRAMES {
				if requested == expected {
					continue;
				}

				let host = TestHost::new(7);
				let mut arena = ContextArena::new();
				let handle = arena.install(host.clone(), expected);

				let mut data = vec![0xAA; requested as usize * 4];
				let silent = run(&handle, requested, 2, &mut data);

				assert!(silent, "expected: {expected}, requested: {requested}");
				assert_eq!(host.reads(), 0, "expected: {expected}, requested: {requested}");
				assert_eq!(host.last_len(), 0, "expected: {expected}, requested: {requested}");
				assert!(data.iter().all(|b| *b == 0), "expected: {expected}, requested: {requested}");
			}
		}
	}

	#[test]
	fn mismatch_then_match_on_one_context() {
		let host = TestHost::new(7);
		let mut arena = ContextArena::new();
		let handle = arena.install(host.clone(), 441);

		let mut data = vec![0xAA; 480 * 2];
		assert!(run(&handle, 480, 1, &mut data));
		assert_eq!(host.reads(), 0);

		let mut data = vec![0xAA; 441 * 2];
		assert!(!run(&handle, 441, 1, &mut data));
		assert_eq!(host.reads(), 1);
		assert_eq!(host.last_len(), 441 * 2);
	}

	#[test]
	fn retired_context_renders_silence() {
		let host = TestHost::new(7);
		let mut arena = ContextArena::new();
		let handle = arena.install(host.clone(), 441);
		arena.retire();

		let mut data = vec![0xAA; 441 * 2];
		let silent = run(&handle, 441, 1, &mut data);

		assert!(silent);
		assert_eq!(host.reads(), 0);
		assert!(data.iter().all(|b| *b == 0));
	}

	#[test]
	fn boxed_callback() {
		let host = TestHost::new(3);
		let mut arena = ContextArena::new();
		let mut callback = callback(arena.install(host.clone(), 2));

		let mut data = [0_u8; 8];
		let mut flags = RenderFlags { output_is_silence: true };
		let mut buffers = [AudioBuffer { channels: 2, data: &mut data }];
		callback(&mut RenderArgs {
			flags: &mut flags,
			frames: 2,
			buffers: &mut buffers,
		});

		assert!(!flags.output_is_silence);
		assert_eq!(data, [3; 8]);
	}

	#[test]
	#[should_panic(expected = "exactly 1 interleaved buffer")]
	fn two_buffers_panic() {
		let mut arena = ContextArena::new();
		let handle = arena.install(TestHost::new(0), 4);

		let mut left = [0_u8; 8];
		let mut right = [0_u8; 8];
		let mut flags = RenderFlags::default();
		let mut buffers = [
			AudioBuffer { channels: 1, data: &mut left },
			AudioBuffer { channels: 1, data: &mut right },
		];
		render(&handle, &mut RenderArgs {
			flags: &mut flags,
			frames: 4,
			buffers: &mut buffers,
		});
	}

	#[test]
	#[should_panic(expected = "1 or 2 channels")]
	fn three_channels_panic() {
		let mut arena = ContextArena::new();
		let handle = arena.install(TestHost::new(0), 4);
		let mut data = [0_u8; 24];
		run(&handle, 4, 3, &mut data);
	}
}
