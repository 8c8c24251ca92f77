//! Playback-only audio device plugin.
//!
//! `hostaudio` sits between a host SDK that owns a call's audio
//! and the platform's audio output. It:
//! - configures the process-wide [`session::AudioSession`] with a preferred format
//! - builds a hardware [`unit::OutputUnit`] on the output bus
//! - pulls the host's pre-rendered samples into the real-time render callback
//! - reacts to interruptions, route changes and media service resets
//!
//! The host holds a [`Device`], which it sees through
//! the [`AudioDevice`] capability interface.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hostaudio::{Device, AudioDevice, config::DeviceConfig};
//! use hostaudio::{session::CpalSession, unit::{CpalUnit, CpalUnitConfig}};
//!
//! let session = Arc::new(CpalSession::new());
//! let mut device = Device::<CpalSession, CpalUnit>::init(
//!     DeviceConfig::DEFAULT,
//!     session,
//!     CpalUnitConfig::default(),
//! ).unwrap();
//!
//! let renderer = device.renderer().unwrap();
//! let format = renderer.render_format().unwrap();
//! renderer.initialize_renderer().unwrap();
//! renderer.start_rendering(host_context).unwrap();
//! ```

//---------------------------------------------------------------------------------------------------- Lints
#![allow(
    clippy::len_zero,
    clippy::type_complexity,
    clippy::module_inception,
)]

#![deny(
    nonstandard_style,
    deprecated,
    missing_docs,
)]

#![forbid(
    unused_mut,
    unused_unsafe,
    future_incompatible,
    break_with_label_and_loop,
    coherence_leak_check,
    duplicate_macro_attributes,
    exported_private_dependencies,
    for_loops_over_fallibles,
    large_assignments,
    overlapping_range_endpoints,
    semicolon_in_expressions_from_macros,
    redundant_semicolons,
    unconditional_recursion,
    unreachable_patterns,
    unused_allocation,
    unused_braces,
    unused_comparisons,
    unused_doc_comments,
    unused_parens,
    unused_labels,
    while_true,
    keyword_idents,
    non_ascii_idents,
    noop_method_call,
	unreachable_pub,
    single_use_lifetimes,
	// variant_size_differences,
)]

//---------------------------------------------------------------------------------------------------- Public API
mod device;
pub use device::Device;

pub mod host;
pub use host::{AudioDevice,Capturer,HostContext,Renderer};

pub mod config;
pub mod error;
pub mod format;
pub mod session;
pub mod state;
pub mod unit;

//---------------------------------------------------------------------------------------------------- Private Usage
mod bridge;
mod macros;

#[cfg(test)]
mod tests;
