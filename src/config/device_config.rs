//! Device configuration.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	format::PreferredFormat,
	session::Category,
};

#[allow(unused_imports)] // docs
use crate::Device;

//---------------------------------------------------------------------------------------------------- DeviceConfig
/// Initialization config for the [`Device`].
///
/// This is the configuration to be used with [`Device::init`].
///
/// This configuration is passed once and used
/// for the rest of the `Device`'s lifetime.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct DeviceConfig {
	/// The format requested from the audio session.
	///
	/// This is only a request, the session may grant
	/// something else, see [`Device`]'s `render_format()`.
	pub preferred: PreferredFormat,

	/// The session category to set.
	pub category: Category,

	/// Should the [`Device`] block on [`Drop::drop`]
	/// until the bridge thread is cleaned up?
	///
	/// If this is set to `false`, [`Device::drop`] will
	/// return immediately, the output unit will be stopped
	/// and the session unsubscribed in the background.
	pub shutdown_blocking: bool,
}

//---------------------------------------------------------------------------------------------------- DeviceConfig Impl
impl DeviceConfig {
	/// A reasonable default [`DeviceConfig`].
	///
	/// ```rust
	/// # use hostaudio::{config::*,format::*,session::*};
	/// assert_eq!(DeviceConfig::DEFAULT, DeviceConfig {
	///     preferred:         PreferredFormat::DEFAULT,
	///     category:          Category::Playback,
	///     shutdown_blocking: true,
	/// });
	/// ```
	pub const DEFAULT: Self = Self {
		preferred:         PreferredFormat::DEFAULT,
		category:          Category::DEFAULT,
		shutdown_blocking: true,
	};
}

impl Default for DeviceConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn default_is_const_default() {
		assert_eq!(DeviceConfig::default(), DeviceConfig::DEFAULT);
	}

}
