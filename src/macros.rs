// Global macros for internal hostaudio usage.

//---------------------------------------------------------------------------------------------------- Channels
// SAFETY:
// These macros are used in situations where
// a [send] erroring is a logical error,
// i.e. the `Bridge` <-> `Device` channels are
// only ever dropped together on shutdown.

// `try_send` a channel message, unwrap.
macro_rules! try_send {
	($channel:expr, $($msg:tt)+) => {
		if cfg!(debug_assertions) {
			$channel.try_send($($msg)+).unwrap()
		} else {
			unsafe { $channel.try_send($($msg)+).unwrap_unchecked() }
		}
	}
}
pub(crate) use try_send;

// `recv` a [Select] operation channel message.
//
// These select operations get triggered spuriously,
// so we have to make sure something was actually
// sent to the channel, else, we [continue] in
// whatever loop we are in.
macro_rules! select_recv {
	($channel:expr) => {
		match $channel.try_recv() {
			Ok(msg) => msg,
			_ => continue,
		}
	}
}
pub(crate) use select_recv;

//---------------------------------------------------------------------------------------------------- Logging
// Logs with `log` but only if the log feature is enabled.

macro_rules! error2 {
	($($arg:tt)+) => {{
		#[cfg(feature = "log")]
		::log::error!($($arg)+);
	}};
}
pub(crate) use error2;

macro_rules! warn2 {
	($($arg:tt)+) => {{
		#[cfg(feature = "log")]
		::log::warn!($($arg)+);
	}};
}
pub(crate) use warn2;

macro_rules! info2 {
	($($arg:tt)+) => {{
		#[cfg(feature = "log")]
		::log::info!($($arg)+);
	}};
}
pub(crate) use info2;

macro_rules! debug2 {
	($($arg:tt)+) => {{
		#[cfg(feature = "log")]
		::log::debug!($($arg)+);
	}};
}
pub(crate) use debug2;

macro_rules! trace2 {
	($($arg:tt)+) => {{
		#[cfg(feature = "log")]
		::log::trace!($($arg)+);
	}};
}
pub(crate) use trace2;
