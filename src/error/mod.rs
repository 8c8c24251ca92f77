//! General errors that can occur.

mod device;
pub use device::{DeviceError,DeviceInitError};

mod output;
pub use output::OutputError;

mod session;
pub use session::SessionError;
