//! Device state.

mod device_state;
pub use device_state::DeviceState;

mod device_snapshot;
pub use device_snapshot::DeviceSnapshot;
