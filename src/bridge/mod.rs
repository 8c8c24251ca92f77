//! The render bridge, the device's internal actor.

mod bridge;
pub(crate) use bridge::{Bridge,Channels,InitArgs};

mod context;
mod lifecycle;
mod notify;
mod render;
