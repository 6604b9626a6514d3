mod display;
mod geodesy;
mod home;
mod interval;
mod projector;
mod sample;
mod servo;
mod slot;
#[allow(clippy::module_inception)]
mod tracker;
mod types;
mod units;

pub use display::{format_active, ActiveView, Display, IdleView, LogDisplay};
pub use sample::TrackerStatus;
pub use servo::{LogActuator, NoopActuator, ServoBounds};
pub use slot::FixSlot;
pub use tracker::{AatTracker, TrackerMode};
pub use types::{GeoPosition, GpsFix};
pub use units::Millis;
