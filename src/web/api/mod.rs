pub mod error;
pub mod gps;
pub mod tracker;
