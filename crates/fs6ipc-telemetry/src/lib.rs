//! Simulator telemetry encoded into the legacy FS6IPC memory layout.
//!
//! Once per served request the [`TelemetryEncoder`] samples named values from a
//! [`SimDataSource`] and writes them into an [`AddressSpace`] through a fixed,
//! table-driven catalogue of offsets:
//! - [`encoding`] holds the bit-exact legacy conversions (binary angles,
//!   fixed-point lat/lon, BCD radio frequencies, ...)
//! - [`sample`] gathers one consistent [`FlightSample`] including the
//!   landing-rate hysteresis
//! - [`catalogue`] maps a sample onto `(offset, slot, encoder)` entries
//!
//! [`AddressSpace`]: fs6ipc_memory::AddressSpace

pub mod catalogue;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod sample;
pub mod source;

pub use catalogue::{default_catalogue, Field, Slot, Value};
pub use encoder::TelemetryEncoder;
pub use error::{Result, TelemetryError};
pub use identity::HandshakeIdentity;
pub use sample::{EngineSample, FlightSample, LandingRateLatch};
pub use source::{ScalarKind, SimDataSource, StaticSource, StaticValue};
