//! Host-boundary capabilities for the Ludex windowing engine.
//!
//! The windowing engine in `ludex-windowing` never talks to a real rendering
//! surface, timer, or network. This crate defines the small capability traits
//! the host implements ([`Geometry`], [`FrameClock`]) along with the fakes
//! used by unit tests, and the [`FilterSignature`] value used to detect stale
//! asynchronous results.

mod frame;
mod geometry;
mod signature;

pub use frame::*;
pub use geometry::*;
pub use signature::*;
