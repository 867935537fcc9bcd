//! Beltline S7 -- controller synchronization for the simulation core.
//!
//! Keeps a subset of the simulation's [`beltline_core::vars::VariableStore`]
//! bound to live tags in an industrial controller's data blocks:
//!
//! - [`transport::BlockTransport`] -- the read/write data-block contract this
//!   crate depends on; socket handling and vendor protocol framing live
//!   behind it, outside this crate.
//! - [`codec`] -- big-endian S7 data-block byte conventions (bit, byte,
//!   16-bit word, 32-bit double word, IEEE-754 real).
//! - [`mapping::TagMap`] -- ordered tag-mapping records loaded from the
//!   project configuration; malformed records are skipped and reported, the
//!   rest of the mapping loads.
//! - [`sync::PlcSync`] -- the read and write passes. Each pass batches
//!   contiguous regions per data block, tolerates transport failures without
//!   touching the simulation, and coalesces overlapping invocations.

pub mod codec;
pub mod mapping;
pub mod sync;
pub mod transport;
