//! spvscan: derive Vulkan descriptor-set layouts and push-constant ranges
//! from SPIR-V shader modules.
//!
//! ```text
//! bytes → instruction index → (id table + side tables) → member fixups
//!   → type sizes → per-function variable references → PipelineInfo
//! ```
//!
//! The decoder consumes the module in the eleven logical sections mandated
//! by the SPIR-V layout rules and only validates the structural shape a
//! reflection pass depends on; it is not a full validator.

pub mod spv;

pub use spv::Error;
