//! Domain layer: purchasable items, monetary values, the refund policy tables
//! and the storage ports the engine depends on.

pub mod item;
pub mod money;
pub mod policy;
pub mod ports;
