// Application layer: composition on top of the coordinator.

pub mod seed;
pub mod simulate;
pub mod views;
