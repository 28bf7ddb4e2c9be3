// Domain layer: entities, read models and the store ports the coordinator depends on.

pub mod model;
pub mod ports;
