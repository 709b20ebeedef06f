// Domain layer: grade records, computed aggregates and the ports the services depend on.

pub mod model;
pub mod ports;
