// Domain layer: value objects and the source ports the router talks to.

pub mod model;
pub mod ports;
