// Domain layer: reminder models and the publishing port. No AWS types here.

pub mod model;
pub mod ports;
