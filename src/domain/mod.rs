// Domain layer: data model and ports (traits) shared by core and adapters.

pub mod model;
pub mod ports;
