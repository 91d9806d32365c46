// Domain layer: entities, request/response views and ports (interfaces).

pub mod company;
pub mod model;
pub mod ports;
pub mod views;
