// Domain layer: DTOs mirroring the remote API and the ports the server talks through.

pub mod model;
pub mod ports;
