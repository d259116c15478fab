// Domain layer: models, inbound event shape and ports (collaborator interfaces).

pub mod event;
pub mod model;
pub mod ports;
