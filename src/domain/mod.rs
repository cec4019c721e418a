// Domain layer: content model and the CMS boundary port.

pub mod model;
pub mod ports;
