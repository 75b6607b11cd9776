pub mod metrics_defs;
mod model;

pub use model::Airport;
