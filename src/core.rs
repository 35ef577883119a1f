mod battery;
mod model;
mod optimizer;
mod plan;
mod status;
mod throughput;

pub use self::{
    battery::Battery,
    optimizer::{Optimizer, Outcome},
    plan::Plan,
};
