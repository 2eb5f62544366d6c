pub mod atomic;
pub mod component;
pub mod coupled;
pub mod error;
pub mod model;
pub mod port;
pub mod simulation;
