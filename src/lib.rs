pub mod core;
pub mod models;

// Re-export commonly used types
pub use crate::core::atomic::{Atomic, AtomicBase, PHASE_ACTIVE, PHASE_PASSIVE};
pub use crate::core::component::Component;
pub use crate::core::coupled::{Coupled, CouplingKind};
pub use crate::core::error::{SimulationError, StructuralError};
pub use crate::core::model::Model;
pub use crate::core::port::Port;
pub use crate::core::simulation::config::{ConcurrencyMode, SimulationConfig};
pub use crate::core::simulation::coordinator::Coordinator;
pub use crate::core::simulation::simulator::{AbstractSimulator, Simulator};
