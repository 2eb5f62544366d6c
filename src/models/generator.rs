use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::atomic::{Atomic, AtomicBase, PHASE_ACTIVE};
use crate::core::error::{SimulationError, StructuralError};
use crate::core::port::Port;

/// A basic sensor model: yields one pseudo-random measurement on a fixed
/// time basis.
///
/// First emission happens `start` time units into the run, then one every
/// `period`. The random source is seeded explicitly so runs replay exactly.
pub struct PeriodicGenerator {
    base: AtomicBase,
    o_out: Port<f64>,
    start: f64,
    period: f64,
    rng: StdRng,
}

impl PeriodicGenerator {
    /// Output port carrying the emitted measurements.
    pub const PORT_OUT: &'static str = "o_out";

    pub fn new(name: &str, start: f64, period: f64, seed: u64) -> Result<Self, StructuralError> {
        if period <= 0.0 {
            return Err(StructuralError::InvalidParameter(format!(
                "generator period must be greater than 0, got {period}"
            )));
        }
        if start < 0.0 {
            return Err(StructuralError::InvalidParameter(format!(
                "generator start must not be negative, got {start}"
            )));
        }

        let mut base = AtomicBase::new(name);
        let o_out = Port::new(Self::PORT_OUT);
        base.component_mut().add_out_port(&o_out)?;
        Ok(Self {
            base,
            o_out,
            start,
            period,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Atomic for PeriodicGenerator {
    fn base(&self) -> &AtomicBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AtomicBase {
        &mut self.base
    }

    fn initialize(&mut self) {
        let start = self.start;
        self.base_mut().hold_in(PHASE_ACTIVE, start);
    }

    fn exit(&mut self) {}

    fn lambda(&mut self) -> Result<(), SimulationError> {
        let value = self.rng.gen::<f64>();
        self.o_out.add_value(value);
        Ok(())
    }

    fn deltint(&mut self) -> Result<(), SimulationError> {
        let period = self.period;
        self.base_mut().hold_in(PHASE_ACTIVE, period);
        Ok(())
    }

    fn deltext(&mut self, _e: f64) -> Result<(), SimulationError> {
        // The generator has no input ports, so this path never runs.
        Ok(())
    }
}
