use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::core::atomic::{Atomic, AtomicBase};
use crate::core::error::{SimulationError, StructuralError};
use crate::core::port::Port;

/// One observed value with the virtual time it arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

/// Shared destination for recorded samples.
///
/// The recorder is moved into the coordinator for the run's duration, so
/// callers keep a clone of the sink to read the results afterwards.
#[derive(Debug, Clone, Default)]
pub struct SampleSink {
    samples: Arc<Mutex<Vec<Sample>>>,
}

impl SampleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, sample: Sample) {
        self.samples
            .lock()
            .expect("sample sink lock poisoned")
            .push(sample);
    }

    /// Copy of all samples recorded so far, in arrival order.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples
            .lock()
            .expect("sample sink lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .expect("sample sink lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A scope-like observer: passive until a value arrives, then records every
/// queued value against its own clock.
pub struct SampleRecorder {
    base: AtomicBase,
    i_in: Port<f64>,
    clock: f64,
    sink: SampleSink,
}

impl SampleRecorder {
    /// Input port receiving the observed values.
    pub const PORT_IN: &'static str = "i_in";

    pub fn new(name: &str, sink: SampleSink) -> Result<Self, StructuralError> {
        let mut base = AtomicBase::new(name);
        let i_in = Port::new(Self::PORT_IN);
        base.component_mut().add_in_port(&i_in)?;
        Ok(Self {
            base,
            i_in,
            clock: 0.0,
            sink,
        })
    }
}

impl Atomic for SampleRecorder {
    fn base(&self) -> &AtomicBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AtomicBase {
        &mut self.base
    }

    fn initialize(&mut self) {
        self.base_mut().passivate();
    }

    fn exit(&mut self) {}

    fn lambda(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }

    fn deltint(&mut self) -> Result<(), SimulationError> {
        self.base_mut().passivate();
        Ok(())
    }

    fn deltext(&mut self, e: f64) -> Result<(), SimulationError> {
        self.base_mut().continuef(e);
        self.clock += e;
        for value in self.i_in.values() {
            self.sink.push(Sample {
                time: self.clock,
                value,
            });
        }
        Ok(())
    }
}
