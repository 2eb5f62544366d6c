use log::debug;
use rayon::prelude::*;

use crate::core::component::Component;
use crate::core::coupled::{Coupled, Coupling, CouplingKind};
use crate::core::error::SimulationError;
use crate::core::model::Model;
use crate::core::simulation::config::{ConcurrencyMode, SimulationConfig};
use crate::core::simulation::simulator::{AbstractSimulator, Simulator};

/// Drives a coupled model through the DEVS protocol.
///
/// Construction decomposes the coupled model: every atomic child gets a
/// `Simulator`, every coupled child a nested `Coordinator`, all sharing the
/// configuration passed in at the top. The coupled model's own ports stay
/// with this coordinator so an enclosing level can route into and out of
/// the subtree.
///
/// Used at the top of the tree, the coordinator is also the run driver:
/// `initialize` / `simulate` / `exit`.
pub struct Coordinator {
    component: Component,
    couplings: Vec<Coupling>,
    children: Vec<Box<dyn AbstractSimulator>>,
    config: SimulationConfig,
    t_last: f64,
    t_next: f64,
}

impl Coordinator {
    /// Build the execution tree for `model`.
    pub fn new(model: Coupled, config: SimulationConfig) -> Self {
        let (component, children, couplings) = model.into_parts();
        let children = children
            .into_iter()
            .map(|child| match child {
                Model::Atomic(atomic) => {
                    Box::new(Simulator::new(atomic)) as Box<dyn AbstractSimulator>
                }
                Model::Coupled(coupled) => {
                    Box::new(Coordinator::new(coupled, config.clone())) as Box<dyn AbstractSimulator>
                }
            })
            .collect();
        Self {
            component,
            couplings,
            children,
            config,
            t_last: 0.0,
            t_next: f64::INFINITY,
        }
    }

    /// Run the event loop while the next event time stays below `t_end`.
    ///
    /// Passing `f64::INFINITY` runs until every model in the tree is
    /// passive. The first model fault aborts the loop; the run cannot be
    /// resumed afterwards.
    pub fn simulate(&mut self, t_end: f64) -> Result<(), SimulationError> {
        debug!(
            "simulating '{}' until t={}",
            self.component.name(),
            t_end
        );
        while self.t_next < t_end {
            let t = self.t_next;
            debug!("instant t={}", t);
            self.collect_outputs(t)?;
            self.transition(t)?;
            self.clear_ports();
        }
        debug!(
            "simulation of '{}' finished at t_last={}",
            self.component.name(),
            self.t_last
        );
        Ok(())
    }

    fn min_child_t_next(&self) -> f64 {
        self.children
            .iter()
            .map(|child| child.t_next())
            .fold(f64::INFINITY, f64::min)
    }

    fn route(&self, kind_matches: fn(CouplingKind) -> bool) -> Result<(), SimulationError> {
        // Declaration order determines accumulation order in fan-in bags.
        for coupling in self.couplings.iter().filter(|c| kind_matches(c.kind())) {
            coupling.propagate()?;
        }
        Ok(())
    }
}

impl AbstractSimulator for Coordinator {
    fn model_name(&self) -> &str {
        self.component.name()
    }

    fn t_last(&self) -> f64 {
        self.t_last
    }

    fn t_next(&self) -> f64 {
        self.t_next
    }

    fn initialize(&mut self, t: f64) {
        for child in &mut self.children {
            child.initialize(t);
        }
        self.component.clear_ports();
        self.t_last = t;
        self.t_next = self.min_child_t_next();
    }

    fn collect_outputs(&mut self, t: f64) -> Result<(), SimulationError> {
        if t != self.t_next {
            return Ok(());
        }

        // Phase barrier: every imminent lambda completes before any value
        // is routed.
        match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => {
                for child in &mut self.children {
                    if child.t_next() == t {
                        child.collect_outputs(t)?;
                    }
                }
            }
            ConcurrencyMode::Rayon => {
                self.children
                    .par_iter_mut()
                    .filter(|child| child.t_next() == t)
                    .try_for_each(|child| child.collect_outputs(t))?;
            }
        }

        // Child outputs go to siblings and to this level's own output
        // ports; an enclosing coordinator routes the latter onward.
        self.route(|kind| {
            matches!(kind, CouplingKind::Internal | CouplingKind::ExternalOutput)
        })
    }

    fn transition(&mut self, t: f64) -> Result<(), SimulationError> {
        let imminent = t == self.t_next;
        let has_input = !self.component.inputs_empty();
        if !imminent && !has_input {
            return Ok(());
        }
        if t < self.t_last || t > self.t_next {
            return Err(SimulationError::ProtocolViolation(format!(
                "transition of '{}' at t={} outside its window [{}, {}]",
                self.component.name(),
                t,
                self.t_last,
                self.t_next
            )));
        }

        // Values that arrived on this level's own input ports reach the
        // children before any of them transitions.
        self.route(|kind| matches!(kind, CouplingKind::ExternalInput))?;

        match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => {
                for child in &mut self.children {
                    child.transition(t)?;
                }
            }
            ConcurrencyMode::Rayon => {
                self.children
                    .par_iter_mut()
                    .try_for_each(|child| child.transition(t))?;
            }
        }

        self.t_last = t;
        self.t_next = self.min_child_t_next();
        Ok(())
    }

    fn clear_ports(&mut self) {
        for child in &mut self.children {
            child.clear_ports();
        }
        self.component.clear_ports();
    }

    fn exit(&mut self) {
        for child in &mut self.children {
            child.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomic::{Atomic, AtomicBase, PHASE_ACTIVE};
    use crate::core::port::Port;

    struct OneShot {
        base: AtomicBase,
        o_out: Port<f64>,
        delay: f64,
        value: f64,
    }

    impl OneShot {
        fn new(name: &str, delay: f64, value: f64) -> Self {
            let mut base = AtomicBase::new(name);
            let o_out = Port::new("o_out");
            base.component_mut().add_out_port(&o_out).unwrap();
            Self {
                base,
                o_out,
                delay,
                value,
            }
        }
    }

    impl Atomic for OneShot {
        fn base(&self) -> &AtomicBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut AtomicBase {
            &mut self.base
        }
        fn initialize(&mut self) {
            let delay = self.delay;
            self.base_mut().hold_in(PHASE_ACTIVE, delay);
        }
        fn exit(&mut self) {}
        fn lambda(&mut self) -> Result<(), SimulationError> {
            self.o_out.add_value(self.value);
            Ok(())
        }
        fn deltint(&mut self) -> Result<(), SimulationError> {
            self.base_mut().passivate();
            Ok(())
        }
        fn deltext(&mut self, _e: f64) -> Result<(), SimulationError> {
            Ok(())
        }
    }

    #[test]
    fn test_initialize_takes_minimum_child_time() {
        let mut coupled = Coupled::new("Pair");
        coupled
            .add_component(Model::atomic(OneShot::new("Fast", 2.0, 1.0)))
            .unwrap();
        coupled
            .add_component(Model::atomic(OneShot::new("Slow", 9.0, 2.0)))
            .unwrap();

        let mut coordinator = Coordinator::new(coupled, SimulationConfig::default());
        coordinator.initialize(0.0);
        assert_eq!(coordinator.t_next(), 2.0);
    }

    #[test]
    fn test_all_passive_means_infinite_t_next() {
        let mut coupled = Coupled::new("Pair");
        coupled
            .add_component(Model::atomic(OneShot::new("Only", 3.0, 1.0)))
            .unwrap();

        let mut coordinator = Coordinator::new(coupled, SimulationConfig::default());
        coordinator.initialize(0.0);
        coordinator.simulate(f64::INFINITY).unwrap();
        assert_eq!(coordinator.t_next(), f64::INFINITY);
        assert_eq!(coordinator.t_last(), 3.0);
    }
}
