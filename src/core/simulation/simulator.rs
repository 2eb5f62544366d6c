use crate::core::atomic::Atomic;
use crate::core::error::SimulationError;

/// Execution protocol shared by the atomic `Simulator` and the hierarchical
/// `Coordinator`.
///
/// A wrapper is created for exactly one model, mutated every instant, and
/// discarded after `exit`. Per instant `t` the owner calls, in order:
/// `collect_outputs(t)`, `transition(t)`, `clear_ports()`; `t_next` is only
/// valid again after the transition completes.
pub trait AbstractSimulator: Send {
    fn model_name(&self) -> &str;

    /// Time of this model's last event.
    fn t_last(&self) -> f64;

    /// Time of this model's next scheduled internal event.
    fn t_next(&self) -> f64;

    /// Initialize the wrapped model at time `t` and compute the first
    /// `t_next`.
    fn initialize(&mut self, t: f64);

    /// Output phase: run `lambda` if this model's event time has arrived.
    fn collect_outputs(&mut self, t: f64) -> Result<(), SimulationError>;

    /// Transition phase: run the internal, external or confluent transition
    /// if this model is influenced at `t`, then reschedule.
    fn transition(&mut self, t: f64) -> Result<(), SimulationError>;

    /// Empty every port populated this instant.
    fn clear_ports(&mut self);

    /// Tear the wrapped model down.
    fn exit(&mut self);
}

/// Drives a single atomic model through the DEVS protocol.
pub struct Simulator {
    model: Box<dyn Atomic>,
    t_last: f64,
    t_next: f64,
}

impl Simulator {
    pub fn new(model: Box<dyn Atomic>) -> Self {
        Self {
            model,
            t_last: 0.0,
            t_next: f64::INFINITY,
        }
    }
}

impl AbstractSimulator for Simulator {
    fn model_name(&self) -> &str {
        self.model.component().name()
    }

    fn t_last(&self) -> f64 {
        self.t_last
    }

    fn t_next(&self) -> f64 {
        self.t_next
    }

    fn initialize(&mut self, t: f64) {
        self.model.initialize();
        self.t_last = t;
        self.t_next = t + self.model.ta();
    }

    fn collect_outputs(&mut self, t: f64) -> Result<(), SimulationError> {
        if t == self.t_next {
            self.model.lambda()?;
        }
        Ok(())
    }

    fn transition(&mut self, t: f64) -> Result<(), SimulationError> {
        let imminent = t == self.t_next;
        let has_input = !self.model.component().inputs_empty();
        if !imminent && !has_input {
            // Not influenced this instant.
            return Ok(());
        }
        if t < self.t_last || t > self.t_next {
            return Err(SimulationError::ProtocolViolation(format!(
                "transition of '{}' at t={} outside its window [{}, {}]",
                self.model_name(),
                t,
                self.t_last,
                self.t_next
            )));
        }

        let e = t - self.t_last;
        if imminent && has_input {
            self.model.deltcon(e)?;
        } else if imminent {
            self.model.deltint()?;
        } else {
            self.model.deltext(e)?;
        }

        self.t_last = t;
        self.t_next = t + self.model.ta();
        Ok(())
    }

    fn clear_ports(&mut self) {
        self.model.component().clear_ports();
    }

    fn exit(&mut self) {
        self.model.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomic::{AtomicBase, PHASE_ACTIVE};
    use crate::core::port::Port;

    /// Emits its tick count every `period`.
    struct Ticker {
        base: AtomicBase,
        o_out: Port<i64>,
        i_in: Port<i64>,
        period: f64,
        internal_count: u32,
    }

    impl Ticker {
        fn new(period: f64) -> Self {
            let mut base = AtomicBase::new("Ticker");
            let o_out = Port::new("o_out");
            let i_in = Port::new("i_in");
            base.component_mut().add_out_port(&o_out).unwrap();
            base.component_mut().add_in_port(&i_in).unwrap();
            Self {
                base,
                o_out,
                i_in,
                period,
                internal_count: 0,
            }
        }
    }

    impl Atomic for Ticker {
        fn base(&self) -> &AtomicBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut AtomicBase {
            &mut self.base
        }
        fn initialize(&mut self) {
            let period = self.period;
            self.base_mut().hold_in(PHASE_ACTIVE, period);
        }
        fn exit(&mut self) {}
        fn lambda(&mut self) -> Result<(), SimulationError> {
            self.o_out.add_value(i64::from(self.internal_count));
            Ok(())
        }
        fn deltint(&mut self) -> Result<(), SimulationError> {
            self.internal_count += 1;
            let period = self.period;
            self.base_mut().hold_in(PHASE_ACTIVE, period);
            Ok(())
        }
        fn deltext(&mut self, e: f64) -> Result<(), SimulationError> {
            self.base_mut().continuef(e);
            Ok(())
        }
    }

    #[test]
    fn test_initialize_computes_first_t_next() {
        let mut sim = Simulator::new(Box::new(Ticker::new(2.5)));
        sim.initialize(0.0);
        assert_eq!(sim.t_last(), 0.0);
        assert_eq!(sim.t_next(), 2.5);
    }

    #[test]
    fn test_internal_transition_advances_clock() {
        let mut sim = Simulator::new(Box::new(Ticker::new(2.0)));
        sim.initialize(0.0);

        sim.collect_outputs(2.0).unwrap();
        sim.transition(2.0).unwrap();

        assert_eq!(sim.t_last(), 2.0);
        assert_eq!(sim.t_next(), 4.0);
    }

    #[test]
    fn test_lambda_only_fires_at_event_time() {
        let ticker = Ticker::new(2.0);
        let output = ticker.o_out.clone();
        let mut sim = Simulator::new(Box::new(ticker));
        sim.initialize(0.0);

        sim.collect_outputs(1.0).unwrap();
        assert!(output.is_empty());

        sim.collect_outputs(2.0).unwrap();
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_external_transition_uses_elapsed_time() {
        let ticker = Ticker::new(10.0);
        let input = ticker.i_in.clone();
        let mut sim = Simulator::new(Box::new(ticker));
        sim.initialize(0.0);

        input.add_value(7);
        sim.transition(4.0).unwrap();

        assert_eq!(sim.t_last(), 4.0);
        // continuef keeps the original schedule: 10.0 - 4.0 remaining.
        assert_eq!(sim.t_next(), 10.0);
    }

    #[test]
    fn test_confluent_when_input_meets_event_time() {
        let ticker = Ticker::new(5.0);
        let input = ticker.i_in.clone();
        let mut sim = Simulator::new(Box::new(ticker));
        sim.initialize(0.0);

        input.add_value(1);
        sim.collect_outputs(5.0).unwrap();
        sim.transition(5.0).unwrap();

        assert_eq!(sim.t_last(), 5.0);
        assert_eq!(sim.t_next(), 10.0);
    }

    #[test]
    fn test_uninfluenced_transition_is_a_no_op() {
        let mut sim = Simulator::new(Box::new(Ticker::new(5.0)));
        sim.initialize(0.0);

        sim.transition(3.0).unwrap();
        assert_eq!(sim.t_last(), 0.0);
        assert_eq!(sim.t_next(), 5.0);
    }

    #[test]
    fn test_transition_past_window_is_protocol_violation() {
        let ticker = Ticker::new(5.0);
        let input = ticker.i_in.clone();
        let mut sim = Simulator::new(Box::new(ticker));
        sim.initialize(0.0);

        input.add_value(1);
        let result = sim.transition(6.0);
        assert!(matches!(
            result,
            Err(SimulationError::ProtocolViolation(_))
        ));
    }
}
