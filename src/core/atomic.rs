use crate::core::component::Component;
use crate::core::error::SimulationError;

/// Phase tag for a model scheduled to do work.
pub const PHASE_ACTIVE: &str = "active";
/// Phase tag for a model waiting indefinitely for input.
pub const PHASE_PASSIVE: &str = "passive";

/// Bookkeeping shared by every atomic model: its component identity plus the
/// DEVS timing state (`phase`, `sigma`).
///
/// Models embed an `AtomicBase` and drive it with the scheduling helpers
/// (`hold_in`, `passivate`, ...) from their transition functions. `sigma` is
/// the time remaining until the next internal event; `f64::INFINITY` means
/// passive.
#[derive(Debug)]
pub struct AtomicBase {
    component: Component,
    phase: String,
    sigma: f64,
}

impl AtomicBase {
    /// Create a base in the passive phase with infinite sigma.
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name),
            phase: PHASE_PASSIVE.to_string(),
            sigma: f64::INFINITY,
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Time remaining until the next internal event.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Enter `phase` and schedule the next internal event after `sigma`.
    pub fn hold_in(&mut self, phase: &str, sigma: f64) {
        debug_assert!(sigma >= 0.0, "sigma must be non-negative");
        self.phase = phase.to_string();
        self.sigma = sigma;
    }

    /// Schedule an immediate internal event in the active phase.
    pub fn activate(&mut self) {
        self.hold_in(PHASE_ACTIVE, 0.0);
    }

    /// Wait indefinitely for external input.
    pub fn passivate(&mut self) {
        self.hold_in(PHASE_PASSIVE, f64::INFINITY);
    }

    /// Keep the current schedule after an external event: `e` time units
    /// have passed, so that much less remains until the internal event.
    pub fn continuef(&mut self, e: f64) {
        self.sigma -= e;
    }
}

/// Behavior contract for a leaf DEVS model.
///
/// The owning `Simulator` invokes each callback at exactly one protocol
/// point per instant: `lambda` when global time reaches the model's next
/// event time, immediately followed by `deltint`; `deltext` when input
/// arrived before that; `deltcon` when both coincide. Output generation and
/// state transition are separate points: `lambda` should only write output
/// ports, never reschedule.
///
/// A returned error is fatal to the run; the coordinator never retries a
/// transition.
pub trait Atomic: Send {
    fn base(&self) -> &AtomicBase;

    fn base_mut(&mut self) -> &mut AtomicBase;

    /// Set the initial phase and sigma. Called once before the run starts.
    fn initialize(&mut self);

    /// Release any resources. Called once at shutdown.
    fn exit(&mut self);

    /// Output function: queue values on output ports.
    fn lambda(&mut self) -> Result<(), SimulationError>;

    /// Internal transition at the scheduled event time.
    fn deltint(&mut self) -> Result<(), SimulationError>;

    /// External transition; `e` is the time elapsed since the last
    /// transition. At least one input port is non-empty when this runs.
    fn deltext(&mut self, e: f64) -> Result<(), SimulationError>;

    /// Confluent transition when an internal event and external input
    /// coincide. Default tie-breaking runs `deltint` first, then `deltext`
    /// with zero elapsed time; models may override.
    fn deltcon(&mut self, _e: f64) -> Result<(), SimulationError> {
        self.deltint()?;
        self.deltext(0.0)
    }

    /// Time advance: how long until this model's next internal event.
    fn ta(&self) -> f64 {
        self.base().sigma()
    }

    fn component(&self) -> &Component {
        self.base().component()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_base_is_passive() {
        let base = AtomicBase::new("Sensor");
        assert_eq!(base.phase(), PHASE_PASSIVE);
        assert_eq!(base.sigma(), f64::INFINITY);
    }

    #[test]
    fn test_hold_in_sets_phase_and_sigma() {
        let mut base = AtomicBase::new("Sensor");
        base.hold_in(PHASE_ACTIVE, 5.0);
        assert_eq!(base.phase(), PHASE_ACTIVE);
        assert_eq!(base.sigma(), 5.0);
    }

    #[test]
    fn test_activate_and_passivate() {
        let mut base = AtomicBase::new("Sensor");
        base.activate();
        assert_eq!(base.phase(), PHASE_ACTIVE);
        assert_eq!(base.sigma(), 0.0);

        base.passivate();
        assert_eq!(base.phase(), PHASE_PASSIVE);
        assert_eq!(base.sigma(), f64::INFINITY);
    }

    #[test]
    fn test_continuef_shrinks_sigma() {
        let mut base = AtomicBase::new("Sensor");
        base.hold_in(PHASE_ACTIVE, 10.0);
        base.continuef(4.0);
        assert_eq!(base.sigma(), 6.0);
    }

    #[test]
    fn test_continuef_keeps_passive_infinite() {
        let mut base = AtomicBase::new("Scope");
        base.passivate();
        base.continuef(3.0);
        assert_eq!(base.sigma(), f64::INFINITY);
    }
}
