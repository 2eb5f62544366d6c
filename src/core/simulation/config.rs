/// Configuration passed into the coordinator at construction.
///
/// All execution knobs travel through this struct; the engine keeps no
/// ambient global state.

/// Enumeration of supported concurrency modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Children of a coordinator are driven in order on a single thread.
    #[default]
    Sequential,
    /// The output-collection and transition phases fan out over a
    /// coordinator's children via Rayon. Routing stays serial, so both
    /// modes produce identical event sequences.
    Rayon,
}

/// Configuration for simulation execution.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    /// The concurrency mode to use for execution.
    pub concurrency_mode: ConcurrencyMode,
}

impl SimulationConfig {
    /// Create a configuration with default values (sequential execution).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode for the simulation.
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }
}
