use thiserror::Error;

/// Errors detected while building the model tree, before `initialize` runs.
///
/// Every structural fault aborts construction; the engine never starts a run
/// on a malformed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("coupled model '{coupled}' has no child component named '{component}'")]
    UnknownComponent { coupled: String, component: String },

    #[error("component '{component}' has no {direction} port named '{port}'")]
    UnknownPort {
        component: String,
        direction: PortDirection,
        port: String,
    },

    #[error("coupled model '{coupled}' already contains a component named '{component}'")]
    DuplicateComponent { coupled: String, component: String },

    #[error("component '{component}' already has {direction} port '{port}'")]
    DuplicatePort {
        component: String,
        direction: PortDirection,
        port: String,
    },

    #[error(
        "coupling {src} -> {dst} connects incompatible value types \
         ({src_type} vs {dst_type})"
    )]
    CouplingTypeMismatch {
        src: String,
        dst: String,
        src_type: &'static str,
        dst_type: &'static str,
    },

    #[error("invalid coupling {src} -> {dst}: {reason}")]
    InvalidCoupling {
        src: String,
        dst: String,
        reason: String,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Fatal run-time faults. None of these are retried or swallowed: the engine
/// favors a visible abort over masking a correctness bug in a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A model read a port that holds no value this instant.
    #[error("port '{0}' holds no value in the current instant")]
    EmptyPort(String),

    /// A protocol point was invoked outside its precondition. Indicates a
    /// coordinator bug, not a model bug.
    #[error("simulation protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Which side of a component a port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_display() {
        let err = StructuralError::UnknownPort {
            component: "Sensor".to_string(),
            direction: PortDirection::Output,
            port: "o_out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "component 'Sensor' has no output port named 'o_out'"
        );
    }

    #[test]
    fn test_coupling_errors_carry_endpoint_labels_as_data() {
        // The endpoint labels are message data, not an underlying cause.
        let mismatch = StructuralError::CouplingTypeMismatch {
            src: "Sensor.o_out".to_string(),
            dst: "Counter.i_in".to_string(),
            src_type: "f64",
            dst_type: "i64",
        };
        assert_eq!(
            mismatch.to_string(),
            "coupling Sensor.o_out -> Counter.i_in connects incompatible value types (f64 vs i64)"
        );
        assert!(std::error::Error::source(&mismatch).is_none());

        let invalid = StructuralError::InvalidCoupling {
            src: "Example.i_in".to_string(),
            dst: "Example.o_out".to_string(),
            reason: "cannot couple a model's own ports to each other".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "invalid coupling Example.i_in -> Example.o_out: \
             cannot couple a model's own ports to each other"
        );
        assert!(std::error::Error::source(&invalid).is_none());
    }

    #[test]
    fn test_structural_error_converts_to_simulation_error() {
        let err = StructuralError::InvalidParameter("period must be greater than 0".to_string());
        let sim_err: SimulationError = err.clone().into();
        assert_eq!(sim_err, SimulationError::Structural(err));
    }
}
