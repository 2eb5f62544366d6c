use std::sync::Arc;

use crate::core::error::{PortDirection, StructuralError};
use crate::core::port::{ErasedPort, Port, Value};

/// Shared identity and port registry for every node in the model tree.
///
/// Atomic and coupled models both embed a `Component`; the coordinator only
/// ever touches ports through the erased handles registered here. Port names
/// are unique per direction within one component.
pub struct Component {
    name: String,
    input_ports: Vec<Arc<dyn ErasedPort>>,
    output_ports: Vec<Arc<dyn ErasedPort>>,
}

impl Component {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an input port of this component.
    pub fn add_in_port<T: Value>(&mut self, port: &Port<T>) -> Result<(), StructuralError> {
        Self::register(
            &self.name,
            &mut self.input_ports,
            port.erased(),
            PortDirection::Input,
        )
    }

    /// Register an output port of this component.
    pub fn add_out_port<T: Value>(&mut self, port: &Port<T>) -> Result<(), StructuralError> {
        Self::register(
            &self.name,
            &mut self.output_ports,
            port.erased(),
            PortDirection::Output,
        )
    }

    fn register(
        component: &str,
        ports: &mut Vec<Arc<dyn ErasedPort>>,
        port: Arc<dyn ErasedPort>,
        direction: PortDirection,
    ) -> Result<(), StructuralError> {
        if ports.iter().any(|p| p.name() == port.name()) {
            return Err(StructuralError::DuplicatePort {
                component: component.to_string(),
                direction,
                port: port.name().to_string(),
            });
        }
        ports.push(port);
        Ok(())
    }

    pub(crate) fn input_port(&self, name: &str) -> Option<Arc<dyn ErasedPort>> {
        self.input_ports.iter().find(|p| p.name() == name).cloned()
    }

    pub(crate) fn output_port(&self, name: &str) -> Option<Arc<dyn ErasedPort>> {
        self.output_ports.iter().find(|p| p.name() == name).cloned()
    }

    /// True when no input port holds a value this instant.
    pub fn inputs_empty(&self) -> bool {
        self.input_ports.iter().all(|p| p.is_empty())
    }

    /// Empty every port of this component.
    pub fn clear_ports(&self) {
        for port in self.input_ports.iter().chain(self.output_ports.iter()) {
            port.clear();
        }
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field(
                "input_ports",
                &self.input_ports.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "output_ports",
                &self.output_ports.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_registration_and_lookup() {
        let mut component = Component::new("Sensor");
        let o_out: Port<f64> = Port::new("o_out");
        component.add_out_port(&o_out).unwrap();

        assert!(component.output_port("o_out").is_some());
        assert!(component.output_port("missing").is_none());
        assert!(component.input_port("o_out").is_none());
    }

    #[test]
    fn test_duplicate_port_name_rejected() {
        let mut component = Component::new("Sensor");
        let first: Port<f64> = Port::new("o_out");
        let second: Port<i64> = Port::new("o_out");
        component.add_out_port(&first).unwrap();

        let result = component.add_out_port(&second);
        assert_eq!(
            result,
            Err(StructuralError::DuplicatePort {
                component: "Sensor".to_string(),
                direction: PortDirection::Output,
                port: "o_out".to_string(),
            })
        );
    }

    #[test]
    fn test_same_name_allowed_across_directions() {
        let mut component = Component::new("Relay");
        let input: Port<f64> = Port::new("data");
        let output: Port<f64> = Port::new("data");
        component.add_in_port(&input).unwrap();
        component.add_out_port(&output).unwrap();
    }

    #[test]
    fn test_inputs_empty_and_clear() {
        let mut component = Component::new("Scope");
        let i_in: Port<f64> = Port::new("i_in");
        component.add_in_port(&i_in).unwrap();
        assert!(component.inputs_empty());

        i_in.add_value(4.2);
        assert!(!component.inputs_empty());

        component.clear_ports();
        assert!(component.inputs_empty());
        assert!(i_in.is_empty());
    }
}
