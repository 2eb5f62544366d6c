use std::sync::Arc;

use log::trace;

use crate::core::component::Component;
use crate::core::error::{PortDirection, SimulationError, StructuralError};
use crate::core::model::Model;
use crate::core::port::{ErasedPort, Port, Value};

/// Where a coupling sits in the hierarchy, relative to its coupled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingKind {
    /// From one of the coupled model's own input ports to a child input.
    ExternalInput,
    /// From a child output to a sibling input.
    Internal,
    /// From a child output to one of the coupled model's own output ports.
    ExternalOutput,
}

/// A declared routing edge between two port endpoints.
///
/// Endpoints are resolved and type-checked when the coupling is added, so
/// routing at run time is a plain bag copy.
pub struct Coupling {
    kind: CouplingKind,
    source_label: String,
    target_label: String,
    source: Arc<dyn ErasedPort>,
    target: Arc<dyn ErasedPort>,
}

impl Coupling {
    pub fn kind(&self) -> CouplingKind {
        self.kind
    }

    /// Copy the source bag into the target bag, if the source produced
    /// anything this instant.
    pub(crate) fn propagate(&self) -> Result<(), SimulationError> {
        if self.source.is_empty() {
            return Ok(());
        }
        trace!("routing {} -> {}", self.source_label, self.target_label);
        self.target.propagate_from(self.source.as_ref())
    }
}

impl std::fmt::Debug for Coupling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Coupling({:?} {} -> {})",
            self.kind, self.source_label, self.target_label
        )
    }
}

/// Composite DEVS model: an ordered collection of owned child models plus
/// the couplings that route values between their ports and this model's own
/// hierarchical ports.
///
/// A coupled model has no transition behavior of its own; its dynamics are
/// entirely the aggregate of its children plus coupling propagation. The
/// structure is static: once a coordinator is built from it, no children or
/// couplings can be added.
pub struct Coupled {
    component: Component,
    children: Vec<Model>,
    couplings: Vec<Coupling>,
}

impl Coupled {
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name),
            children: Vec::new(),
            couplings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.component.name()
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Access the component to declare this coupled model's own
    /// hierarchical input/output ports.
    pub fn component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    /// Add a child model. Child names are unique within this coupled model.
    pub fn add_component(&mut self, model: impl Into<Model>) -> Result<(), StructuralError> {
        let model = model.into();
        if model.name() == self.name() {
            return Err(StructuralError::DuplicateComponent {
                coupled: self.name().to_string(),
                component: model.name().to_string(),
            });
        }
        if self.children.iter().any(|c| c.name() == model.name()) {
            return Err(StructuralError::DuplicateComponent {
                coupled: self.name().to_string(),
                component: model.name().to_string(),
            });
        }
        self.children.push(model);
        Ok(())
    }

    /// Declare a coupling from `src_component.src_port` to
    /// `dst_component.dst_port`.
    ///
    /// Using this coupled model's own name addresses its hierarchical
    /// ports: own input -> child input is an external input coupling, child
    /// output -> own output an external output coupling, child output ->
    /// child input an internal one. Endpoints must exist and carry the same
    /// value type; violations abort construction.
    pub fn add_coupling(
        &mut self,
        src_component: &str,
        src_port: &str,
        dst_component: &str,
        dst_port: &str,
    ) -> Result<(), StructuralError> {
        let source_label = format!("{}.{}", src_component, src_port);
        let target_label = format!("{}.{}", dst_component, dst_port);

        let src_is_self = src_component == self.name();
        let dst_is_self = dst_component == self.name();
        if src_is_self && dst_is_self {
            return Err(StructuralError::InvalidCoupling {
                src: source_label,
                dst: target_label,
                reason: "cannot couple a model's own ports to each other".to_string(),
            });
        }

        // The source of an external input coupling is one of the coupled
        // model's own input ports; every other source is a child output.
        let source = if src_is_self {
            self.component.input_port(src_port).ok_or_else(|| {
                StructuralError::UnknownPort {
                    component: src_component.to_string(),
                    direction: PortDirection::Input,
                    port: src_port.to_string(),
                }
            })?
        } else {
            self.child(src_component)?
                .component()
                .output_port(src_port)
                .ok_or_else(|| StructuralError::UnknownPort {
                    component: src_component.to_string(),
                    direction: PortDirection::Output,
                    port: src_port.to_string(),
                })?
        };

        let target = if dst_is_self {
            self.component.output_port(dst_port).ok_or_else(|| {
                StructuralError::UnknownPort {
                    component: dst_component.to_string(),
                    direction: PortDirection::Output,
                    port: dst_port.to_string(),
                }
            })?
        } else {
            self.child(dst_component)?
                .component()
                .input_port(dst_port)
                .ok_or_else(|| StructuralError::UnknownPort {
                    component: dst_component.to_string(),
                    direction: PortDirection::Input,
                    port: dst_port.to_string(),
                })?
        };

        if source.value_type_id() != target.value_type_id() {
            return Err(StructuralError::CouplingTypeMismatch {
                src: source_label,
                dst: target_label,
                src_type: source.value_type_name(),
                dst_type: target.value_type_name(),
            });
        }

        let kind = if src_is_self {
            CouplingKind::ExternalInput
        } else if dst_is_self {
            CouplingKind::ExternalOutput
        } else {
            CouplingKind::Internal
        };

        self.couplings.push(Coupling {
            kind,
            source_label,
            target_label,
            source,
            target,
        });
        Ok(())
    }

    /// Convenience for declaring this model's own input port.
    pub fn add_in_port<T: Value>(&mut self, port: &Port<T>) -> Result<(), StructuralError> {
        self.component.add_in_port(port)
    }

    /// Convenience for declaring this model's own output port.
    pub fn add_out_port<T: Value>(&mut self, port: &Port<T>) -> Result<(), StructuralError> {
        self.component.add_out_port(port)
    }

    pub fn children(&self) -> &[Model] {
        &self.children
    }

    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    fn child(&self, name: &str) -> Result<&Model, StructuralError> {
        self.children
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| StructuralError::UnknownComponent {
                coupled: self.name().to_string(),
                component: name.to_string(),
            })
    }

    pub(crate) fn into_parts(self) -> (Component, Vec<Model>, Vec<Coupling>) {
        (self.component, self.children, self.couplings)
    }
}

impl std::fmt::Debug for Coupled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coupled")
            .field("name", &self.name())
            .field(
                "children",
                &self.children.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("couplings", &self.couplings)
            .finish()
    }
}
