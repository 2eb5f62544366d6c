use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::error::{SimulationError, StructuralError};

/// Bound for values that can travel through ports.
///
/// Values are cloned on every routing hop and may cross threads in parallel
/// runs, hence the `Send + Sync + Clone` requirement.
pub trait Value: Send + Sync + Clone + 'static {}

impl<T: Send + Sync + Clone + 'static> Value for T {}

/// A typed, named channel carrying zero or more values during one simulation
/// instant.
///
/// `Port<T>` is a cheap handle: cloning it yields another handle to the same
/// shared bag. The owning model keeps one handle for `lambda`/`deltext`
/// access while the component registry keeps a type-erased handle for
/// routing and clearing. The bag only ever holds values from a single
/// instant; the coordinator clears every port between instants.
#[derive(Debug)]
pub struct Port<T: Value> {
    inner: Arc<PortInner<T>>,
}

#[derive(Debug)]
pub(crate) struct PortInner<T: Value> {
    name: String,
    bag: Mutex<Vec<T>>,
}

impl<T: Value> Port<T> {
    /// Create a new, empty port.
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(PortInner {
                name: name.to_string(),
                bag: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Get the port name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Append a value to the current-instant bag.
    pub fn add_value(&self, value: T) {
        self.inner.bag().push(value);
    }

    /// Get the first queued value, or fail if the bag is empty.
    pub fn get_single_value(&self) -> Result<T, SimulationError> {
        self.inner
            .bag()
            .first()
            .cloned()
            .ok_or_else(|| SimulationError::EmptyPort(self.inner.name.clone()))
    }

    /// Snapshot all queued values in insertion order.
    pub fn values(&self) -> Vec<T> {
        self.inner.bag().clone()
    }

    /// Check whether the bag holds no values this instant.
    pub fn is_empty(&self) -> bool {
        self.inner.bag().is_empty()
    }

    /// Number of values queued this instant.
    pub fn len(&self) -> usize {
        self.inner.bag().len()
    }

    /// Empty the bag. Called by the coordinator between instants.
    pub fn clear(&self) {
        self.inner.bag().clear();
    }

    pub(crate) fn erased(&self) -> Arc<dyn ErasedPort> {
        self.inner.clone()
    }
}

impl<T: Value> Clone for Port<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Value> PortInner<T> {
    fn bag(&self) -> MutexGuard<'_, Vec<T>> {
        // Phases never overlap, so the lock is uncontended; poisoning can
        // only follow a panic that already aborted the run.
        self.bag.lock().expect("port bag lock poisoned")
    }
}

/// Type-erased view of a port, used by the coordinator for coupling
/// validation, value routing and clearing.
///
/// The `TypeId` introspection lets `Coupled::add_coupling` reject
/// incompatible endpoints at build time, before any value moves.
pub(crate) trait ErasedPort: Send + Sync {
    fn name(&self) -> &str;

    fn value_type_id(&self) -> TypeId;

    fn value_type_name(&self) -> &'static str;

    fn is_empty(&self) -> bool;

    fn clear(&self);

    fn as_any(&self) -> &dyn Any;

    /// Copy every value queued on `source` into this port's bag, preserving
    /// source insertion order.
    fn propagate_from(&self, source: &dyn ErasedPort) -> Result<(), SimulationError>;
}

impl<T: Value> ErasedPort for PortInner<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_empty(&self) -> bool {
        self.bag().is_empty()
    }

    fn clear(&self) {
        self.bag().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn propagate_from(&self, source: &dyn ErasedPort) -> Result<(), SimulationError> {
        let source_inner = source.as_any().downcast_ref::<PortInner<T>>().ok_or_else(|| {
            StructuralError::CouplingTypeMismatch {
                src: source.name().to_string(),
                dst: self.name.clone(),
                src_type: source.value_type_name(),
                dst_type: std::any::type_name::<T>(),
            }
        })?;
        let values = source_inner.bag().clone();
        self.bag().extend(values);
        Ok(())
    }
}
