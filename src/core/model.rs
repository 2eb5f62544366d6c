use crate::core::atomic::Atomic;
use crate::core::component::Component;
use crate::core::coupled::Coupled;

/// A node in the hierarchical model tree: either a leaf with its own
/// transition behavior or a composite of children and couplings.
///
/// The hierarchy is a closed variant rather than an open class hierarchy;
/// the coordinator dispatches on the tag when it builds the execution tree.
pub enum Model {
    Atomic(Box<dyn Atomic>),
    Coupled(Coupled),
}

impl Model {
    /// Wrap an atomic model.
    pub fn atomic(model: impl Atomic + 'static) -> Self {
        Model::Atomic(Box::new(model))
    }

    /// Wrap a coupled model.
    pub fn coupled(model: Coupled) -> Self {
        Model::Coupled(model)
    }

    pub fn name(&self) -> &str {
        self.component().name()
    }

    pub(crate) fn component(&self) -> &Component {
        match self {
            Model::Atomic(atomic) => atomic.component(),
            Model::Coupled(coupled) => coupled.component(),
        }
    }
}

impl From<Coupled> for Model {
    fn from(coupled: Coupled) -> Self {
        Model::Coupled(coupled)
    }
}
