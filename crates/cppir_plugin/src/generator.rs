//! Type generators and priority-based selection.

use cppir_ir::{Annotation, Node};

use crate::accessor::GraphAccessor;
use crate::builtin::BuiltinTypeGenerator;
use crate::errors::DispatchError;
use crate::holder::TypeHolder;

/// Produces a [`TypeHolder`] for graph nodes it recognizes.
pub trait TypeGenerator {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Priority for `node`, or `None` when the generator does not handle it.
    fn priority(&self, accessor: &dyn GraphAccessor, node: &Node, annotations: &[Annotation]) -> Option<i32>;

    fn generate_type(
        &self,
        accessor: &dyn GraphAccessor,
        node: &Node,
        annotations: &[Annotation],
    ) -> Result<TypeHolder, DispatchError>;
}

/// Generator assembled from two closures.
pub struct FnTypeGenerator<P, G> {
    name: String,
    priority: P,
    generate: G,
}

impl<P, G> FnTypeGenerator<P, G>
where
    P: Fn(&dyn GraphAccessor, &Node, &[Annotation]) -> Option<i32>,
    G: Fn(&dyn GraphAccessor, &Node, &[Annotation]) -> Result<TypeHolder, DispatchError>,
{
    pub fn new(name: impl Into<String>, priority: P, generate: G) -> Self {
        Self {
            name: name.into(),
            priority,
            generate,
        }
    }
}

impl<P, G> TypeGenerator for FnTypeGenerator<P, G>
where
    P: Fn(&dyn GraphAccessor, &Node, &[Annotation]) -> Option<i32>,
    G: Fn(&dyn GraphAccessor, &Node, &[Annotation]) -> Result<TypeHolder, DispatchError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self, accessor: &dyn GraphAccessor, node: &Node, annotations: &[Annotation]) -> Option<i32> {
        (self.priority)(accessor, node, annotations)
    }

    fn generate_type(
        &self,
        accessor: &dyn GraphAccessor,
        node: &Node,
        annotations: &[Annotation],
    ) -> Result<TypeHolder, DispatchError> {
        (self.generate)(accessor, node, annotations)
    }
}

/// Ordered collection of type generators.
///
/// Registration order is significant: it breaks priority ties.
#[derive(Default)]
pub struct TypeGeneratorRegistry {
    generators: Vec<Box<dyn TypeGenerator>>,
}

impl TypeGeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with [`BuiltinTypeGenerator`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BuiltinTypeGenerator);
        registry
    }

    pub fn register(&mut self, generator: impl TypeGenerator + 'static) -> &mut Self {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Pick the generator with the strictly highest priority; the earliest registration wins ties.
    pub fn select(
        &self,
        accessor: &dyn GraphAccessor,
        node: &Node,
        annotations: &[Annotation],
    ) -> Option<&dyn TypeGenerator> {
        let mut best: Option<(i32, &dyn TypeGenerator)> = None;
        for generator in &self.generators {
            let Some(priority) = generator.priority(accessor, node, annotations) else {
                continue;
            };
            match best {
                Some((current, _)) if priority <= current => {}
                _ => best = Some((priority, generator.as_ref())),
            }
        }
        best.map(|(_, generator)| generator)
    }
}

impl std::fmt::Debug for TypeGeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.generators.iter().map(|g| g.name())).finish()
    }
}
