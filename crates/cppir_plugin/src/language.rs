//! Language generators and their registry.

use std::path::Path;

use crate::accessor::GraphAccessor;
use crate::errors::DispatchError;

/// Well-known target language names used as [`TypeHolder`](crate::TypeHolder) keys.
pub mod languages {
    pub const CPP: &str = "Cpp";
    pub const CSHARP: &str = "CSharp";
    pub const PYTHON: &str = "Python";
    pub const PROTO: &str = "Proto";

    pub const ALL: [&str; 4] = [CPP, CSHARP, PYTHON, PROTO];
}

/// A code emitter for one target language.
pub trait LanguageGenerator {
    fn language_name(&self) -> &str;

    /// Prepare for generation. Called once per run before [`generate_code`](Self::generate_code).
    fn configure(&mut self, accessor: &dyn GraphAccessor, output: &Path) -> Result<(), DispatchError>;

    fn generate_code(&mut self, accessor: &dyn GraphAccessor, output: &Path) -> Result<(), DispatchError>;
}

#[derive(Default)]
pub struct LanguageRegistry {
    generators: Vec<Box<dyn LanguageGenerator>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, generator: impl LanguageGenerator + 'static) -> &mut Self {
        self.generators.push(Box::new(generator));
        self
    }

    /// Case-insensitive lookup by language name.
    pub fn get_mut(&mut self, language: &str) -> Option<&mut (dyn LanguageGenerator + 'static)> {
        self.generators
            .iter_mut()
            .find(|g| g.language_name().eq_ignore_ascii_case(language))
            .map(|g| g.as_mut())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.iter().map(|g| g.language_name())
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
