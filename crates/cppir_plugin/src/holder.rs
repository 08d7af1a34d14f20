//! Per-language type representations produced by type generators.

use std::collections::BTreeMap;
use std::fmt;

/// Language-specific naming and conversion details for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageType {
    /// Type name in the target language, when that language needs one
    pub native_type_name: Option<String>,
    /// Marshalling type name, when the language crosses an intermediate representation
    pub intermediate_type_name: Option<String>,
    pub native_converter: String,
    pub intermediate_converter: String,
}

impl LanguageType {
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            native_type_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_intermediate(mut self, name: impl Into<String>) -> Self {
        self.intermediate_type_name = Some(name.into());
        self
    }

    pub fn with_converters(mut self, native: impl Into<String>, intermediate: impl Into<String>) -> Self {
        self.native_converter = native.into();
        self.intermediate_converter = intermediate.into();
        self
    }
}

type WriteFn = dyn Fn(&mut dyn fmt::Write, &str) -> fmt::Result;

/// Optional inline code writer.
///
/// The language is an explicit argument of the callback, so one writer serves every language the
/// holder describes.
#[derive(Default)]
pub enum TypeWriter {
    #[default]
    None,
    Writer(Box<WriteFn>),
}

impl TypeWriter {
    pub fn new(write: impl Fn(&mut dyn fmt::Write, &str) -> fmt::Result + 'static) -> Self {
        TypeWriter::Writer(Box::new(write))
    }

    pub fn is_some(&self) -> bool {
        matches!(self, TypeWriter::Writer(_))
    }

    /// Run the writer for `language`. Returns `Ok(false)` when there is no writer.
    pub fn write(&self, out: &mut dyn fmt::Write, language: &str) -> Result<bool, fmt::Error> {
        match self {
            TypeWriter::None => Ok(false),
            TypeWriter::Writer(write) => write(out, language).map(|()| true),
        }
    }
}

impl fmt::Debug for TypeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeWriter::None => f.write_str("None"),
            TypeWriter::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Bundle of per-language type information for one graph node.
#[derive(Debug, Default)]
pub struct TypeHolder {
    languages: BTreeMap<String, LanguageType>,
    writer: TypeWriter,
}

impl TypeHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>, language_type: LanguageType) -> Self {
        self.languages.insert(language.into(), language_type);
        self
    }

    pub fn with_writer(mut self, writer: TypeWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn language(&self, language: &str) -> Option<&LanguageType> {
        self.languages.get(language)
    }

    pub fn language_mut(&mut self, language: &str) -> Option<&mut LanguageType> {
        self.languages.get_mut(language)
    }

    pub fn set_language(&mut self, language: impl Into<String>, language_type: LanguageType) {
        self.languages.insert(language.into(), language_type);
    }

    pub fn languages(&self) -> impl Iterator<Item = (&str, &LanguageType)> {
        self.languages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn writer(&self) -> &TypeWriter {
        &self.writer
    }

    pub fn set_writer(&mut self, writer: TypeWriter) {
        self.writer = writer;
    }
}
