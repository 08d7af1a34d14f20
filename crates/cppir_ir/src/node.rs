//! IR node definitions.
//!
//! A [`Node`] is a common header (`index`, `name`, `location`) plus a [`NodeKind`] payload. The set of
//! kinds is closed; consumers dispatch with `match` rather than downcasting.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in the graph's node list.
///
/// Assigned once at insertion and never changed; the sole cross-reference mechanism between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Wire encoding for references that may be absent: `-1` stands for `None`.
pub(crate) mod optional_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NodeId;

    pub fn serialize<S: Serializer>(value: &Option<NodeId>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_i64(id.0 as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeId>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok().map(NodeId))
    }
}

/// Source position of a declaration or use site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// True when the location points nowhere (builtins, synthesized nodes).
    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.column == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Const,
    Volatile,
    Static,
    Virtual,
    PureVirtual,
}

/// Type qualifier, in the order the lowering engine peels them.
///
/// `Output` is reserved for annotation-driven marking and is never produced by lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Qualifier {
    Const,
    Reference,
    Output,
    Pointer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
    #[default]
    Ignored = 0,
    Note = 1,
    Warning = 2,
    Error = 3,
    Fatal = 4,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticSeverity::Ignored => "ignored",
            DiagnosticSeverity::Note => "note",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Fixed enumeration of builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuiltinKind {
    Void,
    Nullptr,
    Unsupported,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    Float,
    Float16,
    BFloat16,
    Double,
    LongDouble,
    Float128,
}

/// A user annotation such as `annotate("serializable(json)")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub attributes: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub qualified_type: NodeId,
    /// Byte offset inside the record
    pub offset: u64,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub qualified_type: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBase {
    /// `None` when the base class lies outside user scope
    #[serde(with = "optional_ref")]
    pub base_record: Option<NodeId>,
    pub is_virtual: bool,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateArgumentKind {
    Unknown,
    Type,
    Integral,
}

/// One positional template argument of a record instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RawTemplateArgument", from = "RawTemplateArgument")]
pub enum TemplateArgument {
    /// Packs and kinds the IR cannot represent
    Unknown,
    /// Index of a DataType node
    Type(NodeId),
    Integral(i64),
}

impl TemplateArgument {
    pub fn kind(&self) -> TemplateArgumentKind {
        match self {
            TemplateArgument::Unknown => TemplateArgumentKind::Unknown,
            TemplateArgument::Type(_) => TemplateArgumentKind::Type,
            TemplateArgument::Integral(_) => TemplateArgumentKind::Integral,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawTemplateArgument {
    kind: TemplateArgumentKind,
    value: i64,
}

impl From<TemplateArgument> for RawTemplateArgument {
    fn from(arg: TemplateArgument) -> Self {
        let value = match arg {
            TemplateArgument::Unknown => -1,
            TemplateArgument::Type(id) => id.0 as i64,
            TemplateArgument::Integral(v) => v,
        };
        Self { kind: arg.kind(), value }
    }
}

impl From<RawTemplateArgument> for TemplateArgument {
    fn from(raw: RawTemplateArgument) -> Self {
        match raw.kind {
            TemplateArgumentKind::Type => match usize::try_from(raw.value) {
                Ok(index) => TemplateArgument::Type(NodeId(index)),
                Err(_) => TemplateArgument::Unknown,
            },
            TemplateArgumentKind::Integral => TemplateArgument::Integral(raw.value),
            TemplateArgumentKind::Unknown => TemplateArgument::Unknown,
        }
    }
}

/// A parser diagnostic captured in-band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
    pub category: String,
    pub severity: DiagnosticSeverity,
}

/// A class, struct or union.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub fields: Vec<Field>,
    /// Indices of the record's method Function nodes
    pub functions: Vec<NodeId>,
    pub bases: Vec<RecordBase>,
    pub is_anonymous: bool,
    pub annotations: Vec<Annotation>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub return_qualified_type: NodeId,
    pub access: Access,
    pub parameters: Vec<Parameter>,
    pub modifiers: BTreeSet<Modifier>,
    pub annotations: Vec<Annotation>,
    pub comments: Vec<String>,
}

impl Function {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Literal initializer text
    pub value: String,
    pub qualified_type: NodeId,
    pub access: Access,
    pub comments: Vec<String>,
}

/// Unqualified, canonical data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataKind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataType {
    Unknown,
    Builtin {
        #[serde(rename = "builtinKind")]
        kind: BuiltinKind,
    },
    Record {
        /// `None` for records outside user scope
        #[serde(with = "optional_ref")]
        record_type: Option<NodeId>,
        template_args: Vec<TemplateArgument>,
    },
    Enum {
        underlying_type: NodeId,
        enumerators: Vec<Enumerator>,
    },
    Function {
        /// DataType of the canonical return type
        return_type: NodeId,
        /// DataTypes of the canonical argument types, in order
        argument_types: Vec<NodeId>,
        is_variadic: bool,
    },
}

impl DataType {
    /// True for a Record data type whose declaration was not lowered.
    pub fn is_external_record(&self) -> bool {
        matches!(self, DataType::Record { record_type: None, .. })
    }
}

/// A canonical data type plus the qualifiers peeled from the use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedType {
    pub data_type: NodeId,
    pub qualifiers: Vec<Qualifier>,
    pub annotations: Vec<Annotation>,
}

impl QualifiedType {
    pub fn new(data_type: NodeId) -> Self {
        Self {
            data_type,
            qualifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Vec<Qualifier>) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn has_qualifier(&self, qualifier: Qualifier) -> bool {
        self.qualifiers.contains(&qualifier)
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum NodeKind {
    Message(Message),
    Record(Record),
    Function(Function),
    Variable(Variable),
    QualifiedType(QualifiedType),
    DataType(DataType),
}

/// One entry of the IR graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub index: NodeId,
    pub name: String,
    pub location: Location,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn as_message(&self) -> Option<&Message> {
        match &self.kind {
            NodeKind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match &self.kind {
            NodeKind::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            NodeKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_qualified_type(&self) -> Option<&QualifiedType> {
        match &self.kind {
            NodeKind::QualifiedType(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_data_type(&self) -> Option<&DataType> {
        match &self.kind {
            NodeKind::DataType(d) => Some(d),
            _ => None,
        }
    }

    /// Short kind label used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Message(_) => "Message",
            NodeKind::Record(_) => "Record",
            NodeKind::Function(_) => "Function",
            NodeKind::Variable(_) => "Variable",
            NodeKind::QualifiedType(_) => "QualifiedType",
            NodeKind::DataType(_) => "DataType",
        }
    }
}
