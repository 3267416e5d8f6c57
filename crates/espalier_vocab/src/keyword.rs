//! The statement keyword vocabulary.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A statement keyword.
///
/// The vanilla vocabulary is closed (one variant per known kind); the
/// [`Extension`](Keyword::Extension) variant carries any other keyword text
/// so that registries remain extensible with custom statement kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Keyword {
    /// `module`: a source root defining a namespace.
    Module,
    /// `submodule`: a source root belonging to a module.
    Submodule,
    /// `container`: an interior data node.
    Container,
    /// `leaf`: a scalar data node.
    Leaf,
    /// `leaf-list`: a sequence of scalar values.
    LeafList,
    /// `list`: a sequence of entries.
    List,
    /// `choice`: alternative schema branches.
    Choice,
    /// `case`: one branch of a choice; child order is significant.
    Case,
    /// `namespace`: the module's namespace URI.
    Namespace,
    /// `prefix`: the module's (or an import's) prefix binding.
    Prefix,
    /// `revision`: a revision date of the module.
    Revision,
    /// `import`: linkage to another module.
    Import,
    /// `revision-date`: a required revision on an import or include.
    RevisionDate,
    /// `include`: linkage from a module to one of its submodules.
    Include,
    /// `belongs-to`: linkage from a submodule to its module.
    BelongsTo,
    /// `grouping`: a named reusable statement subtree.
    Grouping,
    /// `uses`: expands a copy of a grouping at the use site.
    Uses,
    /// `refine`: edits a node freshly copied by the enclosing `uses`.
    Refine,
    /// `augment`: inserts substatements into a node elsewhere.
    Augment,
    /// `when`: a conditional guard expression.
    When,
    /// `deviation`: a post-hoc edit of an already-resolved node.
    Deviation,
    /// `deviate`: one edit carried by a deviation.
    Deviate,
    /// `typedef`: a named derived type definition.
    Typedef,
    /// `type`: a reference to a builtin or derived type.
    Type,
    /// `range`: a value-range restriction.
    Range,
    /// `length`: a length restriction.
    Length,
    /// `pattern`: a pattern restriction.
    Pattern,
    /// `modifier`: flips a pattern's polarity (`invert-match`).
    Modifier,
    /// `enum`: a named member of an enumeration type.
    Enum,
    /// `value`: an explicit numeric value for an enum member.
    Value,
    /// `bit`: a named member of a bits type.
    Bit,
    /// `position`: an explicit bit position.
    Position,
    /// `path`: a leafref target path expression.
    Path,
    /// `require-instance`: whether a leafref target must exist.
    RequireInstance,
    /// `base`: the base of an identity or identityref.
    Base,
    /// `identity`: a globally named identity.
    Identity,
    /// `description`: human-readable documentation.
    Description,
    /// `reference`: a cross-reference to external documentation.
    Reference,
    /// `status`: lifecycle status of a definition.
    Status,
    /// `units`: the units of a leaf value.
    Units,
    /// `default`: a default value.
    Default,
    /// `config`: whether a node is configuration or state data.
    Config,
    /// `mandatory`: whether a node must be present.
    Mandatory,
    /// `presence`: marks a container as presence-carrying.
    Presence,
    /// `min-elements`: minimum entry count of a list/leaf-list.
    MinElements,
    /// `max-elements`: maximum entry count of a list/leaf-list.
    MaxElements,
    /// `ordered-by`: whether entry order is user-controlled.
    OrderedBy,
    /// `must`: a constraint expression on a data node.
    Must,
    /// `error-message`: the message reported when a constraint fails.
    ErrorMessage,
    /// `key`: the key leaves of a list.
    Key,
    /// Any keyword outside the vanilla vocabulary.
    Extension(Arc<str>),
}

impl Keyword {
    /// Maps keyword text to its vocabulary entry.
    ///
    /// Unrecognized text becomes [`Keyword::Extension`]; whether such a
    /// statement is accepted depends on the registry it is resolved against.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text {
            "module" => Self::Module,
            "submodule" => Self::Submodule,
            "container" => Self::Container,
            "leaf" => Self::Leaf,
            "leaf-list" => Self::LeafList,
            "list" => Self::List,
            "choice" => Self::Choice,
            "case" => Self::Case,
            "namespace" => Self::Namespace,
            "prefix" => Self::Prefix,
            "revision" => Self::Revision,
            "import" => Self::Import,
            "revision-date" => Self::RevisionDate,
            "include" => Self::Include,
            "belongs-to" => Self::BelongsTo,
            "grouping" => Self::Grouping,
            "uses" => Self::Uses,
            "refine" => Self::Refine,
            "augment" => Self::Augment,
            "when" => Self::When,
            "deviation" => Self::Deviation,
            "deviate" => Self::Deviate,
            "typedef" => Self::Typedef,
            "type" => Self::Type,
            "range" => Self::Range,
            "length" => Self::Length,
            "pattern" => Self::Pattern,
            "modifier" => Self::Modifier,
            "enum" => Self::Enum,
            "value" => Self::Value,
            "bit" => Self::Bit,
            "position" => Self::Position,
            "path" => Self::Path,
            "require-instance" => Self::RequireInstance,
            "base" => Self::Base,
            "identity" => Self::Identity,
            "description" => Self::Description,
            "reference" => Self::Reference,
            "status" => Self::Status,
            "units" => Self::Units,
            "default" => Self::Default,
            "config" => Self::Config,
            "mandatory" => Self::Mandatory,
            "presence" => Self::Presence,
            "min-elements" => Self::MinElements,
            "max-elements" => Self::MaxElements,
            "ordered-by" => Self::OrderedBy,
            "must" => Self::Must,
            "error-message" => Self::ErrorMessage,
            "key" => Self::Key,
            other => Self::Extension(other.into()),
        }
    }

    /// Returns the keyword text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Module => "module",
            Self::Submodule => "submodule",
            Self::Container => "container",
            Self::Leaf => "leaf",
            Self::LeafList => "leaf-list",
            Self::List => "list",
            Self::Choice => "choice",
            Self::Case => "case",
            Self::Namespace => "namespace",
            Self::Prefix => "prefix",
            Self::Revision => "revision",
            Self::Import => "import",
            Self::RevisionDate => "revision-date",
            Self::Include => "include",
            Self::BelongsTo => "belongs-to",
            Self::Grouping => "grouping",
            Self::Uses => "uses",
            Self::Refine => "refine",
            Self::Augment => "augment",
            Self::When => "when",
            Self::Deviation => "deviation",
            Self::Deviate => "deviate",
            Self::Typedef => "typedef",
            Self::Type => "type",
            Self::Range => "range",
            Self::Length => "length",
            Self::Pattern => "pattern",
            Self::Modifier => "modifier",
            Self::Enum => "enum",
            Self::Value => "value",
            Self::Bit => "bit",
            Self::Position => "position",
            Self::Path => "path",
            Self::RequireInstance => "require-instance",
            Self::Base => "base",
            Self::Identity => "identity",
            Self::Description => "description",
            Self::Reference => "reference",
            Self::Status => "status",
            Self::Units => "units",
            Self::Default => "default",
            Self::Config => "config",
            Self::Mandatory => "mandatory",
            Self::Presence => "presence",
            Self::MinElements => "min-elements",
            Self::MaxElements => "max-elements",
            Self::OrderedBy => "ordered-by",
            Self::Must => "must",
            Self::ErrorMessage => "error-message",
            Self::Key => "key",
            Self::Extension(text) => text,
        }
    }

    /// Returns true for keywords outside the vanilla vocabulary.
    #[must_use]
    pub const fn is_extension(&self) -> bool {
        matches!(self, Self::Extension(_))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
