//! The ordered global phases of a build.

use std::fmt;

/// One of the five ordered global phases the whole build moves through in
/// lockstep: no root enters phase N+1 while any root is incomplete in
/// phase N.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Register every root module/submodule into the global namespaces.
    SourcePreLinkage,
    /// Resolve imports and includes; bind prefix tables.
    SourceLinkage,
    /// Parse arguments, validate cardinality, register definitions.
    StatementDefinition,
    /// Expand groupings at their use sites; resolve identity bases.
    FullDeclaration,
    /// Compose types, apply augments then deviations, materialize.
    EffectiveModel,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Self; 5] = [
        Self::SourcePreLinkage,
        Self::SourceLinkage,
        Self::StatementDefinition,
        Self::FullDeclaration,
        Self::EffectiveModel,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SourcePreLinkage => "source-pre-linkage",
            Self::SourceLinkage => "source-linkage",
            Self::StatementDefinition => "statement-definition",
            Self::FullDeclaration => "full-declaration",
            Self::EffectiveModel => "effective-model",
        };
        write!(f, "{name}")
    }
}
