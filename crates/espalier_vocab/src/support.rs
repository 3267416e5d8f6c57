//! Per-kind statement capability records.
//!
//! A [`StatementSupport`] bundles everything the reactor needs to know
//! about one statement kind: how its argument parses, which substatements
//! it allows and how often, how it behaves when inherited into another
//! location, and whether it defines a name or contributes to schema paths.

use espalier_foundation::Error;

use crate::keyword::Keyword;
use crate::parse::ArgRule;

/// How a statement subtree behaves when inherited into another location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPolicy {
    /// The destination shares the same substatement instance. Valid only
    /// for statements with no position-dependent identity.
    Reuse,
    /// The destination gets a deep, independent duplicate with its scope
    /// rebound. The default for schema-defining substatements.
    Copy,
    /// An existing copied sibling is amended in place rather than
    /// duplicated again. Chosen by edit application (refine, deviate),
    /// never assigned to a kind directly.
    Append,
    /// Inheritance is disallowed; the statement never propagates.
    Reject,
}

/// What kind of named definition a statement registers, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefKind {
    /// A reusable statement subtree (`grouping`).
    Grouping,
    /// A derived type (`typedef`).
    Typedef,
    /// A global identity (`identity`).
    Identity,
}

/// Occurrence bounds for one substatement kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cardinality {
    /// Minimum occurrences.
    pub min: u32,
    /// Maximum occurrences; `None` is unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// At most one occurrence.
    pub const OPTIONAL: Self = Self { min: 0, max: Some(1) };
    /// Exactly one occurrence.
    pub const REQUIRED: Self = Self { min: 1, max: Some(1) };
    /// Any number of occurrences.
    pub const ANY: Self = Self { min: 0, max: None };
    /// One or more occurrences.
    pub const SOME: Self = Self { min: 1, max: None };
}

/// The capability record for one statement kind.
#[derive(Clone, Debug)]
pub struct StatementSupport {
    /// The kind this record describes.
    pub keyword: Keyword,
    /// How the raw argument parses.
    pub arg: ArgRule,
    /// Allowed substatements with their occurrence bounds.
    pub substatements: Vec<(Keyword, Cardinality)>,
    /// Behavior under inheritance.
    pub copy: CopyPolicy,
    /// The namespace this statement registers its name into, if any.
    pub defines: Option<DefKind>,
    /// Whether the statement is a data node contributing a schema-path
    /// step.
    pub data_node: bool,
    /// Whether sibling order among statements of this kind carries
    /// meaning (e.g. case ordering).
    pub order_significant: bool,
}

impl StatementSupport {
    /// Creates a support record with no substatements and Copy policy.
    #[must_use]
    pub fn new(keyword: Keyword, arg: ArgRule) -> Self {
        Self {
            keyword,
            arg,
            substatements: Vec::new(),
            copy: CopyPolicy::Copy,
            defines: None,
            data_node: false,
            order_significant: false,
        }
    }

    /// Allows a substatement with the given bounds.
    #[must_use]
    pub fn sub(mut self, keyword: Keyword, cardinality: Cardinality) -> Self {
        self.substatements.push((keyword, cardinality));
        self
    }

    /// Sets the copy policy.
    #[must_use]
    pub const fn copy(mut self, policy: CopyPolicy) -> Self {
        self.copy = policy;
        self
    }

    /// Marks this kind as registering a named definition.
    #[must_use]
    pub const fn defines(mut self, kind: DefKind) -> Self {
        self.defines = Some(kind);
        self
    }

    /// Marks this kind as a data node.
    #[must_use]
    pub const fn data_node(mut self) -> Self {
        self.data_node = true;
        self
    }

    /// Marks sibling order among this kind as significant.
    #[must_use]
    pub const fn order_significant(mut self) -> Self {
        self.order_significant = true;
        self
    }

    /// Returns the occurrence bounds for a substatement kind, if allowed.
    #[must_use]
    pub fn cardinality_of(&self, keyword: &Keyword) -> Option<Cardinality> {
        self.substatements
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, c)| *c)
    }

    /// Validates the substatement occurrences of one statement.
    ///
    /// Extension substatements are always tolerated; everything else must
    /// be listed and within bounds. All violations are returned, not just
    /// the first.
    #[must_use]
    pub fn validate_substatements(&self, present: &[Keyword]) -> Vec<Error> {
        let mut errors = Vec::new();
        for (keyword, cardinality) in &self.substatements {
            #[allow(clippy::cast_possible_truncation)]
            let count = present.iter().filter(|k| *k == keyword).count() as u32;
            if count < cardinality.min {
                errors.push(Error::cardinality(format!(
                    "\"{}\" requires at least {} \"{keyword}\" substatement(s), found {count}",
                    self.keyword, cardinality.min
                )));
            }
            if let Some(max) = cardinality.max {
                if count > max {
                    errors.push(Error::cardinality(format!(
                        "\"{}\" allows at most {max} \"{keyword}\" substatement(s), found {count}",
                        self.keyword
                    )));
                }
            }
        }
        for keyword in present {
            if !keyword.is_extension() && self.cardinality_of(keyword).is_none() {
                errors.push(Error::cardinality(format!(
                    "\"{keyword}\" is not a valid substatement of \"{}\"",
                    self.keyword
                )));
            }
        }
        errors
    }
}
