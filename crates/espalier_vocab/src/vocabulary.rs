//! The statement-kind registry.

use std::collections::HashMap;

use crate::keyword::Keyword;
use crate::parse::ArgRule;
use crate::support::{Cardinality, CopyPolicy, DefKind, StatementSupport};

/// Registry mapping statement keywords to their capability records.
///
/// The [`vanilla`](Vocabulary::vanilla) set covers the shipped language;
/// [`register`](Vocabulary::register) adds or overrides kinds, which is how
/// extension statements gain semantics.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    supports: HashMap<Keyword, StatementSupport>,
}

impl Vocabulary {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a statement kind, replacing any previous record.
    pub fn register(&mut self, support: StatementSupport) {
        self.supports.insert(support.keyword.clone(), support);
    }

    /// Returns the record for a keyword, if registered.
    #[must_use]
    pub fn support(&self, keyword: &Keyword) -> Option<&StatementSupport> {
        self.supports.get(keyword)
    }

    /// Returns the copy policy for a keyword; unregistered kinds Reject.
    #[must_use]
    pub fn copy_policy(&self, keyword: &Keyword) -> CopyPolicy {
        self.support(keyword).map_or(CopyPolicy::Reject, |s| s.copy)
    }

    /// Returns true if the keyword is a registered data node kind.
    #[must_use]
    pub fn is_data_node(&self, keyword: &Keyword) -> bool {
        self.support(keyword).is_some_and(|s| s.data_node)
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.supports.len()
    }

    /// Returns true if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.supports.is_empty()
    }

    /// Builds the vanilla vocabulary.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn vanilla() -> Self {
        use Cardinality as C;
        use Keyword as K;

        let mut vocab = Self::new();

        // Common metadata substatements, attached to most kinds.
        let meta = |support: StatementSupport| {
            support
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL)
                .sub(K::Status, C::OPTIONAL)
        };
        // Body substatements shared by module-like and container-like kinds.
        let body = |support: StatementSupport| {
            support
                .sub(K::Typedef, C::ANY)
                .sub(K::Grouping, C::ANY)
                .sub(K::Container, C::ANY)
                .sub(K::Leaf, C::ANY)
                .sub(K::LeafList, C::ANY)
                .sub(K::List, C::ANY)
                .sub(K::Choice, C::ANY)
                .sub(K::Uses, C::ANY)
        };

        vocab.register(
            meta(body(StatementSupport::new(K::Module, ArgRule::Ident)))
                .sub(K::Namespace, C::REQUIRED)
                .sub(K::Prefix, C::REQUIRED)
                .sub(K::Revision, C::ANY)
                .sub(K::Import, C::ANY)
                .sub(K::Include, C::ANY)
                .sub(K::Identity, C::ANY)
                .sub(K::Augment, C::ANY)
                .sub(K::Deviation, C::ANY)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            meta(body(StatementSupport::new(K::Submodule, ArgRule::Ident)))
                .sub(K::BelongsTo, C::REQUIRED)
                .sub(K::Revision, C::ANY)
                .sub(K::Import, C::ANY)
                .sub(K::Include, C::ANY)
                .sub(K::Identity, C::ANY)
                .copy(CopyPolicy::Reject),
        );

        // Linkage statements never propagate into copies.
        vocab.register(
            StatementSupport::new(K::Namespace, ArgRule::Text).copy(CopyPolicy::Reject),
        );
        vocab.register(StatementSupport::new(K::Prefix, ArgRule::Ident).copy(CopyPolicy::Reject));
        vocab.register(
            StatementSupport::new(K::Revision, ArgRule::Text)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::Import, ArgRule::Ident)
                .sub(K::Prefix, C::REQUIRED)
                .sub(K::RevisionDate, C::OPTIONAL)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::RevisionDate, ArgRule::Text).copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::Include, ArgRule::Ident)
                .sub(K::RevisionDate, C::OPTIONAL)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::BelongsTo, ArgRule::Ident)
                .sub(K::Prefix, C::REQUIRED)
                .copy(CopyPolicy::Reject),
        );

        // Reuse and overlay.
        vocab.register(
            meta(body(StatementSupport::new(K::Grouping, ArgRule::Ident)))
                .defines(DefKind::Grouping),
        );
        vocab.register(
            meta(StatementSupport::new(K::Uses, ArgRule::Reference))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Refine, C::ANY),
        );
        vocab.register(
            StatementSupport::new(K::Refine, ArgRule::DescendantNodeId)
                .sub(K::Default, C::OPTIONAL)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::Mandatory, C::OPTIONAL)
                .sub(K::Presence, C::OPTIONAL)
                .sub(K::MinElements, C::OPTIONAL)
                .sub(K::MaxElements, C::OPTIONAL)
                .sub(K::Units, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            meta(StatementSupport::new(K::Augment, ArgRule::AbsoluteNodeId))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Container, C::ANY)
                .sub(K::Leaf, C::ANY)
                .sub(K::LeafList, C::ANY)
                .sub(K::List, C::ANY)
                .sub(K::Choice, C::ANY)
                .sub(K::Case, C::ANY)
                .sub(K::Uses, C::ANY)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::When, ArgRule::Text)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL),
        );
        vocab.register(
            StatementSupport::new(K::Deviation, ArgRule::AbsoluteNodeId)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL)
                .sub(K::Deviate, C::SOME)
                .copy(CopyPolicy::Reject),
        );
        vocab.register(
            StatementSupport::new(K::Deviate, ArgRule::Deviate)
                .sub(K::Type, C::OPTIONAL)
                .sub(K::Units, C::OPTIONAL)
                .sub(K::Default, C::OPTIONAL)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::Mandatory, C::OPTIONAL)
                .sub(K::MinElements, C::OPTIONAL)
                .sub(K::MaxElements, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .copy(CopyPolicy::Reject),
        );

        // Types.
        vocab.register(
            meta(StatementSupport::new(K::Typedef, ArgRule::Ident))
                .sub(K::Type, C::REQUIRED)
                .sub(K::Units, C::OPTIONAL)
                .sub(K::Default, C::OPTIONAL)
                .defines(DefKind::Typedef),
        );
        vocab.register(
            StatementSupport::new(K::Type, ArgRule::Reference)
                .sub(K::Range, C::OPTIONAL)
                .sub(K::Length, C::OPTIONAL)
                .sub(K::Pattern, C::ANY)
                .sub(K::Enum, C::ANY)
                .sub(K::Bit, C::ANY)
                .sub(K::Path, C::OPTIONAL)
                .sub(K::RequireInstance, C::OPTIONAL)
                .sub(K::Base, C::OPTIONAL),
        );
        vocab.register(
            StatementSupport::new(K::Range, ArgRule::Ranges)
                .sub(K::ErrorMessage, C::OPTIONAL)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL),
        );
        vocab.register(
            StatementSupport::new(K::Length, ArgRule::Ranges)
                .sub(K::ErrorMessage, C::OPTIONAL)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL),
        );
        vocab.register(
            StatementSupport::new(K::Pattern, ArgRule::Text)
                .sub(K::Modifier, C::OPTIONAL)
                .sub(K::ErrorMessage, C::OPTIONAL)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL),
        );
        vocab.register(StatementSupport::new(K::Modifier, ArgRule::Text));
        vocab.register(
            meta(StatementSupport::new(K::Enum, ArgRule::Text)).sub(K::Value, C::OPTIONAL),
        );
        vocab.register(StatementSupport::new(K::Value, ArgRule::Int));
        vocab.register(
            meta(StatementSupport::new(K::Bit, ArgRule::Ident)).sub(K::Position, C::OPTIONAL),
        );
        vocab.register(StatementSupport::new(K::Position, ArgRule::Uint));
        vocab.register(StatementSupport::new(K::Path, ArgRule::Text));
        vocab.register(StatementSupport::new(K::RequireInstance, ArgRule::Bool));
        vocab.register(StatementSupport::new(K::Base, ArgRule::Reference));
        vocab.register(
            meta(StatementSupport::new(K::Identity, ArgRule::Ident))
                .sub(K::Base, C::OPTIONAL)
                .defines(DefKind::Identity),
        );

        // Metadata and constraints.
        vocab.register(StatementSupport::new(K::Description, ArgRule::Text).copy(CopyPolicy::Reuse));
        vocab.register(StatementSupport::new(K::Reference, ArgRule::Text).copy(CopyPolicy::Reuse));
        vocab.register(StatementSupport::new(K::Status, ArgRule::Status).copy(CopyPolicy::Reuse));
        vocab.register(StatementSupport::new(K::Units, ArgRule::Text).copy(CopyPolicy::Reuse));
        vocab.register(StatementSupport::new(K::Default, ArgRule::Text));
        vocab.register(StatementSupport::new(K::Config, ArgRule::Bool));
        vocab.register(StatementSupport::new(K::Mandatory, ArgRule::Bool));
        vocab.register(StatementSupport::new(K::Presence, ArgRule::Text));
        vocab.register(StatementSupport::new(K::MinElements, ArgRule::Uint));
        vocab.register(StatementSupport::new(K::MaxElements, ArgRule::Uint));
        vocab.register(StatementSupport::new(K::OrderedBy, ArgRule::OrderedBy));
        vocab.register(
            StatementSupport::new(K::Must, ArgRule::Text)
                .sub(K::ErrorMessage, C::OPTIONAL)
                .sub(K::Description, C::OPTIONAL)
                .sub(K::Reference, C::OPTIONAL),
        );
        vocab.register(
            StatementSupport::new(K::ErrorMessage, ArgRule::Text).copy(CopyPolicy::Reuse),
        );
        vocab.register(StatementSupport::new(K::Key, ArgRule::KeyList).copy(CopyPolicy::Reject));

        // Data nodes.
        vocab.register(
            meta(body(StatementSupport::new(K::Container, ArgRule::Ident)))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Presence, C::OPTIONAL)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .data_node(),
        );
        vocab.register(
            meta(StatementSupport::new(K::Leaf, ArgRule::Ident))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Type, C::REQUIRED)
                .sub(K::Units, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .sub(K::Default, C::OPTIONAL)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::Mandatory, C::OPTIONAL)
                .data_node(),
        );
        vocab.register(
            meta(StatementSupport::new(K::LeafList, ArgRule::Ident))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Type, C::REQUIRED)
                .sub(K::Units, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .sub(K::Default, C::ANY)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::MinElements, C::OPTIONAL)
                .sub(K::MaxElements, C::OPTIONAL)
                .sub(K::OrderedBy, C::OPTIONAL)
                .data_node()
                .order_significant(),
        );
        vocab.register(
            meta(body(StatementSupport::new(K::List, ArgRule::Ident)))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Key, C::OPTIONAL)
                .sub(K::Must, C::ANY)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::MinElements, C::OPTIONAL)
                .sub(K::MaxElements, C::OPTIONAL)
                .sub(K::OrderedBy, C::OPTIONAL)
                .data_node()
                .order_significant(),
        );
        vocab.register(
            meta(StatementSupport::new(K::Choice, ArgRule::Ident))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Default, C::OPTIONAL)
                .sub(K::Config, C::OPTIONAL)
                .sub(K::Mandatory, C::OPTIONAL)
                .sub(K::Case, C::ANY)
                .data_node(),
        );
        vocab.register(
            meta(StatementSupport::new(K::Case, ArgRule::Ident))
                .sub(K::When, C::OPTIONAL)
                .sub(K::Container, C::ANY)
                .sub(K::Leaf, C::ANY)
                .sub(K::LeafList, C::ANY)
                .sub(K::List, C::ANY)
                .sub(K::Choice, C::ANY)
                .sub(K::Uses, C::ANY)
                .data_node()
                .order_significant(),
        );

        vocab
    }
}
