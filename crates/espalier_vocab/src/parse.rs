//! Raw-argument parsers.
//!
//! Each statement kind declares an [`ArgRule`]; during resolution the
//! reactor feeds the statement's raw argument text through the rule to
//! obtain the typed [`Arg`]. Prefixed references are translated to module
//! names here, against the source's prefix table, so nothing downstream
//! ever sees a prefix again.

use std::sync::Arc;

use espalier_foundation::{
    Arg, DeviateKind, Error, OrderedBy, QName, RangeBound, RangeExpr, RangePart, RefArg, Result,
    Status,
};

/// Resolves prefixes to module names for one source.
///
/// `None` asks for the module the source itself belongs to (unprefixed
/// references and node-id steps).
pub trait PrefixScope {
    /// Returns the module name bound to `prefix`, if any.
    fn resolve(&self, prefix: Option<&str>) -> Option<Arc<str>>;
}

/// How a statement kind's raw argument parses into an [`Arg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgRule {
    /// No argument is permitted.
    None,
    /// A bare identifier naming the statement.
    Ident,
    /// Free-form text kept verbatim.
    Text,
    /// `true` or `false`.
    Bool,
    /// A signed integer.
    Int,
    /// An unsigned integer.
    Uint,
    /// `current`, `deprecated`, or `obsolete`.
    Status,
    /// `system` or `user`.
    OrderedBy,
    /// An optionally prefixed reference to a named definition.
    Reference,
    /// An absolute schema-node-id (`/p:a/p:b`), for augment/deviation
    /// targets.
    AbsoluteNodeId,
    /// A relative schema-node-id (`a/b`), for refine targets.
    DescendantNodeId,
    /// A range or length expression (`min..10 | 15 | 20..max`).
    Ranges,
    /// A deviate edit kind.
    Deviate,
    /// A whitespace-separated list of key leaf names.
    KeyList,
}

impl ArgRule {
    /// Parses a raw argument according to this rule.
    ///
    /// Returns `Ok(None)` only for [`ArgRule::None`] with no argument.
    ///
    /// # Errors
    ///
    /// `Syntax` when the argument is missing, unexpected, or malformed;
    /// `CrossReference` when a prefix is not bound in `scope`.
    pub fn parse(self, raw: Option<&str>, scope: &dyn PrefixScope) -> Result<Option<Arg>> {
        if self == Self::None {
            return match raw {
                None => Ok(None),
                Some(text) => Err(Error::syntax(format!("unexpected argument \"{text}\""))),
            };
        }
        let Some(text) = raw else {
            return Err(Error::syntax("missing argument"));
        };
        let arg = match self {
            Self::None => unreachable!("handled above"),
            Self::Ident => Arg::Ident(parse_identifier(text)?),
            Self::Text => Arg::Str(text.into()),
            Self::Bool => Arg::Bool(parse_bool(text)?),
            Self::Int => Arg::Int(
                text.parse()
                    .map_err(|_| Error::syntax(format!("invalid integer \"{text}\"")))?,
            ),
            Self::Uint => Arg::Uint(
                text.parse()
                    .map_err(|_| Error::syntax(format!("invalid unsigned integer \"{text}\"")))?,
            ),
            Self::Status => Arg::Status(parse_status(text)?),
            Self::OrderedBy => Arg::OrderedBy(parse_ordered_by(text)?),
            Self::Reference => Arg::Ref(parse_reference(text, scope)?),
            Self::AbsoluteNodeId => Arg::NodeId(parse_node_id(text, scope, true)?),
            Self::DescendantNodeId => Arg::NodeId(parse_node_id(text, scope, false)?),
            Self::Ranges => Arg::Ranges(parse_ranges(text)?),
            Self::Deviate => Arg::Deviate(parse_deviate(text)?),
            Self::KeyList => Arg::Keys(parse_key_list(text)?),
        };
        Ok(Some(arg))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn parse_identifier(text: &str) -> Result<Arc<str>> {
    if is_identifier(text) {
        Ok(text.into())
    } else {
        Err(Error::syntax(format!("invalid identifier \"{text}\"")))
    }
}

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::syntax(format!("invalid boolean \"{text}\""))),
    }
}

fn parse_status(text: &str) -> Result<Status> {
    match text {
        "current" => Ok(Status::Current),
        "deprecated" => Ok(Status::Deprecated),
        "obsolete" => Ok(Status::Obsolete),
        _ => Err(Error::syntax(format!("invalid status \"{text}\""))),
    }
}

fn parse_ordered_by(text: &str) -> Result<OrderedBy> {
    match text {
        "system" => Ok(OrderedBy::System),
        "user" => Ok(OrderedBy::User),
        _ => Err(Error::syntax(format!("invalid ordered-by \"{text}\""))),
    }
}

/// Splits `prefix:name` and translates the prefix to its module name.
fn parse_reference(text: &str, scope: &dyn PrefixScope) -> Result<RefArg> {
    match text.split_once(':') {
        Some((prefix, name)) => {
            if !is_identifier(prefix) || !is_identifier(name) {
                return Err(Error::syntax(format!("invalid reference \"{text}\"")));
            }
            let module = scope
                .resolve(Some(prefix))
                .ok_or_else(|| Error::cross_reference(format!("prefix \"{prefix}\" is not bound")))?;
            Ok(RefArg {
                module: Some(module),
                name: name.into(),
            })
        }
        None => Ok(RefArg::local(parse_identifier(text)?)),
    }
}

/// Parses a schema-node-id into fully qualified steps.
///
/// Absolute ids start with `/`; descendant ids must not. Unprefixed steps
/// take the local module's namespace.
fn parse_node_id(text: &str, scope: &dyn PrefixScope, absolute: bool) -> Result<Vec<QName>> {
    let body = if absolute {
        text.strip_prefix('/')
            .ok_or_else(|| Error::syntax(format!("target \"{text}\" must start with '/'")))?
    } else {
        if text.starts_with('/') {
            return Err(Error::syntax(format!(
                "target \"{text}\" must be a relative path"
            )));
        }
        text
    };
    if body.is_empty() {
        return Err(Error::syntax("empty schema-node-id"));
    }
    let mut steps = Vec::new();
    for step in body.split('/') {
        let reference = parse_reference(step, scope)?;
        let module = match reference.module {
            Some(module) => module,
            None => scope
                .resolve(None)
                .ok_or_else(|| Error::cross_reference("local module is not bound"))?,
        };
        steps.push(QName::new(module, reference.name));
    }
    Ok(steps)
}

fn parse_bound(text: &str) -> Result<RangeBound> {
    match text {
        "min" => Ok(RangeBound::Min),
        "max" => Ok(RangeBound::Max),
        _ => text
            .parse()
            .map(RangeBound::Value)
            .map_err(|_| Error::syntax(format!("invalid range bound \"{text}\""))),
    }
}

/// Parses `part | part | ...` where a part is `lo..hi` or a single bound.
fn parse_ranges(text: &str) -> Result<RangeExpr> {
    let mut parts = Vec::new();
    for part in text.split('|') {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::syntax(format!("empty range part in \"{text}\"")));
        }
        match part.split_once("..") {
            Some((lo, hi)) => parts.push(RangePart::new(
                parse_bound(lo.trim())?,
                parse_bound(hi.trim())?,
            )),
            None => {
                let bound = parse_bound(part)?;
                parts.push(RangePart::new(bound, bound));
            }
        }
    }
    Ok(RangeExpr::new(parts))
}

fn parse_deviate(text: &str) -> Result<DeviateKind> {
    match text {
        "add" => Ok(DeviateKind::Add),
        "replace" => Ok(DeviateKind::Replace),
        "delete" => Ok(DeviateKind::Delete),
        "not-supported" => Ok(DeviateKind::NotSupported),
        _ => Err(Error::syntax(format!("invalid deviate kind \"{text}\""))),
    }
}

fn parse_key_list(text: &str) -> Result<Vec<Arc<str>>> {
    let keys: Vec<Arc<str>> = text
        .split_whitespace()
        .map(parse_identifier)
        .collect::<Result<_>>()?;
    if keys.is_empty() {
        return Err(Error::syntax("empty key list"));
    }
    Ok(keys)
}
