//! Constraint values and the interval algebra behind range composition.

use std::sync::Arc;

use espalier_foundation::{Error, QName, RangeBound, RangeExpr, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A pattern constraint: expression text plus polarity.
///
/// The engine never executes patterns; it only composes them. Matching
/// belongs to the data validators downstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    /// The pattern expression, kept verbatim.
    pub text: Arc<str>,
    /// When true, values must NOT match the expression.
    pub invert: bool,
}

impl Pattern {
    /// Creates a regular (must-match) pattern.
    pub fn of(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            invert: false,
        }
    }

    /// Creates an inverted (must-not-match) pattern.
    pub fn inverted(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            invert: true,
        }
    }
}

/// One named member of an enumeration, with its resolved value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumMember {
    /// Member name.
    pub name: Arc<str>,
    /// Resolved numeric value.
    pub value: i64,
}

/// One named member of a bits type, with its resolved position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitMember {
    /// Member name.
    pub name: Arc<str>,
    /// Resolved bit position.
    pub position: u64,
}

/// The restriction delta gathered from one `type` statement's
/// substatements, not yet checked against a base.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Restrictions {
    /// `range` restriction, if declared.
    pub range: Option<RangeExpr>,
    /// `length` restriction, if declared.
    pub length: Option<RangeExpr>,
    /// Declared patterns, in order.
    pub patterns: Vec<Pattern>,
    /// Declared enum members; `None` value means "inherit or auto-assign".
    pub enums: Vec<(Arc<str>, Option<i64>)>,
    /// Declared bit members; `None` position means "inherit or
    /// auto-assign".
    pub bits: Vec<(Arc<str>, Option<u64>)>,
    /// Declared leafref target path.
    pub path: Option<Arc<str>>,
    /// Declared `require-instance` override.
    pub require_instance: Option<bool>,
    /// Declared identityref base.
    pub base_identity: Option<QName>,
}

impl Restrictions {
    /// Returns true if no restriction was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Resolves a range expression against the base's effective parts and
/// validates the subset relation.
///
/// `min`/`max` resolve to the base's own boundaries. Parts must be
/// well-formed (`lo <= hi`), strictly ascending and disjoint, and each
/// must fall within some single part of the base.
///
/// # Errors
///
/// `Constraint` on any violation.
pub fn resolve_ranges(expr: &RangeExpr, base: &[(i128, i128)]) -> Result<Vec<(i128, i128)>> {
    debug_assert!(!base.is_empty(), "base range set is never empty");
    let base_min = base[0].0;
    let base_max = base[base.len() - 1].1;
    let value = |bound: RangeBound| match bound {
        RangeBound::Min => base_min,
        RangeBound::Max => base_max,
        RangeBound::Value(v) => v,
    };

    let mut resolved = Vec::with_capacity(expr.parts.len());
    for part in &expr.parts {
        let (lo, hi) = (value(part.lo), value(part.hi));
        if lo > hi {
            return Err(Error::constraint(format!(
                "range part {lo}..{hi} is empty"
            )));
        }
        if let Some(&(_, prev_hi)) = resolved.last() {
            if lo <= prev_hi {
                return Err(Error::constraint(format!(
                    "range part {lo}..{hi} overlaps or is out of order"
                )));
            }
        }
        if !base.iter().any(|&(b_lo, b_hi)| lo >= b_lo && hi <= b_hi) {
            return Err(Error::constraint(format!(
                "range part {lo}..{hi} is not within the base range {}",
                display_parts(base)
            )));
        }
        resolved.push((lo, hi));
    }
    if resolved.is_empty() {
        return Err(Error::constraint("empty range expression"));
    }
    Ok(resolved)
}

/// Returns true if `value` falls in one of the parts.
#[must_use]
pub fn parts_contain(parts: &[(i128, i128)], value: i128) -> bool {
    parts.iter().any(|&(lo, hi)| value >= lo && value <= hi)
}

/// Formats parts the way range arguments are written.
#[must_use]
pub fn display_parts(parts: &[(i128, i128)]) -> String {
    parts
        .iter()
        .map(|&(lo, hi)| {
            if lo == hi {
                format!("{lo}")
            } else {
                format!("{lo}..{hi}")
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
