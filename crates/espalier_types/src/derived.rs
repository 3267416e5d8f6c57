//! Derived types as immutable base-plus-delta chains.
//!
//! A [`DerivedType`] holds only its own restriction delta and a link to
//! its base; chains are never flattened at build time. The
//! `effective_*` queries walk the chain on demand, which keeps deep
//! typedef stacks cheap to construct and share.

use std::fmt;
use std::sync::Arc;

use espalier_foundation::{Error, QName, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::builtin::Builtin;
use crate::constraint::{self, BitMember, EnumMember, Pattern, Restrictions, resolve_ranges};

/// The base of a derived type: a builtin or another derived type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeBase {
    /// A built-in primitive.
    Builtin(Builtin),
    /// A previously composed derived type (typedef chain link).
    Derived(Arc<DerivedType>),
}

impl TypeBase {
    /// The builtin at the root of the chain.
    #[must_use]
    pub fn builtin(&self) -> Builtin {
        match self {
            Self::Builtin(builtin) => *builtin,
            Self::Derived(derived) => derived.builtin(),
        }
    }
}

/// An immutable derived type: base link plus one restriction delta.
///
/// Built once during type resolution, referenced (never copied) by every
/// statement that uses it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivedType {
    name: Option<QName>,
    base: TypeBase,
    ranges: Option<Vec<(i128, i128)>>,
    length: Option<Vec<(i128, i128)>>,
    patterns: im::Vector<Pattern>,
    enums: Option<im::Vector<EnumMember>>,
    bits: Option<im::Vector<BitMember>>,
    path: Option<Arc<str>>,
    require_instance: Option<bool>,
    base_identity: Option<QName>,
}

impl DerivedType {
    /// Composes a derived type from a base and a restriction delta,
    /// validating that every restriction narrows the base.
    ///
    /// `name` is the typedef name when the composition sits under a
    /// typedef, `None` for an anonymous restriction at a use site.
    ///
    /// # Errors
    ///
    /// `Constraint` when a restriction does not apply to the base's
    /// builtin or is not a subset of the base's effective constraint.
    pub fn compose(name: Option<QName>, base: TypeBase, delta: &Restrictions) -> Result<Arc<Self>> {
        let builtin = base.builtin();

        let ranges = match &delta.range {
            None => None,
            Some(expr) => {
                if !builtin.rangeable() {
                    return Err(Error::constraint(format!(
                        "range restriction does not apply to {builtin}"
                    )));
                }
                Some(resolve_ranges(expr, &effective_ranges_of(&base))?)
            }
        };
        let length = match &delta.length {
            None => None,
            Some(expr) => {
                if builtin.length_bounds().is_none() {
                    return Err(Error::constraint(format!(
                        "length restriction does not apply to {builtin}"
                    )));
                }
                Some(resolve_ranges(expr, &effective_length_of(&base))?)
            }
        };
        if !delta.patterns.is_empty() && !builtin.patternable() {
            return Err(Error::constraint(format!(
                "pattern restriction does not apply to {builtin}"
            )));
        }
        let enums = compose_enums(&base, builtin, delta)?;
        let bits = compose_bits(&base, builtin, delta)?;
        if delta.path.is_some() && builtin != Builtin::Leafref {
            return Err(Error::constraint(format!(
                "path restriction does not apply to {builtin}"
            )));
        }
        if delta.require_instance.is_some()
            && !matches!(builtin, Builtin::Leafref | Builtin::Identityref)
        {
            return Err(Error::constraint(format!(
                "require-instance does not apply to {builtin}"
            )));
        }
        if delta.base_identity.is_some() && builtin != Builtin::Identityref {
            return Err(Error::constraint(format!(
                "base restriction does not apply to {builtin}"
            )));
        }

        Ok(Arc::new(Self {
            name,
            base,
            ranges,
            length,
            patterns: delta.patterns.iter().cloned().collect(),
            enums,
            bits,
            path: delta.path.clone(),
            require_instance: delta.require_instance,
            base_identity: delta.base_identity.clone(),
        }))
    }

    /// The typedef name, if this link sits under a typedef.
    #[must_use]
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// The immediate base of this link.
    #[must_use]
    pub fn base(&self) -> &TypeBase {
        &self.base
    }

    /// The builtin at the root of the chain.
    #[must_use]
    pub fn builtin(&self) -> Builtin {
        self.base.builtin()
    }

    /// The effective value ranges: the nearest declared restriction in
    /// the chain, or the builtin's intrinsic bounds.
    #[must_use]
    pub fn effective_ranges(&self) -> Vec<(i128, i128)> {
        match &self.ranges {
            Some(ranges) => ranges.clone(),
            None => effective_ranges_of(&self.base),
        }
    }

    /// The effective length ranges, analogous to
    /// [`effective_ranges`](Self::effective_ranges).
    #[must_use]
    pub fn effective_length(&self) -> Vec<(i128, i128)> {
        match &self.length {
            Some(length) => length.clone(),
            None => effective_length_of(&self.base),
        }
    }

    /// Every pattern in the chain, base first. All must hold
    /// (conjunctive composition).
    #[must_use]
    pub fn effective_patterns(&self) -> Vec<Pattern> {
        let mut patterns = match &self.base {
            TypeBase::Builtin(_) => Vec::new(),
            TypeBase::Derived(base) => base.effective_patterns(),
        };
        patterns.extend(self.patterns.iter().cloned());
        patterns
    }

    /// The effective enumeration members, if the chain declares any.
    #[must_use]
    pub fn effective_enums(&self) -> Option<Vec<EnumMember>> {
        match &self.enums {
            Some(members) => Some(members.iter().cloned().collect()),
            None => match &self.base {
                TypeBase::Builtin(_) => None,
                TypeBase::Derived(base) => base.effective_enums(),
            },
        }
    }

    /// The effective bit members, if the chain declares any.
    #[must_use]
    pub fn effective_bits(&self) -> Option<Vec<BitMember>> {
        match &self.bits {
            Some(members) => Some(members.iter().cloned().collect()),
            None => match &self.base {
                TypeBase::Builtin(_) => None,
                TypeBase::Derived(base) => base.effective_bits(),
            },
        }
    }

    /// The leafref target path: inherited unchanged unless redeclared.
    #[must_use]
    pub fn path_expr(&self) -> Option<Arc<str>> {
        match &self.path {
            Some(path) => Some(Arc::clone(path)),
            None => match &self.base {
                TypeBase::Builtin(_) => None,
                TypeBase::Derived(base) => base.path_expr(),
            },
        }
    }

    /// Whether a leafref target must exist: inherited from the base
    /// unless overridden here, defaulting to true when never stated
    /// anywhere in the chain.
    #[must_use]
    pub fn require_instance(&self) -> bool {
        match self.require_instance {
            Some(value) => value,
            None => match &self.base {
                TypeBase::Builtin(_) => true,
                TypeBase::Derived(base) => base.require_instance(),
            },
        }
    }

    /// The identityref base identity, inherited unless redeclared.
    #[must_use]
    pub fn base_identity(&self) -> Option<QName> {
        match &self.base_identity {
            Some(identity) => Some(identity.clone()),
            None => match &self.base {
                TypeBase::Builtin(_) => None,
                TypeBase::Derived(base) => base.base_identity(),
            },
        }
    }

    /// Returns true if an integer value satisfies the effective range.
    #[must_use]
    pub fn accepts_value(&self, value: i128) -> bool {
        constraint::parts_contain(&self.effective_ranges(), value)
    }

    /// Number of links in the chain, the builtin excluded.
    #[must_use]
    pub fn chain_depth(&self) -> usize {
        match &self.base {
            TypeBase::Builtin(_) => 1,
            TypeBase::Derived(base) => 1 + base.chain_depth(),
        }
    }
}

impl fmt::Display for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}", self.builtin()),
        }
    }
}

fn effective_ranges_of(base: &TypeBase) -> Vec<(i128, i128)> {
    match base {
        TypeBase::Builtin(builtin) => builtin
            .value_bounds()
            .map(|bounds| vec![bounds])
            .unwrap_or_default(),
        TypeBase::Derived(derived) => derived.effective_ranges(),
    }
}

fn effective_length_of(base: &TypeBase) -> Vec<(i128, i128)> {
    match base {
        TypeBase::Builtin(builtin) => builtin
            .length_bounds()
            .map(|bounds| vec![bounds])
            .unwrap_or_default(),
        TypeBase::Derived(derived) => derived.effective_length(),
    }
}

/// Composes enum members: auto-assignment at the defining link, subset
/// validation plus optional value reassignment below it.
fn compose_enums(
    base: &TypeBase,
    builtin: Builtin,
    delta: &Restrictions,
) -> Result<Option<im::Vector<EnumMember>>> {
    if delta.enums.is_empty() {
        return Ok(None);
    }
    if builtin != Builtin::Enumeration {
        return Err(Error::constraint(format!(
            "enum restriction does not apply to {builtin}"
        )));
    }
    let inherited = match base {
        TypeBase::Builtin(_) => None,
        TypeBase::Derived(derived) => derived.effective_enums(),
    };
    let mut members = im::Vector::new();
    match inherited {
        // Defining link: values are declared or auto-assigned.
        None => {
            let mut next = 0i64;
            for (name, declared) in &delta.enums {
                if members.iter().any(|m: &EnumMember| &m.name == name) {
                    return Err(Error::constraint(format!(
                        "enum member \"{name}\" declared twice"
                    )));
                }
                let value = declared.unwrap_or(next);
                next = value.saturating_add(1).max(next);
                members.push_back(EnumMember {
                    name: Arc::clone(name),
                    value,
                });
            }
        }
        // Restricting link: the set must shrink within the base's names.
        Some(base_members) => {
            for (name, declared) in &delta.enums {
                let Some(inherited) = base_members.iter().find(|m| &m.name == name) else {
                    return Err(Error::constraint(format!(
                        "enum member \"{name}\" is not defined by the base type"
                    )));
                };
                members.push_back(EnumMember {
                    name: Arc::clone(name),
                    value: declared.unwrap_or(inherited.value),
                });
            }
        }
    }
    Ok(Some(members))
}

/// Composes bit members, mirroring [`compose_enums`] with positions.
fn compose_bits(
    base: &TypeBase,
    builtin: Builtin,
    delta: &Restrictions,
) -> Result<Option<im::Vector<BitMember>>> {
    if delta.bits.is_empty() {
        return Ok(None);
    }
    if builtin != Builtin::Bits {
        return Err(Error::constraint(format!(
            "bit restriction does not apply to {builtin}"
        )));
    }
    let inherited = match base {
        TypeBase::Builtin(_) => None,
        TypeBase::Derived(derived) => derived.effective_bits(),
    };
    let mut members = im::Vector::new();
    match inherited {
        None => {
            let mut next = 0u64;
            for (name, declared) in &delta.bits {
                if members.iter().any(|m: &BitMember| &m.name == name) {
                    return Err(Error::constraint(format!(
                        "bit member \"{name}\" declared twice"
                    )));
                }
                let position = declared.unwrap_or(next);
                next = position.saturating_add(1).max(next);
                members.push_back(BitMember {
                    name: Arc::clone(name),
                    position,
                });
            }
        }
        Some(base_members) => {
            for (name, declared) in &delta.bits {
                let Some(inherited) = base_members.iter().find(|m| &m.name == name) else {
                    return Err(Error::constraint(format!(
                        "bit member \"{name}\" is not defined by the base type"
                    )));
                };
                members.push_back(BitMember {
                    name: Arc::clone(name),
                    position: declared.unwrap_or(inherited.position),
                });
            }
        }
    }
    Ok(Some(members))
}
