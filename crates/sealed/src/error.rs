//! # Registry Errors
//!
//! This module defines the [`SealedError`] enum reported by family registration,
//! seal claims and lookups. Every error is a contract violation surfaced
//! synchronously to the caller that triggered it.

use std::borrow::Cow;

/// The error type member and family initializers may return.
///
/// Any `std::error::Error + Send + Sync` converts into it with `?`, including
/// [`SealedError`] itself; the registry unwraps the latter instead of wrapping it.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the variant registry.
#[sealed_derive::sealed_error]
pub enum SealedError {
    /// The family does not declare a valid closed member set.
    #[error("Family `{family}` is not closed{}: {message}", format_context(.context))]
    NotClosed {
        family: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// The family is nested inside another family, or lists itself.
    #[error("Invalid hierarchy for `{family}`{}: {message}", format_context(.context))]
    InvalidHierarchy {
        family: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A seal was requested outside the registry's construction path.
    #[error("Unauthorized construction of `{type_name}`{}", format_context(.context))]
    UnauthorizedConstruction { type_name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The type claiming a seal is not the one being constructed.
    #[error("Type mismatch{}: expected `{expected}`, found `{found}`", format_context(.context))]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A declared member is itself a family.
    #[error("Member `{member}` of `{family}` is not terminal{}", format_context(.context))]
    NonTerminalMember {
        family: Cow<'static, str>,
        member: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A member or family initializer failed.
    #[error("Failed to construct `{member}`{}: {source}", format_context(.context))]
    MemberConstructionFailure {
        member: Cow<'static, str>,
        source: InitError,
        context: Option<Cow<'static, str>>,
    },

    /// The type has already begun construction once.
    #[error("Attempting to initialize `{type_name}` more than once{}", format_context(.context))]
    DuplicateInitialization { type_name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The type was never successfully registered.
    #[error("`{type_name}` is not registered{}", format_context(.context))]
    UnregisteredLookup { type_name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Singletons cannot be duplicated.
    #[error("`{type_name}` is a singleton and cannot be cloned{}", format_context(.context))]
    CloneAttempt { type_name: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl SealedError {
    pub(crate) fn duplicate(type_name: &'static str) -> Self {
        Self::DuplicateInitialization { type_name: type_name.into(), context: None }
    }

    pub(crate) fn unregistered(type_name: &'static str) -> Self {
        Self::UnregisteredLookup { type_name: type_name.into(), context: None }
    }

    /// Unwraps a registry error raised inside an initializer, wraps anything else.
    pub(crate) fn from_init(member: &'static str, err: InitError) -> Self {
        match err.downcast::<Self>() {
            Ok(sealed) => *sealed,
            Err(source) => {
                Self::MemberConstructionFailure { member: member.into(), source, context: None }
            },
        }
    }
}
