#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the sealed-enum workspace.
//! This crate provides the derives that declare a closed family and its variants,
//! and the attribute macro every crate in the workspace uses for its error enum.
//!
//! ## Usage
//! Depend on `sealed-enum`, which re-exports [`Family`](macro@Family) and
//! [`Variant`](macro@Variant). Use `sealed-derive` directly only for [`sealed_error`].
//!
//! See each macro's docstring for examples; they are `ignore`d to avoid compiling in this crate,
//! but are exercised by the `tests/ui` cases.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `sealed_enum::Family` for a family handle struct.
///
/// The struct must have named fields, exactly one of which is a `Seal<Self>`.
/// Every other field is filled with `Default::default()` unless an explicit
/// initializer is supplied.
///
/// # Arguments
///
/// * `variants(A, B, ...)` - The closed member list, in ordinal order. Required.
/// * `member = dyn Trait` - The shared view of every member. Defaults to
///   `dyn Any + Send + Sync`.
/// * `init = path` - A function `fn(Seal<Self>) -> Result<Self, E>` used instead
///   of the default field initialization.
///
/// # Example
///
/// ```rust,ignore
/// use sealed_enum::{Family, Seal, Variant};
///
/// pub trait Stage: Send + Sync {}
///
/// #[derive(Family)]
/// #[family(member = dyn Stage, variants(End, Start))]
/// pub struct Pipeline {
///     seal: Seal<Self>,
/// }
/// ```
#[proc_macro_derive(Family, attributes(family))]
pub fn derive_family(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::family::expand_derive(input).into()
}

/// Derives `sealed_enum::Variant` for one member of a family.
///
/// The struct must have named fields, exactly one of which is a `Seal<Family>`.
///
/// # Arguments
///
/// * `family = Path` - The owning family. Required.
/// * `init = path` - A function `fn(Seal<Family>) -> Result<Self, E>` used instead
///   of the default field initialization.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Variant)]
/// #[variant(family = Pipeline)]
/// pub struct Start {
///     seal: Seal<Pipeline>,
/// }
///
/// impl Stage for Start {}
/// ```
#[proc_macro_derive(Variant, attributes(variant))]
pub fn derive_variant(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::variant::expand_derive(input).into()
}

/// A high-level attribute macro for defining error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants made of exactly a
///   `source` and a `context` field, enabling the `?` operator for upstream errors.
/// * **Kinds**: Generates a fieldless `...Kind` enum mirroring the variants and a
///   `kind()` accessor, so callers can match on the failure class alone.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. A `context` field must have type `Option<Cow<'static, str>>`.
/// 3. Variants carrying a `source` must also carry a `context`.
///
/// # Example
///
/// ```rust,ignore
/// use sealed_derive::sealed_error;
/// use std::borrow::Cow;
///
/// #[sealed_error]
/// pub enum LoaderError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// assert_eq!(LoaderError::from("boom").kind(), LoaderErrorKind::Internal);
/// ```
#[proc_macro_attribute]
pub fn sealed_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
