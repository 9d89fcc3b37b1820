//! # Sealed Enum
//!
//! Enumerations whose members are full types rather than enum variants.
//!
//! ## Overview
//!
//! A *family* declares a closed, ordered list of *variant* types. The first access
//! registers the family: its handle and every variant are constructed exactly once,
//! each variant gets a dense ordinal in declaration order, and the result is
//! published process-wide. Every later access is a lock-free read.
//!
//! ## Features
//!
//! * **Singletons**: One instance per family and per variant, handed out as `&'static`.
//! * **Ordinals**: Dense, zero-based, equal to declaration order.
//! * **Sealed construction**: A [`Seal`] is only issued while the registry runs an
//!   initializer, so no code path outside the registry can build a member.
//! * **All or nothing**: A failing initializer rolls back the whole family.
//! * **Thread-safe**: Double-checked locking per family, `arc-swap` snapshots for reads.
//!
//! # Example
//!
//! ```rust
//! use sealed_enum::{Family, Seal, SealedError, Variant};
//!
//! pub trait Direction: Send + Sync {
//!     fn arrow(&self) -> char;
//! }
//!
//! #[derive(Family)]
//! #[family(member = dyn Direction, variants(Left, Right))]
//! pub struct Compass {
//!     seal: Seal<Self>,
//! }
//!
//! #[derive(Variant)]
//! #[variant(family = Compass)]
//! pub struct Left {
//!     seal: Seal<Compass>,
//! }
//!
//! #[derive(Variant)]
//! #[variant(family = Compass)]
//! pub struct Right {
//!     seal: Seal<Compass>,
//! }
//!
//! impl Direction for Left {
//!     fn arrow(&self) -> char { '<' }
//! }
//!
//! impl Direction for Right {
//!     fn arrow(&self) -> char { '>' }
//! }
//!
//! fn main() -> Result<(), SealedError> {
//!     let compass = sealed_enum::family::<Compass>()?;
//!     let arrows: String = compass.values().iter().map(|v| v.arrow()).collect();
//!     assert_eq!(arrows, "<>");
//!
//!     assert_eq!(sealed_enum::ordinal::<Right>()?, 1);
//!     assert!(std::ptr::eq(compass.get::<Left>()?, sealed_enum::lookup::<Left>()?));
//!
//!     // Nothing outside the registry can build another member.
//!     assert!(Left::init().is_err());
//!     Ok(())
//! }
//! ```

#[cfg(test)]
extern crate self as sealed_enum;

mod entry;
mod error;
mod family;
mod frame;
mod registry;
mod seal;

pub use entry::{Registered, VariantRef};
pub use error::{InitError, SealedError, SealedErrorExt, SealedErrorKind};
pub use family::{Family, Members, Variant};
pub use registry::FamilyStatus;
pub use seal::Seal;
pub use sealed_derive::{Family, Variant};

use std::any::{Any, TypeId, type_name};

/// Returns the registry entry of `F`, registering the family on first use.
///
/// # Errors
/// Any [`SealedError`] raised while validating the declaration or running an
/// initializer. The family is rolled back and the next call retries.
pub fn family<F: Family>() -> Result<&'static Registered<F>, SealedError> {
    registry::register::<F>()
}

/// All variants of a registered family, in ordinal order.
///
/// # Errors
/// [`SealedError::UnregisteredLookup`] if `F` has not been registered yet.
pub fn values<F: Family>() -> Result<&'static [VariantRef<F>], SealedError> {
    registry::published::<F>()
        .map(Registered::values)
        .ok_or_else(|| SealedError::unregistered(type_name::<F>()))
}

/// Ordinal of the variant `V` within its registered family.
///
/// # Errors
/// [`SealedError::UnregisteredLookup`] if the family of `V` has not been registered.
pub fn ordinal<V: Variant>() -> Result<usize, SealedError> {
    registry::ordinal(TypeId::of::<V>()).ok_or_else(|| SealedError::unregistered(type_name::<V>()))
}

/// Resolves a registered family handle or variant to its singleton.
///
/// # Errors
/// [`SealedError::UnregisteredLookup`] if `T` is not part of any registered family.
pub fn lookup<T: Any>() -> Result<&'static T, SealedError> {
    registry::instance::<T>().ok_or_else(|| SealedError::unregistered(type_name::<T>()))
}

/// Whether `T` is the handle type of a registered family.
#[must_use]
pub fn is_family<T: Any>() -> bool {
    registry::is_family(TypeId::of::<T>())
}

/// Registration status of `F`.
#[must_use]
pub fn status<F: Family>() -> FamilyStatus {
    registry::status(TypeId::of::<F>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Family)]
    #[family(variants(Only))]
    struct Solo {
        seal: Seal<Self>,
    }

    #[derive(Variant)]
    #[variant(family = Solo)]
    struct Only {
        seal: Seal<Solo>,
        hits: u32,
    }

    #[derive(Family)]
    #[family(variants(Never))]
    struct Untouched {
        seal: Seal<Self>,
    }

    #[derive(Variant)]
    #[variant(family = Untouched)]
    struct Never {
        seal: Seal<Untouched>,
    }

    #[test]
    fn registers_single_member_family() {
        let solo = family::<Solo>().unwrap();
        assert_eq!(solo.len(), 1);
        assert_eq!(solo.get::<Only>().unwrap().hits, 0);
        assert_eq!(solo.seal().ordinal(), None);
        assert_eq!(solo.get::<Only>().unwrap().seal().ordinal(), Some(0));
        assert_eq!(status::<Solo>(), FamilyStatus::Ready);
        assert!(is_family::<Solo>());
        assert!(!is_family::<Only>());
    }

    #[test]
    fn untouched_family_is_absent() {
        assert_eq!(status::<Untouched>(), FamilyStatus::Absent);
        assert_eq!(values::<Untouched>().unwrap_err().kind(), SealedErrorKind::UnregisteredLookup);
        assert_eq!(ordinal::<Never>().unwrap_err().kind(), SealedErrorKind::UnregisteredLookup);
        assert!(lookup::<Never>().is_err());
    }
}
