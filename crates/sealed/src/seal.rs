use crate::error::SealedError;
use crate::family::{Family, Variant};
use crate::frame::{self, Claim};
use crate::registry;
use std::any::{TypeId, type_name};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Proof that a value was constructed by the registry.
///
/// A `Seal` is the only way to build a family handle or a variant: it is claimed
/// from inside the initializer the registry is currently running, and it cannot be
/// cloned or copied, so no sealed type can derive `Clone` either.
///
/// Seals compare by ordinal. A family handle's seal has no ordinal and sorts first.
pub struct Seal<F: Family> {
    target: TypeId,
    name: &'static str,
    ordinal: Option<usize>,
    _family: PhantomData<fn() -> F>,
}

impl<F: Family> Seal<F> {
    /// Claims the seal of the family handle `F`.
    ///
    /// # Errors
    /// * [`SealedError::UnauthorizedConstruction`] outside of [`family`](crate::family).
    /// * [`SealedError::DuplicateInitialization`] if `F` was already constructed.
    /// * [`SealedError::TypeMismatch`] if the registry is constructing another type.
    pub fn family() -> Result<Self, SealedError> {
        Self::claim(TypeId::of::<F>(), type_name::<F>())
    }

    /// Claims the seal of the variant `V`.
    ///
    /// # Errors
    /// Same as [`Seal::family`], for the variant type.
    pub fn new<V: Variant<Family = F>>() -> Result<Self, SealedError> {
        Self::claim(TypeId::of::<V>(), type_name::<V>())
    }

    fn claim(target: TypeId, name: &'static str) -> Result<Self, SealedError> {
        match frame::claim(TypeId::of::<F>(), target) {
            Claim::Granted { ordinal } => {
                registry::mark_seen(target, name)?;
                Ok(Self { target, name, ordinal, _family: PhantomData })
            },
            Claim::Mismatch { expected } => Err(SealedError::TypeMismatch {
                expected: expected.into(),
                found: name.into(),
                context: None,
            }),
            Claim::Outside if registry::is_seen(target) => Err(SealedError::duplicate(name)),
            Claim::Outside => Err(SealedError::UnauthorizedConstruction {
                type_name: name.into(),
                context: Some("seals are only issued while the registry constructs a family".into()),
            }),
        }
    }

    /// Dense, zero-based position of the variant; `None` for a family handle.
    #[must_use]
    pub const fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    #[must_use]
    pub const fn is_family(&self) -> bool {
        self.ordinal.is_none()
    }

    /// Identity of the sealed type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.target
    }

    /// Fully qualified name of the sealed type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    /// Sealed values are process-wide singletons and can never be duplicated.
    ///
    /// # Errors
    /// Always returns [`SealedError::CloneAttempt`].
    pub fn try_clone(&self) -> Result<Self, SealedError> {
        Err(SealedError::CloneAttempt { type_name: self.name.into(), context: None })
    }
}

impl<F: Family> fmt::Debug for Seal<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seal")
            .field("family", &type_name::<F>())
            .field("type", &self.name)
            .field("ordinal", &self.ordinal)
            .finish()
    }
}

impl<F: Family> fmt::Display for Seal<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_family() {
            write!(f, "Base<{}>", short_name(self.name))
        } else {
            f.write_str(short_name(self.name))
        }
    }
}

impl<F: Family> PartialEq for Seal<F> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl<F: Family> Eq for Seal<F> {}

impl<F: Family> PartialOrd for Seal<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Family> Ord for Seal<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl<F: Family> Hash for Seal<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

/// Strips the module path, keeping generic arguments intact.
pub(crate) fn short_name(name: &'static str) -> &'static str {
    let head = name.find('<').map_or(name, |i| &name[..i]);
    head.rfind("::").map_or(name, |i| &name[i + 2..])
}
