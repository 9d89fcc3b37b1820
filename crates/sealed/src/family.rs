use crate::entry::VariantRef;
use crate::error::{InitError, SealedError};
use crate::seal::Seal;
use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A closed family of singleton variants.
///
/// Usually derived with `#[derive(Family)]`. The handle itself is a singleton too:
/// the registry builds it through [`Family::init`] before any member.
///
/// A family cannot be listed as a member of another family. A type that
/// implements both traits must say so with [`Variant::TERMINAL`]; otherwise the
/// clash is only caught once the type has been registered as a family.
pub trait Family: Any + Send + Sync + Sized {
    /// Shared view of every member, typically a `dyn Trait`.
    type Member: ?Sized + Send + Sync + 'static;

    /// Zero-argument initializer of the family handle.
    ///
    /// Must obtain its seal through [`Seal::family`].
    ///
    /// # Errors
    /// Any error aborts the registration of the whole family.
    fn init() -> Result<Self, InitError>;

    fn seal(&self) -> &Seal<Self>;

    /// Declares the closed member list, in ordinal order.
    fn members(members: &mut Members<Self>);
}

/// One member of a [`Family`].
///
/// Usually derived with `#[derive(Variant)]`.
pub trait Variant: Any + Send + Sync + Sized {
    type Family: Family;

    /// `false` for a type that is also a [`Family`]. Listing such a type as a
    /// member fails with [`SealedError::NonTerminalMember`].
    const TERMINAL: bool = true;

    /// Zero-argument initializer, run exactly once by the registry.
    ///
    /// Must obtain its seal through [`Seal::new`].
    ///
    /// # Errors
    /// Any error rolls back the registration of the whole family.
    fn init() -> Result<Self, InitError>;

    fn seal(&self) -> &Seal<Self::Family>;

    /// Views the published singleton through the family's member type.
    fn upcast(&'static self) -> &'static <Self::Family as Family>::Member;
}

/// Builder for a family's closed member list.
pub struct Members<F: Family> {
    decls: Vec<MemberDecl<F>>,
}

impl<F: Family> Members<F> {
    pub(crate) const fn new() -> Self {
        Self { decls: Vec::new() }
    }

    /// Appends `V`; its ordinal is its position in the list.
    pub fn add<V: Variant<Family = F>>(&mut self) -> &mut Self {
        self.decls.push(MemberDecl {
            id: TypeId::of::<V>(),
            name: type_name::<V>(),
            terminal: V::TERMINAL,
            build: build_member::<V>,
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub(crate) fn into_decls(self) -> Vec<MemberDecl<F>> {
        self.decls
    }
}

impl<F: Family> fmt::Debug for Members<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.decls.iter().map(|d| d.name)).finish()
    }
}

pub(crate) struct MemberDecl<F: Family> {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) terminal: bool,
    pub(crate) build: fn() -> Result<Box<dyn Staged<F>>, SealedError>,
}

/// A constructed member waiting for the rest of its family.
pub(crate) trait Staged<F: Family>: Send {
    /// Leaks the member and returns its published reference.
    fn publish(self: Box<Self>, ordinal: usize) -> VariantRef<F>;
}

struct StagedMember<V>(Box<V>);

impl<V: Variant> Staged<V::Family> for StagedMember<V> {
    fn publish(self: Box<Self>, ordinal: usize) -> VariantRef<V::Family> {
        let member: &'static V = Box::leak(self.0);
        VariantRef::new(ordinal, member)
    }
}

fn build_member<V: Variant>() -> Result<Box<dyn Staged<V::Family>>, SealedError> {
    let member = V::init().map_err(|err| SealedError::from_init(type_name::<V>(), err))?;

    let seal = member.seal();
    if seal.id() != TypeId::of::<V>() || seal.is_family() {
        return Err(SealedError::TypeMismatch {
            expected: type_name::<V>().into(),
            found: seal.type_name().into(),
            context: Some("variant returned a seal issued to another type".into()),
        });
    }

    Ok(Box::new(StagedMember(Box::new(member))))
}
