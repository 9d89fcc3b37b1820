use crate::error::SealedError;
use crate::family::{Family, Variant};
use crate::seal::short_name;
use fxhash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// A published variant: its ordinal, its identity and its member view.
///
/// Cheap to copy; copying the reference never duplicates the singleton.
/// Equality is identity, ordering follows declaration order.
pub struct VariantRef<F: Family> {
    ordinal: usize,
    name: &'static str,
    id: TypeId,
    member: &'static F::Member,
    any: &'static (dyn Any + Send + Sync),
}

impl<F: Family> VariantRef<F> {
    pub(crate) fn new<V: Variant<Family = F>>(ordinal: usize, value: &'static V) -> Self {
        Self { ordinal, name: type_name::<V>(), id: TypeId::of::<V>(), member: value.upcast(), any: value }
    }

    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Fully qualified type name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The singleton through the family's member view.
    #[must_use]
    pub const fn member(&self) -> &'static F::Member {
        self.member
    }

    #[must_use]
    pub fn is<V: Variant<Family = F>>(&self) -> bool {
        self.id == TypeId::of::<V>()
    }

    /// The concrete singleton, if this is `V`.
    #[must_use]
    pub fn downcast<V: Variant<Family = F>>(&self) -> Option<&'static V> {
        self.any.downcast_ref::<V>()
    }

    /// Orders against a possibly absent counterpart; present values sort first.
    #[must_use]
    pub fn cmp_present(&self, other: Option<&Self>) -> Ordering {
        other.map_or(Ordering::Less, |other| self.cmp(other))
    }

    fn address(&self) -> *const () {
        std::ptr::from_ref(self.any).cast::<()>()
    }
}

impl<F: Family> Clone for VariantRef<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Family> Copy for VariantRef<F> {}

impl<F: Family> Deref for VariantRef<F> {
    type Target = F::Member;

    fn deref(&self) -> &Self::Target {
        self.member
    }
}

impl<F: Family> PartialEq for VariantRef<F> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.address(), other.address())
    }
}

impl<F: Family> Eq for VariantRef<F> {}

impl<F: Family> PartialOrd for VariantRef<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Family> Ord for VariantRef<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl<F: Family> Hash for VariantRef<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<F: Family> fmt::Debug for VariantRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRef").field("type", &self.name).field("ordinal", &self.ordinal).finish()
    }
}

impl<F: Family> fmt::Display for VariantRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_name(self.name))
    }
}

/// The registry entry of a ready family.
///
/// Holds the family handle, the ordered variants and the ordinal table.
/// Dereferences to the family handle.
pub struct Registered<F: Family> {
    handle: F,
    variants: Box<[VariantRef<F>]>,
    ordinals: FxHashMap<TypeId, usize>,
}

impl<F: Family> Registered<F> {
    pub(crate) fn new(handle: F, variants: Vec<VariantRef<F>>) -> Self {
        let ordinals = variants.iter().map(|v| (v.id, v.ordinal)).collect();
        Self { handle, variants: variants.into_boxed_slice(), ordinals }
    }

    #[must_use]
    pub const fn handle(&self) -> &F {
        &self.handle
    }

    /// All variants, in ordinal order.
    #[must_use]
    pub fn values(&'static self) -> &'static [VariantRef<F>] {
        &self.variants
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        type_name::<F>()
    }

    pub fn iter(&'static self) -> std::slice::Iter<'static, VariantRef<F>> {
        self.variants.iter()
    }

    /// The variant at `ordinal`.
    #[must_use]
    pub fn at(&self, ordinal: usize) -> Option<VariantRef<F>> {
        self.variants.get(ordinal).copied()
    }

    /// The published reference of `V`.
    ///
    /// # Errors
    /// [`SealedError::UnregisteredLookup`] if `V` is not a declared member of `F`.
    pub fn variant<V: Variant<Family = F>>(&self) -> Result<VariantRef<F>, SealedError> {
        self.ordinals
            .get(&TypeId::of::<V>())
            .and_then(|&ordinal| self.at(ordinal))
            .ok_or_else(|| SealedError::unregistered(type_name::<V>()))
    }

    /// # Errors
    /// [`SealedError::UnregisteredLookup`] if `V` is not a declared member of `F`.
    pub fn ordinal_of<V: Variant<Family = F>>(&self) -> Result<usize, SealedError> {
        self.variant::<V>().map(|v| v.ordinal)
    }

    /// Typed access to the singleton of `V`.
    ///
    /// # Errors
    /// [`SealedError::UnregisteredLookup`] if `V` is not a declared member of `F`.
    pub fn get<V: Variant<Family = F>>(&'static self) -> Result<&'static V, SealedError> {
        self.instance::<V>()
    }

    /// Resolves the family type or any of its members to its singleton.
    ///
    /// # Errors
    /// * [`SealedError::TypeMismatch`] if `T` is neither `F` nor one of its members.
    pub fn instance<T: Any>(&'static self) -> Result<&'static T, SealedError> {
        if let Some(handle) = (&self.handle as &dyn Any).downcast_ref::<T>() {
            return Ok(handle);
        }
        self.ordinals
            .get(&TypeId::of::<T>())
            .and_then(|&ordinal| self.variants[ordinal].any.downcast_ref::<T>())
            .ok_or_else(|| SealedError::TypeMismatch {
                expected: format!("a member of {}", type_name::<F>()).into(),
                found: type_name::<T>().into(),
                context: None,
            })
    }

    pub(crate) fn instances(&'static self) -> impl Iterator<Item = (TypeId, &'static (dyn Any + Send + Sync))> {
        let handle: &'static (dyn Any + Send + Sync) = &self.handle;
        std::iter::once((TypeId::of::<F>(), handle)).chain(self.variants.iter().map(|v| (v.id, v.any)))
    }
}

impl<F: Family> Deref for Registered<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.handle
    }
}

impl<F: Family> IntoIterator for &'static Registered<F> {
    type Item = &'static VariantRef<F>;
    type IntoIter = std::slice::Iter<'static, VariantRef<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

impl<F: Family> fmt::Debug for Registered<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("family", &type_name::<F>())
            .field("variants", &self.variants)
            .finish()
    }
}

impl<F: Family> fmt::Display for Registered<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.variants.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(v, f)?;
        }
        f.write_str("]")
    }
}
