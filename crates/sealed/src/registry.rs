//! The process-wide variant registry.
//!
//! Readers load an immutable [`Directory`] snapshot without locking. Writers
//! serialize per family on a family-scoped mutex, construct every member, and
//! publish the finished entry with a single read-copy-update of the directory.
//! The seen-set and family statuses live in [`Bookkeeping`], guarded by a short
//! global mutex that is never held while user code runs.

use crate::entry::Registered;
use crate::error::SealedError;
use crate::family::{Family, MemberDecl, Members, Staged};
use crate::frame;
use arc_swap::ArcSwap;
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::Mutex;
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace, warn};

type Erased = &'static (dyn Any + Send + Sync);

/// Lifecycle of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyStatus {
    /// Never attempted.
    Absent,
    /// A thread is constructing the family right now.
    Initializing,
    /// Published; all variants are reachable.
    Ready,
    /// Every attempt so far was rolled back. The next access retries.
    Failed { attempts: usize },
}

/// Published, immutable view of every ready family.
#[derive(Default, Clone)]
struct Directory {
    /// family → `&'static Registered<F>`
    entries: FxHashMap<TypeId, Erased>,
    /// family or variant → its singleton
    instances: FxHashMap<TypeId, Erased>,
    /// variant → (family, ordinal)
    ordinals: FxHashMap<TypeId, (TypeId, usize)>,
}

struct Slot {
    lock: Arc<Mutex<()>>,
    status: FamilyStatus,
    /// Rolled-back attempts so far; survives the `Initializing` phase of a retry.
    failures: usize,
}

#[derive(Default)]
struct Bookkeeping {
    slots: FxHashMap<TypeId, Slot>,
    /// variant → owning family, including families still initializing
    owners: FxHashMap<TypeId, TypeId>,
    seen: FxHashSet<TypeId>,
}

struct Registry {
    directory: ArcSwap<Directory>,
    books: Mutex<Bookkeeping>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        directory: ArcSwap::from_pointee(Directory::default()),
        books: Mutex::new(Bookkeeping::default()),
    })
}

/// Registers `F` on first use and returns its entry.
pub(crate) fn register<F: Family>() -> Result<&'static Registered<F>, SealedError> {
    if let Some(entry) = published::<F>() {
        return Ok(entry);
    }

    let id = TypeId::of::<F>();
    if frame::is_registering(id) {
        return Err(SealedError::DuplicateInitialization {
            type_name: type_name::<F>().into(),
            context: Some("family re-entered its own registration".into()),
        });
    }

    let lock = registry().family_lock(id);
    let _guard = lock.lock();

    if let Some(entry) = published::<F>() {
        trace!(family = type_name::<F>(), "Family registered by a concurrent caller");
        return Ok(entry);
    }

    let mut attempt = Attempt::<F>::new();
    match registry().begin::<F>().and_then(|()| construct::<F>(&mut attempt.touched)) {
        Ok((handle, staged)) => {
            attempt.disarm();
            Ok(registry().publish(handle, staged))
        },
        Err(err) => {
            drop(attempt);
            warn!(family = type_name::<F>(), error = %err, "Family registration rolled back");
            Err(err)
        },
    }
}

/// Rolls back a registration attempt unless it was disarmed.
///
/// Runs on error returns and on unwinding out of a panicking initializer alike.
struct Attempt<F: Family> {
    touched: Vec<TypeId>,
    armed: bool,
    family: PhantomData<fn() -> F>,
}

impl<F: Family> Attempt<F> {
    const fn new() -> Self {
        Self { touched: Vec::new(), armed: true, family: PhantomData }
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<F: Family> Drop for Attempt<F> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let attempts = registry().rollback::<F>(&self.touched);
        if std::thread::panicking() {
            warn!(family = type_name::<F>(), attempts, "Initializer panicked, family registration rolled back");
        }
    }
}

/// Builds the handle and every member. Nothing is published yet.
///
/// Every type whose seal may have been claimed is pushed to `touched` first.
fn construct<F: Family>(
    touched: &mut Vec<TypeId>,
) -> Result<(F, Vec<Box<dyn Staged<F>>>), SealedError> {
    let id = TypeId::of::<F>();
    let decls = declared_members::<F>()?;

    touched.push(id);
    let handle = {
        let frame = frame::enter(id, id, type_name::<F>(), None);
        let handle = F::init().map_err(|err| SealedError::from_init(type_name::<F>(), err))?;
        if !frame.claimed() || handle.seal().id() != id {
            return Err(SealedError::UnauthorizedConstruction {
                type_name: type_name::<F>().into(),
                context: Some("family handle did not claim its own seal".into()),
            });
        }
        handle
    };

    let mut staged = Vec::with_capacity(decls.len());
    for (ordinal, decl) in decls.iter().enumerate() {
        registry().claim_member::<F>(decl)?;
        touched.push(decl.id);

        let frame = frame::enter(id, decl.id, decl.name, Some(ordinal));
        let member = (decl.build)()?;
        if !frame.claimed() {
            return Err(SealedError::UnauthorizedConstruction {
                type_name: decl.name.into(),
                context: Some("variant did not claim its seal during init".into()),
            });
        }
        debug!(family = type_name::<F>(), member = decl.name, ordinal, "Variant constructed");
        staged.push(member);
    }

    Ok((handle, staged))
}

fn declared_members<F: Family>() -> Result<Vec<MemberDecl<F>>, SealedError> {
    let mut members = Members::new();
    F::members(&mut members);
    let decls = members.into_decls();

    if decls.is_empty() {
        return Err(SealedError::NotClosed {
            family: type_name::<F>().into(),
            message: "no members declared".into(),
            context: None,
        });
    }

    let mut unique = FxHashSet::default();
    for decl in &decls {
        if decl.id == TypeId::of::<F>() {
            return Err(SealedError::InvalidHierarchy {
                family: type_name::<F>().into(),
                message: "a family cannot be its own member".into(),
                context: None,
            });
        }
        if !unique.insert(decl.id) {
            return Err(SealedError::NotClosed {
                family: type_name::<F>().into(),
                message: format!("`{}` is declared more than once", decl.name).into(),
                context: None,
            });
        }
    }

    Ok(decls)
}

impl Registry {
    fn family_lock(&self, id: TypeId) -> Arc<Mutex<()>> {
        let mut books = self.books.lock();
        let slot = books
            .slots
            .entry(id)
            .or_insert_with(|| Slot { lock: Arc::default(), status: FamilyStatus::Absent, failures: 0 });
        Arc::clone(&slot.lock)
    }

    /// Moves the family to `Initializing` after the hierarchy checks.
    fn begin<F: Family>(&self) -> Result<(), SealedError> {
        let id = TypeId::of::<F>();
        let mut books = self.books.lock();

        if let Some(owner) = books.owners.get(&id) {
            let owner = *owner;
            return Err(SealedError::InvalidHierarchy {
                family: type_name::<F>().into(),
                message: format!("already a member of another family ({owner:?})").into(),
                context: None,
            });
        }
        if let Some(slot) = books.slots.get_mut(&id) {
            slot.status = FamilyStatus::Initializing;
        }
        Ok(())
    }

    /// Records the owner of a member about to be constructed.
    fn claim_member<F: Family>(&self, decl: &MemberDecl<F>) -> Result<(), SealedError> {
        let mut books = self.books.lock();
        if !decl.terminal || books.slots.contains_key(&decl.id) {
            return Err(SealedError::NonTerminalMember {
                family: type_name::<F>().into(),
                member: decl.name.into(),
                context: None,
            });
        }
        books.owners.insert(decl.id, TypeId::of::<F>());
        Ok(())
    }

    fn publish<F: Family>(&self, handle: F, staged: Vec<Box<dyn Staged<F>>>) -> &'static Registered<F> {
        let variants = staged.into_iter().enumerate().map(|(ordinal, s)| s.publish(ordinal)).collect();
        let entry: &'static Registered<F> = Box::leak(Box::new(Registered::new(handle, variants)));

        let id = TypeId::of::<F>();
        // Status and directory change under the same lock, so `status` never lags `values`.
        let mut books = self.books.lock();
        self.directory.rcu(|current| {
            let mut next = Directory::clone(current);
            next.entries.insert(id, entry);
            next.instances.extend(entry.instances());
            next.ordinals.extend(entry.values().iter().map(|v| (v.id(), (id, v.ordinal()))));
            next
        });
        if let Some(slot) = books.slots.get_mut(&id) {
            slot.status = FamilyStatus::Ready;
        }
        drop(books);

        info!(family = type_name::<F>(), variants = entry.len(), "Family registered");
        entry
    }

    /// Forgets everything the failed attempt recorded so a later access can retry.
    ///
    /// Returns the number of failed attempts so far.
    fn rollback<F: Family>(&self, touched: &[TypeId]) -> usize {
        let mut books = self.books.lock();
        for id in touched {
            books.seen.remove(id);
            books.owners.remove(id);
        }
        books.slots.get_mut(&TypeId::of::<F>()).map_or(0, |slot| {
            slot.failures += 1;
            slot.status = FamilyStatus::Failed { attempts: slot.failures };
            slot.failures
        })
    }
}

pub(crate) fn published<F: Family>() -> Option<&'static Registered<F>> {
    let directory = registry().directory.load();
    directory.entries.get(&TypeId::of::<F>()).copied().and_then(|entry| entry.downcast_ref::<Registered<F>>())
}

pub(crate) fn instance<T: Any>() -> Option<&'static T> {
    let directory = registry().directory.load();
    directory.instances.get(&TypeId::of::<T>()).copied().and_then(|value| value.downcast_ref::<T>())
}

pub(crate) fn ordinal(id: TypeId) -> Option<usize> {
    registry().directory.load().ordinals.get(&id).map(|&(_, ordinal)| ordinal)
}

pub(crate) fn is_family(id: TypeId) -> bool {
    registry().directory.load().entries.contains_key(&id)
}

pub(crate) fn status(id: TypeId) -> FamilyStatus {
    registry().books.lock().slots.get(&id).map_or(FamilyStatus::Absent, |slot| slot.status)
}

/// Adds `id` to the seen-set; fails if construction of it already began.
pub(crate) fn mark_seen(id: TypeId, name: &'static str) -> Result<(), SealedError> {
    if registry().books.lock().seen.insert(id) { Ok(()) } else { Err(SealedError::duplicate(name)) }
}

pub(crate) fn is_seen(id: TypeId) -> bool {
    registry().books.lock().seen.contains(&id)
}
