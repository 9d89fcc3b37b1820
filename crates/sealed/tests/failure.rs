use sealed_enum::{Family, FamilyStatus, InitError, Members, Seal, SealedError, SealedErrorKind, Variant};
use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("sensor offline")]
struct SensorOffline;

static BROKEN: AtomicBool = AtomicBool::new(true);
static FRAGILE_RUNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Family)]
#[family(variants(Steady, Fragile))]
struct Flaky {
    seal: Seal<Self>,
}

#[derive(Debug, Variant)]
#[variant(family = Flaky)]
struct Steady {
    seal: Seal<Flaky>,
}

#[derive(Variant)]
#[variant(family = Flaky, init = fragile)]
struct Fragile {
    seal: Seal<Flaky>,
}

fn fragile(seal: Seal<Flaky>) -> Result<Fragile, SensorOffline> {
    FRAGILE_RUNS.fetch_add(1, Ordering::SeqCst);
    if BROKEN.load(Ordering::SeqCst) { Err(SensorOffline) } else { Ok(Fragile { seal }) }
}

#[test]
fn test_failed_member_rolls_back_whole_family() {
    let err = sealed_enum::family::<Flaky>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::MemberConstructionFailure);
    assert!(err.to_string().contains("Fragile"));
    assert!(err.to_string().ends_with("sensor offline"));
    assert_eq!(sealed_enum::status::<Flaky>(), FamilyStatus::Failed { attempts: 1 });

    // Steady was built and dropped: nothing of the family is reachable.
    assert!(sealed_enum::lookup::<Steady>().is_err());
    assert!(sealed_enum::lookup::<Flaky>().is_err());
    assert!(sealed_enum::values::<Flaky>().is_err());
    assert!(!sealed_enum::is_family::<Flaky>());

    // Seen markers were cleared, so direct construction is unauthorized, not a duplicate.
    let err = Steady::init().unwrap_err().downcast::<SealedError>().unwrap();
    assert_eq!(err.kind(), SealedErrorKind::UnauthorizedConstruction);

    assert!(sealed_enum::family::<Flaky>().is_err());
    assert_eq!(sealed_enum::status::<Flaky>(), FamilyStatus::Failed { attempts: 2 });

    BROKEN.store(false, Ordering::SeqCst);
    let flaky = sealed_enum::family::<Flaky>().unwrap();
    assert_eq!(flaky.len(), 2);
    assert_eq!(sealed_enum::ordinal::<Fragile>().unwrap(), 1);
    assert_eq!(sealed_enum::status::<Flaky>(), FamilyStatus::Ready);
    assert_eq!(FRAGILE_RUNS.load(Ordering::SeqCst), 3);
}

#[derive(Family)]
#[family(variants(Twin, Twin))]
struct Mirror {
    seal: Seal<Self>,
}

#[derive(Variant)]
#[variant(family = Mirror)]
struct Twin {
    seal: Seal<Mirror>,
}

#[test]
fn test_repeated_member_is_not_closed() {
    let err = sealed_enum::family::<Mirror>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::NotClosed);
    assert_eq!(sealed_enum::status::<Mirror>(), FamilyStatus::Failed { attempts: 1 });
}

struct Hollow {
    seal: Seal<Self>,
}

impl Family for Hollow {
    type Member = dyn Any + Send + Sync;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::family()? })
    }

    fn seal(&self) -> &Seal<Self> {
        &self.seal
    }

    fn members(_: &mut Members<Self>) {}
}

#[test]
fn test_empty_family_is_not_closed() {
    let err = sealed_enum::family::<Hollow>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::NotClosed);
    assert!(err.to_string().contains("no members declared"));
}

/// Lists itself as its only member.
struct Ouroboros {
    seal: Seal<Self>,
}

impl Family for Ouroboros {
    type Member = dyn Any + Send + Sync;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::family()? })
    }

    fn seal(&self) -> &Seal<Self> {
        &self.seal
    }

    fn members(members: &mut Members<Self>) {
        members.add::<Self>();
    }
}

impl Variant for Ouroboros {
    type Family = Self;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::new::<Self>()? })
    }

    fn seal(&self) -> &Seal<Self> {
        &self.seal
    }

    fn upcast(&'static self) -> &'static (dyn Any + Send + Sync) {
        self
    }
}

#[test]
fn test_self_listing_family_is_invalid() {
    let err = sealed_enum::family::<Ouroboros>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::InvalidHierarchy);
}

#[derive(Family)]
#[family(variants(Inner))]
struct Outer {
    seal: Seal<Self>,
}

/// A member of `Outer` that also claims to be a family.
struct Inner {
    seal: Seal<Outer>,
}

impl Variant for Inner {
    type Family = Outer;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::new::<Self>()? })
    }

    fn seal(&self) -> &Seal<Outer> {
        &self.seal
    }

    fn upcast(&'static self) -> &'static (dyn Any + Send + Sync) {
        self
    }
}

impl Family for Inner {
    type Member = dyn Any + Send + Sync;

    fn init() -> Result<Self, InitError> {
        Err("a member cannot be a family handle".into())
    }

    fn seal(&self) -> &Seal<Self> {
        unreachable!("never constructed as a family")
    }

    fn members(members: &mut Members<Self>) {
        members.add::<Leaf>();
    }
}

#[derive(Variant)]
#[variant(family = Inner)]
struct Leaf {
    seal: Seal<Inner>,
}

#[test]
fn test_member_cannot_become_family() {
    sealed_enum::family::<Outer>().unwrap();

    let err = sealed_enum::family::<Inner>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::InvalidHierarchy);
    assert!(sealed_enum::lookup::<Inner>().is_ok());
}

#[derive(Family)]
#[family(variants(Nested))]
struct Host {
    seal: Seal<Self>,
}

/// A family first, later listed as a member of `Host`.
struct Nested {
    seal: Seal<Host>,
}

impl Family for Nested {
    type Member = dyn Any + Send + Sync;

    fn init() -> Result<Self, InitError> {
        Err("nested families are never built".into())
    }

    fn seal(&self) -> &Seal<Self> {
        unreachable!("never constructed as a family")
    }

    fn members(_: &mut Members<Self>) {}
}

impl Variant for Nested {
    type Family = Host;

    const TERMINAL: bool = false;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::new::<Self>()? })
    }

    fn seal(&self) -> &Seal<Host> {
        &self.seal
    }

    fn upcast(&'static self) -> &'static (dyn Any + Send + Sync) {
        self
    }
}

#[test]
fn test_family_member_is_not_terminal() {
    assert_eq!(sealed_enum::family::<Nested>().unwrap_err().kind(), SealedErrorKind::NotClosed);

    let err = sealed_enum::family::<Host>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::NonTerminalMember);
    assert!(sealed_enum::lookup::<Nested>().is_err());
}

#[derive(Family)]
#[family(variants(Impostor, Honest))]
struct Masquerade {
    seal: Seal<Self>,
}

#[derive(Variant)]
#[variant(family = Masquerade, init = impersonate)]
struct Impostor {
    seal: Seal<Masquerade>,
}

#[derive(Variant)]
#[variant(family = Masquerade)]
struct Honest {
    seal: Seal<Masquerade>,
}

fn impersonate(_own: Seal<Masquerade>) -> Result<Impostor, SealedError> {
    Ok(Impostor { seal: Seal::new::<Honest>()? })
}

#[test]
fn test_foreign_seal_claim_is_a_mismatch() {
    let err = sealed_enum::family::<Masquerade>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::TypeMismatch);
    assert_eq!(sealed_enum::status::<Masquerade>(), FamilyStatus::Failed { attempts: 1 });
}

#[derive(Family)]
#[family(variants(Greedy))]
struct Hoard {
    seal: Seal<Self>,
}

#[derive(Variant)]
#[variant(family = Hoard, init = hoard)]
struct Greedy {
    seal: Seal<Hoard>,
}

fn hoard(seal: Seal<Hoard>) -> Result<Greedy, SealedError> {
    let _second = Seal::<Hoard>::new::<Greedy>()?;
    Ok(Greedy { seal })
}

#[test]
fn test_second_seal_claim_is_duplicate() {
    let err = sealed_enum::family::<Hoard>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::DuplicateInitialization);
}

#[derive(Family)]
#[family(variants(Echo))]
struct Canyon {
    seal: Seal<Self>,
}

#[derive(Variant)]
#[variant(family = Canyon, init = echo)]
struct Echo {
    seal: Seal<Canyon>,
}

fn echo(seal: Seal<Canyon>) -> Result<Echo, SealedError> {
    sealed_enum::family::<Canyon>()?;
    Ok(Echo { seal })
}

#[test]
fn test_reentrant_registration_is_duplicate() {
    let err = sealed_enum::family::<Canyon>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::DuplicateInitialization);
    assert_eq!(sealed_enum::status::<Canyon>(), FamilyStatus::Failed { attempts: 1 });
}

#[derive(Family)]
#[family(variants(Warren))]
struct Burrow {
    seal: Seal<Self>,
}

/// Also a family, but never registered as one.
struct Warren {
    seal: Seal<Burrow>,
}

impl Family for Warren {
    type Member = dyn Any + Send + Sync;

    fn init() -> Result<Self, InitError> {
        Err("never built as a family".into())
    }

    fn seal(&self) -> &Seal<Self> {
        unreachable!("never constructed as a family")
    }

    fn members(_: &mut Members<Self>) {}
}

impl Variant for Warren {
    type Family = Burrow;

    const TERMINAL: bool = false;

    fn init() -> Result<Self, InitError> {
        Ok(Self { seal: Seal::new::<Self>()? })
    }

    fn seal(&self) -> &Seal<Burrow> {
        &self.seal
    }

    fn upcast(&'static self) -> &'static (dyn Any + Send + Sync) {
        self
    }
}

#[test]
fn test_non_terminal_member_rejected_without_prior_registration() {
    assert_eq!(sealed_enum::status::<Warren>(), FamilyStatus::Absent);

    let err = sealed_enum::family::<Burrow>().unwrap_err();
    assert_eq!(err.kind(), SealedErrorKind::NonTerminalMember);
    assert!(err.to_string().contains("Warren"));
    assert_eq!(sealed_enum::status::<Burrow>(), FamilyStatus::Failed { attempts: 1 });
}

static JITTERY: AtomicBool = AtomicBool::new(true);

#[derive(Family)]
#[family(variants(Calm, Jumpy))]
struct Nervous {
    seal: Seal<Self>,
}

#[derive(Debug, Variant)]
#[variant(family = Nervous)]
struct Calm {
    seal: Seal<Nervous>,
}

#[derive(Variant)]
#[variant(family = Nervous, init = jump)]
struct Jumpy {
    seal: Seal<Nervous>,
}

fn jump(seal: Seal<Nervous>) -> Result<Jumpy, SealedError> {
    assert!(!JITTERY.swap(false, Ordering::SeqCst), "startled");
    Ok(Jumpy { seal })
}

#[test]
fn test_panicking_initializer_rolls_back_family() {
    let outcome = panic::catch_unwind(sealed_enum::family::<Nervous>);
    assert!(outcome.is_err());
    assert_eq!(sealed_enum::status::<Nervous>(), FamilyStatus::Failed { attempts: 1 });

    // Calm was built before the panic; its seen marker is gone again.
    let err = Calm::init().unwrap_err().downcast::<SealedError>().unwrap();
    assert_eq!(err.kind(), SealedErrorKind::UnauthorizedConstruction);
    assert!(sealed_enum::lookup::<Calm>().is_err());

    let nervous = sealed_enum::family::<Nervous>().unwrap();
    assert_eq!(nervous.len(), 2);
    assert_eq!(sealed_enum::ordinal::<Jumpy>().unwrap(), 1);
    assert_eq!(sealed_enum::status::<Nervous>(), FamilyStatus::Ready);
}
