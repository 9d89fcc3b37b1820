#![allow(dead_code)]

use sealed_enum::{Family, Seal, Variant};

/// Shared view of the [`Boundary`] members.
pub trait Label: Send + Sync {
    fn label(&self) -> &'static str;
}

#[derive(Debug, Family)]
#[family(member = dyn Label, variants(End, Start))]
pub struct Boundary {
    seal: Seal<Self>,
}

#[derive(Debug, Variant)]
#[variant(family = Boundary)]
pub struct End {
    seal: Seal<Boundary>,
}

#[derive(Debug, Variant)]
#[variant(family = Boundary)]
pub struct Start {
    seal: Seal<Boundary>,
}

impl Label for End {
    fn label(&self) -> &'static str {
        "END"
    }
}

impl Label for Start {
    fn label(&self) -> &'static str {
        "START"
    }
}

/// Family that no test in a binary is expected to register.
#[derive(Debug, Family)]
#[family(variants(Sleeper))]
pub struct Dormant {
    seal: Seal<Self>,
}

#[derive(Debug, Variant)]
#[variant(family = Dormant)]
pub struct Sleeper {
    seal: Seal<Dormant>,
}

macro_rules! weekdays {
    ($($day:ident),+ $(,)?) => {
        #[derive(Debug, Family)]
        #[family(variants($($day),+))]
        pub struct Weekday {
            seal: Seal<Self>,
        }

        $(
            #[derive(Debug, Variant)]
            #[variant(family = Weekday)]
            pub struct $day {
                seal: Seal<Weekday>,
            }
        )+

        /// Declared names of [`Weekday`], in ordinal order.
        pub const WEEKDAYS: &[&str] = &[$(stringify!($day)),+];
    };
}

weekdays!(Mon, Tue, Wed, Thu, Fri, Sat, Sun);
