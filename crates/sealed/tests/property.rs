pub mod fixtures;

use fixtures::*;
use proptest::prelude::*;
use sealed_enum::VariantRef;

fn weekdays() -> Vec<VariantRef<Weekday>> {
    sealed_enum::family::<Weekday>().unwrap().values().to_vec()
}

proptest! {
    #[test]
    fn sorting_restores_declaration_order(shuffled in Just(weekdays()).prop_shuffle()) {
        let mut sorted = shuffled;
        sorted.sort();
        prop_assert_eq!(&sorted[..], sealed_enum::values::<Weekday>().unwrap());

        let names: Vec<String> = sorted.iter().map(ToString::to_string).collect();
        prop_assert_eq!(names, WEEKDAYS);
    }

    #[test]
    fn ordinals_are_dense_and_resolve_back(index in 0..WEEKDAYS.len()) {
        let weekday = sealed_enum::family::<Weekday>().unwrap();
        let variant = weekday.at(index).unwrap();

        prop_assert_eq!(variant.ordinal(), index);
        prop_assert_eq!(weekday.at(variant.ordinal()), Some(variant));
        prop_assert!(weekday.at(WEEKDAYS.len() + index).is_none());
    }

    #[test]
    fn variants_compare_like_their_ordinals(a in 0..WEEKDAYS.len(), b in 0..WEEKDAYS.len()) {
        let weekday = sealed_enum::family::<Weekday>().unwrap();
        let (left, right) = (weekday.at(a).unwrap(), weekday.at(b).unwrap());

        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        prop_assert_eq!(left == right, a == b);
    }
}
