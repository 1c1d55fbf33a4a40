//! Draw order over member descriptors
//!
//! Members with an explicit order come first, ascending. Members without one
//! follow in declaration order. The comparator is a strict weak ordering and
//! `sort` is stable, so the result is repeatable.

use form_types::MemberDescriptor;
use std::cmp::Ordering;

/// Compares two optional draw orders
///
/// Presence beats absence regardless of sign.
pub fn compare_orders(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compares two members by draw order
pub fn compare(a: &MemberDescriptor, b: &MemberDescriptor) -> Ordering {
    compare_orders(a.order, b.order)
}

/// Sorts members into draw order, keeping declaration order among ties
pub fn sort(members: &mut [MemberDescriptor]) {
    members.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_types::ValueType;

    fn member(name: &str, order: Option<i32>) -> MemberDescriptor {
        MemberDescriptor {
            name: name.to_string(),
            value_type: ValueType::Text,
            order,
            label: name.to_string(),
            read_only: false,
            identifier: false,
            long_text: false,
            derived: None,
        }
    }

    fn names(members: &[MemberDescriptor]) -> Vec<&str> {
        members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_presence_beats_absence() {
        assert_eq!(compare_orders(Some(100), None), Ordering::Less);
        assert_eq!(compare_orders(Some(-100), None), Ordering::Less);
        assert_eq!(compare_orders(None, Some(0)), Ordering::Greater);
        assert_eq!(compare_orders(None, None), Ordering::Equal);
    }

    #[test]
    fn test_explicit_orders_ascending() {
        assert_eq!(compare_orders(Some(-2), Some(-1)), Ordering::Less);
        assert_eq!(compare_orders(Some(5), Some(2)), Ordering::Greater);
        assert_eq!(compare_orders(Some(3), Some(3)), Ordering::Equal);
    }

    #[test]
    fn test_explicit_zero_is_not_absent() {
        assert_eq!(compare_orders(Some(0), None), Ordering::Less);
    }

    #[test]
    fn test_mixed_sort() {
        let mut members = vec![
            member("five", Some(5)),
            member("absent_a", None),
            member("minus_one", Some(-1)),
            member("two", Some(2)),
            member("absent_b", None),
            member("minus_two", Some(-2)),
        ];
        sort(&mut members);
        assert_eq!(
            names(&members),
            vec!["minus_two", "minus_one", "two", "five", "absent_a", "absent_b"]
        );
    }

    #[test]
    fn test_sort_is_repeatable() {
        let original = vec![
            member("c", None),
            member("a", Some(1)),
            member("b", None),
            member("d", Some(1)),
        ];
        let mut first = original.clone();
        let mut second = original;
        sort(&mut first);
        sort(&mut second);
        sort(&mut second);
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_comparator_is_transitive_over_sample() {
        let sample = [None, Some(-3), Some(0), Some(7), None, Some(-3)];
        for a in sample {
            for b in sample {
                for c in sample {
                    if compare_orders(a, b) != Ordering::Greater
                        && compare_orders(b, c) != Ordering::Greater
                    {
                        assert_ne!(compare_orders(a, c), Ordering::Greater);
                    }
                }
            }
        }
    }
}
