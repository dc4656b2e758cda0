//! Plan cycle resolution
//!
//! Maps a calendar date onto a position inside a trainer-authored recurring
//! plan. The cycle is fixed-length, anchored at the plan's start date, and
//! repeats forever: it does not stop at `end_date` (see [`Plan::covers`]).
//!
//! All arithmetic is on plain calendar dates, so month and year boundaries
//! and daylight-saving shifts have no effect.

use crate::models::{Day, Plan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a date lands inside a plan cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePosition {
    /// Whole days since the plan's start date
    pub offset_days: i64,
    /// Zero-based index into the cycle
    pub index: usize,
    /// Which repetition of the cycle, starting at 1
    pub repetition: i64,
}

/// Resolve the cycle position for `date`.
///
/// Returns `None` before the plan starts or when the plan has no days.
pub fn cycle_position(plan: &Plan, date: NaiveDate) -> Option<CyclePosition> {
    let cycle_length = plan.ordered_days.len() as i64;
    if cycle_length == 0 || date < plan.start_date {
        return None;
    }

    let offset_days = (date - plan.start_date).num_days();
    Some(CyclePosition {
        offset_days,
        index: (offset_days % cycle_length) as usize,
        repetition: offset_days / cycle_length + 1,
    })
}

/// Resolve which plan day applies on `date`.
///
/// The day whose `day_number` equals `index + 1` wins; if numbering is not
/// contiguous the day at position `index` is used instead.
pub fn resolve_day_for_date(plan: &Plan, date: NaiveDate) -> Option<&Day> {
    let position = cycle_position(plan, date)?;
    let wanted = position.index as u32 + 1;

    plan.ordered_days
        .iter()
        .find(|day| day.day_number == wanted)
        .or_else(|| plan.ordered_days.get(position.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanKind, PlanStatus};
    use chrono::Duration;
    use proptest::prelude::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn day(number: u32, label: &str) -> Day {
        Day {
            day_number: number,
            label: label.to_string(),
            focus_area: None,
            items: vec![],
        }
    }

    fn plan_with(start: NaiveDate, days: Vec<Day>) -> Plan {
        Plan {
            id: Uuid::nil(),
            connection_id: Uuid::nil(),
            owner_trainer_id: Uuid::nil(),
            client_id: Uuid::nil(),
            kind: PlanKind::Workout,
            title: "Strength block".to_string(),
            status: PlanStatus::Active,
            start_date: start,
            end_date: start + Duration::days(27),
            ordered_days: days,
        }
    }

    fn abc_plan() -> Plan {
        plan_with(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![day(1, "A"), day(2, "B"), day(3, "C")],
        )
    }

    #[rstest]
    #[case(2024, 1, 1, "A")]
    #[case(2024, 1, 2, "B")]
    #[case(2024, 1, 3, "C")]
    #[case(2024, 1, 4, "A")]
    #[case(2024, 1, 10, "A")]
    #[case(2024, 2, 1, "B")]
    #[case(2025, 1, 1, "A")]
    fn test_resolves_expected_day(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] expected: &str,
    ) {
        let plan = abc_plan();
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(resolve_day_for_date(&plan, date).unwrap().label, expected);
    }

    #[test]
    fn test_offset_nine_lands_on_first_day() {
        let plan = abc_plan();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let position = cycle_position(&plan, date).unwrap();
        assert_eq!(position.offset_days, 9);
        assert_eq!(position.index, 0);
        assert_eq!(position.repetition, 4);
    }

    #[test]
    fn test_before_start_is_none() {
        let plan = abc_plan();
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert!(resolve_day_for_date(&plan, date).is_none());
    }

    #[test]
    fn test_empty_plan_is_none() {
        let plan = plan_with(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), vec![]);
        assert!(resolve_day_for_date(&plan, plan.start_date).is_none());
    }

    #[test]
    fn test_cycle_continues_past_end_date() {
        let plan = abc_plan();
        let after_end = plan.end_date + Duration::days(1);
        assert!(!plan.covers(after_end));
        assert!(resolve_day_for_date(&plan, after_end).is_some());
    }

    #[test]
    fn test_non_contiguous_numbering_falls_back_to_position() {
        let plan = plan_with(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![day(1, "Push"), day(5, "Pull"), day(9, "Legs")],
        );
        let second = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let third = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(resolve_day_for_date(&plan, second).unwrap().label, "Pull");
        assert_eq!(resolve_day_for_date(&plan, third).unwrap().label, "Legs");
    }

    #[test]
    fn test_number_lookup_wins_over_position() {
        // Days stored out of order still resolve by their number
        let plan = plan_with(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![day(2, "B"), day(1, "A")],
        );
        assert_eq!(resolve_day_for_date(&plan, plan.start_date).unwrap().label, "A");
    }

    #[test]
    fn test_leap_day_boundary() {
        let plan = plan_with(
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            vec![day(1, "A"), day(2, "B")],
        );
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(resolve_day_for_date(&plan, leap).unwrap().label, "B");
        assert_eq!(resolve_day_for_date(&plan, march).unwrap().label, "A");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_cycle_is_periodic(
            start_offset in 0i64..20_000,
            cycle_len in 1u32..15,
            k in 0i64..200,
            shift in 0i64..15,
        ) {
            let epoch = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
            let start = epoch + Duration::days(start_offset);
            let days = (1..=cycle_len).map(|n| day(n, &format!("D{n}"))).collect();
            let plan = plan_with(start, days);

            let base = start + Duration::days(shift);
            let later = base + Duration::days(k * cycle_len as i64);
            prop_assert_eq!(
                resolve_day_for_date(&plan, base),
                resolve_day_for_date(&plan, later)
            );
        }

        #[test]
        fn prop_none_before_start(
            start_offset in 0i64..20_000,
            before in 1i64..5_000,
            cycle_len in 1u32..10,
        ) {
            let epoch = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
            let start = epoch + Duration::days(start_offset);
            let days = (1..=cycle_len).map(|n| day(n, "D")).collect();
            let plan = plan_with(start, days);

            prop_assert!(resolve_day_for_date(&plan, start - Duration::days(before)).is_none());
        }
    }
}
