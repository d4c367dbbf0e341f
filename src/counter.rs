use crate::models::{CategoryId, CounterState, Direction, DirectionCount};
use crate::variants::Variant;
use tracing::error;

pub fn zeroed(variant: &Variant) -> CounterState {
    variant
        .categories
        .iter()
        .map(|category| (category.id, DirectionCount::default()))
        .collect()
}

/// Returns a copy of `state` with one field raised by one.
///
/// Callers only ever pass categories taken from the variant's own tables, so
/// an unknown category is a bug rather than bad input.
pub fn increment(state: &CounterState, category: CategoryId, direction: Direction) -> CounterState {
    let mut next = state.clone();
    let Some(entry) = next.counts.get_mut(&category) else {
        debug_assert!(false, "increment of unconfigured category {category}");
        error!(%category, "increment of unconfigured category ignored");
        return next;
    };

    match direction {
        Direction::Incoming => entry.incoming = entry.incoming.saturating_add(1),
        Direction::Outgoing => entry.outgoing = entry.outgoing.saturating_add(1),
    }
    next
}

pub fn reset(variant: &Variant) -> CounterState {
    zeroed(variant)
}

pub fn totals(state: &CounterState) -> DirectionCount {
    state.iter().fold(DirectionCount::default(), |acc, (_, counts)| DirectionCount {
        incoming: acc.incoming.saturating_add(counts.incoming),
        outgoing: acc.outgoing.saturating_add(counts.outgoing),
    })
}

pub fn describe_last_action(variant: &Variant, category: CategoryId, direction: Direction) -> String {
    if variant.categories.len() == 1 {
        return direction.label().to_string();
    }

    match variant.category(category) {
        Some(found) => format!("{} - {}", direction.label(), found.name),
        None => direction.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::{EASY, STREET, TRAIN};
    use proptest::prelude::*;

    #[test]
    fn increment_touches_exactly_one_field() {
        let before = zeroed(&STREET);
        let after = increment(&before, CategoryId(3), Direction::Incoming);

        for (id, counts) in after.iter() {
            if id == CategoryId(3) {
                assert_eq!(*counts, DirectionCount { incoming: 1, outgoing: 0 });
            } else {
                assert_eq!(counts, before.get(id).unwrap());
            }
        }
        assert_eq!(before, zeroed(&STREET));
    }

    #[test]
    fn totals_match_per_category_sums() {
        let mut state = zeroed(&TRAIN);
        let presses = [
            (1, Direction::Incoming),
            (16, Direction::Outgoing),
            (1, Direction::Incoming),
            (7, Direction::Outgoing),
            (10, Direction::Incoming),
        ];
        for (id, direction) in presses {
            state = increment(&state, CategoryId(id), direction);
        }

        let sums = totals(&state);
        let incoming: u64 = state.iter().map(|(_, counts)| counts.incoming).sum();
        let outgoing: u64 = state.iter().map(|(_, counts)| counts.outgoing).sum();
        assert_eq!(sums.incoming, incoming);
        assert_eq!(sums.outgoing, outgoing);
        assert_eq!(sums, DirectionCount { incoming: 3, outgoing: 2 });
    }

    #[test]
    fn reset_zeroes_totals() {
        let state = increment(&zeroed(&STREET), CategoryId(2), Direction::Outgoing);
        assert_eq!(totals(&state).outgoing, 1);

        let cleared = reset(&STREET);
        assert_eq!(totals(&cleared), DirectionCount::default());
        assert_eq!(cleared.categories().count(), STREET.categories.len());
    }

    #[test]
    fn increment_saturates_instead_of_wrapping() {
        let state: CounterState = [(
            CategoryId(1),
            DirectionCount {
                incoming: u64::MAX,
                outgoing: 0,
            },
        )]
        .into_iter()
        .collect();

        let next = increment(&state, CategoryId(1), Direction::Incoming);
        assert_eq!(next.get(CategoryId(1)).unwrap().incoming, u64::MAX);
    }

    #[test]
    fn last_action_names_direction_and_category() {
        assert_eq!(
            describe_last_action(&STREET, CategoryId(1), Direction::Incoming),
            "Einfahrend - Fahrräder"
        );
        assert_eq!(
            describe_last_action(&TRAIN, CategoryId(16), Direction::Outgoing),
            "Ausfahrend - H (Hund)"
        );
        assert_eq!(
            describe_last_action(&EASY, CategoryId(1), Direction::Outgoing),
            "Ausfahrend"
        );
    }

    proptest! {
        #[test]
        fn prop_totals_equal_per_category_sums(
            presses in prop::collection::vec((1u8..=16, any::<bool>()), 0..200)
        ) {
            let mut state = zeroed(&TRAIN);
            for (id, incoming) in &presses {
                let direction = if *incoming { Direction::Incoming } else { Direction::Outgoing };
                state = increment(&state, CategoryId(*id), direction);
            }

            let sums = totals(&state);
            let incoming: u64 = state.iter().map(|(_, counts)| counts.incoming).sum();
            let outgoing: u64 = state.iter().map(|(_, counts)| counts.outgoing).sum();
            prop_assert_eq!(sums.incoming, incoming);
            prop_assert_eq!(sums.outgoing, outgoing);
            prop_assert_eq!(sums.incoming + sums.outgoing, presses.len() as u64);
            prop_assert_eq!(state.categories().count(), 16);
        }

        #[test]
        fn prop_reset_always_zeroes_totals(
            presses in prop::collection::vec(1u8..=6, 0..50)
        ) {
            let mut state = zeroed(&STREET);
            for id in &presses {
                state = increment(&state, CategoryId(*id), Direction::Outgoing);
            }
            prop_assert_eq!(totals(&state).outgoing, presses.len() as u64);
            prop_assert_eq!(totals(&reset(&STREET)), DirectionCount::default());
        }
    }
}
