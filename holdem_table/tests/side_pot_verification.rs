//! Side pot settlement tests, scenario and property based.
//!
//! These tests verify that settlement:
//! - Peels the pot into layers by contribution level
//! - Lets folded seats feed layers without winning them
//! - Gives odd chips to the first tied winner in seat order
//! - Always pays out exactly what was put in

use holdem_table::game::{
    constants::MAX_SEATS,
    entities::{Card, Chips, Rank, SubHand, Suit},
    ranking::{HandRanker, HandStrength},
    settlement::{Contender, settle},
};
use proptest::prelude::*;

/// Strength is the first hole card's value.
struct FirstCardRanker;

impl HandRanker for FirstCardRanker {
    fn rank(&self, hole_cards: &[Card], _board: &[Card]) -> HandStrength {
        SubHand {
            rank: Rank::HighCard,
            values: vec![hole_cards[0].0],
        }
    }
}

fn contender(position: usize, total_bet: Chips, folded: bool, strength: u8) -> Contender {
    Contender {
        position,
        total_bet,
        folded,
        hole_cards: vec![Card(strength, Suit::Spade), Card(2, Suit::Diamond)],
    }
}

#[test]
fn test_four_players_three_levels() {
    // 25 x 4 = 100 to everyone, 50 x 3 = 150 among seats 1-3,
    // 75 x 2 = 150 between seats 2 and 3.
    let result = settle(
        &[
            contender(0, 25, false, 13),
            contender(1, 75, false, 12),
            contender(2, 150, false, 11),
            contender(3, 150, false, 10),
        ],
        &[],
        &FirstCardRanker,
    );

    let amounts: Vec<Chips> = result.slices.iter().map(|s| s.amount).collect();
    assert_eq!(amounts, vec![100, 150, 150]);
    assert_eq!(result.prizes[0], 100);
    assert_eq!(result.prizes[1], 150);
    assert_eq!(result.prizes[2], 150);
    assert_eq!(result.prizes[3], 0);
    assert_eq!(result.total_paid(), 400);
}

#[test]
fn test_side_pot_with_folder() {
    // Seat 0 put in 50 and folded; seats 1 and 2 went to 100.
    let result = settle(
        &[
            contender(0, 50, true, 13),
            contender(1, 100, false, 4),
            contender(2, 100, false, 9),
        ],
        &[],
        &FirstCardRanker,
    );
    assert_eq!(result.prizes[0], 0);
    assert_eq!(result.prizes[2], 250);
    assert_eq!(result.slices[0].contributors, vec![0, 1, 2]);
    assert_eq!(result.slices[0].winners, vec![2]);
}

#[test]
fn test_short_all_in_wins_main_pot_only() {
    let result = settle(
        &[
            contender(0, 30, false, 13),
            contender(3, 90, false, 5),
            contender(5, 90, false, 8),
        ],
        &[],
        &FirstCardRanker,
    );
    assert_eq!(result.prizes[0], 90);
    assert_eq!(result.prizes[5], 120);
    assert_eq!(result.prizes[3], 0);
}

#[test]
fn test_three_way_split_remainder() {
    let result = settle(
        &[
            contender(2, 10, false, 9),
            contender(4, 10, false, 9),
            contender(5, 10, false, 9),
            contender(0, 1, true, 13),
        ],
        &[],
        &FirstCardRanker,
    );
    // First layer: 4 chips split three ways, seat 2 takes the odd chip.
    assert_eq!(result.slices[0].amount, 4);
    assert_eq!(result.slices[0].winners, vec![2, 4, 5]);
    assert_eq!(result.prizes[2], 11);
    assert_eq!(result.prizes[4], 10);
    assert_eq!(result.prizes[5], 10);
    assert_eq!(result.total_paid(), 31);
}

fn contenders_strategy() -> impl Strategy<Value = Vec<Contender>> {
    prop::collection::vec((1u32..=500, any::<bool>(), 2u8..=14), 2..=MAX_SEATS).prop_map(
        |entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(position, (bet, folded, strength))| contender(position, bet, folded, strength))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn test_settlement_pays_exactly_what_went_in(contenders in contenders_strategy()) {
        let result = settle(&contenders, &[], &FirstCardRanker);
        let contributed: u64 = contenders.iter().map(|c| u64::from(c.total_bet)).sum();
        prop_assert_eq!(result.total_paid(), contributed);

        let sliced: u64 = result.slices.iter().map(|s| u64::from(s.amount)).sum();
        prop_assert_eq!(sliced, contributed);
    }

    #[test]
    fn test_folded_seats_win_nothing_when_covered(contenders in contenders_strategy()) {
        let deepest = contenders.iter().map(|c| c.total_bet).max().unwrap_or(0);
        let covered = contenders.iter().any(|c| !c.folded && c.total_bet == deepest);
        prop_assume!(covered);

        let result = settle(&contenders, &[], &FirstCardRanker);
        for c in contenders.iter().filter(|c| c.folded) {
            prop_assert_eq!(result.prizes[c.position], 0);
        }
    }

    #[test]
    fn test_no_seat_wins_more_than_its_layers(contenders in contenders_strategy()) {
        let result = settle(&contenders, &[], &FirstCardRanker);
        for c in contenders.iter().filter(|c| !c.folded) {
            // A seat can win at most its own level from every contributor.
            let cap: u64 = contenders
                .iter()
                .map(|other| u64::from(other.total_bet.min(c.total_bet)))
                .sum();
            prop_assert!(u64::from(result.prizes[c.position]) <= cap);
        }
    }

    #[test]
    fn test_settlement_ignores_contender_order(mut contenders in contenders_strategy()) {
        let forward = settle(&contenders, &[], &FirstCardRanker);
        contenders.reverse();
        let backward = settle(&contenders, &[], &FirstCardRanker);
        prop_assert_eq!(forward.prizes, backward.prizes);
    }
}
