//! Showdown and side-pot settlement.
//!
//! The pot is peeled off in layers. Each layer is the smallest remaining
//! contribution times the number of seats that still have chips in,
//! folded seats included. Only seats that did not fold can win a layer.
//! Ties split a layer evenly; the odd chips go to the first tied winner
//! in seat order.

use serde::Serialize;
use std::collections::HashMap;

use super::{
    constants::MAX_SEATS,
    entities::{Card, Chips, Rank, SeatIndex},
    functional::argmax,
    ranking::{HandRanker, HandStrength},
};

/// A seat that put chips in this hand.
#[derive(Clone, Debug)]
pub struct Contender {
    pub position: SeatIndex,
    pub total_bet: Chips,
    pub folded: bool,
    pub hole_cards: Vec<Card>,
}

/// One layer of the pot and who took it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PotSlice {
    pub amount: Chips,
    pub contributors: Vec<SeatIndex>,
    /// Seats paid from this layer. When every contributor folded the layer
    /// is returned to the contributors.
    pub winners: Vec<SeatIndex>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Settlement {
    pub slices: Vec<PotSlice>,
    pub prizes: [Chips; MAX_SEATS],
}

impl Settlement {
    pub fn total_paid(&self) -> u64 {
        self.prizes.iter().map(|&p| u64::from(p)).sum()
    }
}

fn no_hand() -> HandStrength {
    HandStrength {
        rank: Rank::HighCard,
        values: vec![],
    }
}

/// Split every contender's `total_bet` between the winners of each layer.
///
/// # Arguments
///
/// * `contenders` - Every seat with chips in the pot
/// * `board` - Community cards
/// * `ranker` - Hand ranking used for non-folded contenders
///
/// # Returns
///
/// * `Settlement` - Layers and the per-seat prize vector; the prizes sum to
///   the total contributed
pub fn settle(contenders: &[Contender], board: &[Card], ranker: &dyn HandRanker) -> Settlement {
    let strengths: HashMap<SeatIndex, HandStrength> = contenders
        .iter()
        .filter(|c| !c.folded)
        .map(|c| (c.position, ranker.rank(&c.hole_cards, board)))
        .collect();

    let mut remaining: Vec<(SeatIndex, Chips, bool)> = contenders
        .iter()
        .filter(|c| c.total_bet > 0)
        .map(|c| (c.position, c.total_bet, c.folded))
        .collect();
    remaining.sort_unstable_by_key(|(position, _, _)| *position);

    let mut settlement = Settlement::default();

    while let Some(level) = remaining.iter().map(|(_, bet, _)| *bet).min() {
        let contributors: Vec<SeatIndex> = remaining.iter().map(|(pos, _, _)| *pos).collect();
        let amount = level * contributors.len() as Chips;
        for (_, bet, _) in remaining.iter_mut() {
            *bet -= level;
        }

        let eligible: Vec<SeatIndex> = remaining
            .iter()
            .filter(|(_, _, folded)| !folded)
            .map(|(pos, _, _)| *pos)
            .collect();

        let winners = if eligible.is_empty() {
            for &pos in &contributors {
                settlement.prizes[pos] += level;
            }
            contributors.clone()
        } else {
            let hands: Vec<HandStrength> = eligible
                .iter()
                .map(|pos| strengths.get(pos).cloned().unwrap_or_else(no_hand))
                .collect();
            let winners: Vec<SeatIndex> =
                argmax(&hands).into_iter().map(|idx| eligible[idx]).collect();
            let share = amount / winners.len() as Chips;
            let odd_chips = amount % winners.len() as Chips;
            for &pos in &winners {
                settlement.prizes[pos] += share;
            }
            settlement.prizes[winners[0]] += odd_chips;
            winners
        };

        log::debug!(
            "Pot slice of {} from seats {:?} to {:?}",
            amount,
            contributors,
            winners
        );
        settlement.slices.push(PotSlice {
            amount,
            contributors,
            winners,
        });

        remaining.retain(|(_, bet, _)| *bet > 0);
    }

    settlement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;

    /// Strength is the first hole card's value; equal values tie.
    struct FirstCardRanker;

    impl HandRanker for FirstCardRanker {
        fn rank(&self, hole_cards: &[Card], _board: &[Card]) -> HandStrength {
            HandStrength {
                rank: Rank::HighCard,
                values: vec![hole_cards[0].0],
            }
        }
    }

    fn contender(position: SeatIndex, total_bet: Chips, folded: bool, strength: u8) -> Contender {
        Contender {
            position,
            total_bet,
            folded,
            hole_cards: vec![Card(strength, Suit::Club), Card(2, Suit::Heart)],
        }
    }

    #[test]
    fn test_heads_up_single_pot() {
        let result = settle(
            &[contender(0, 50, false, 9), contender(3, 50, false, 5)],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.slices.len(), 1);
        assert_eq!(result.prizes[0], 100);
        assert_eq!(result.total_paid(), 100);
    }

    #[test]
    fn test_two_unequal_all_ins_make_two_slices() {
        // The short stack has the best hand.
        let result = settle(
            &[contender(1, 40, false, 13), contender(4, 100, false, 7)],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.slices.len(), 2);
        assert_eq!(result.slices[0].amount, 80);
        assert_eq!(result.slices[0].winners, vec![1]);
        assert_eq!(result.slices[1].amount, 60);
        assert_eq!(result.slices[1].winners, vec![4]);
        assert_eq!(result.prizes[1], 80);
        assert_eq!(result.prizes[4], 60);
    }

    #[test]
    fn test_three_way_side_pots() {
        let result = settle(
            &[
                contender(0, 30, false, 12),
                contender(2, 70, false, 10),
                contender(5, 100, false, 8),
            ],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.slices.len(), 3);
        assert_eq!(result.prizes[0], 90);
        assert_eq!(result.prizes[2], 80);
        assert_eq!(result.prizes[5], 30);
        assert_eq!(result.total_paid(), 200);
    }

    #[test]
    fn test_folded_chips_feed_pot_but_cannot_win() {
        let result = settle(
            &[
                contender(0, 20, true, 13),
                contender(1, 20, false, 3),
                contender(2, 20, false, 2),
            ],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.prizes[0], 0);
        assert_eq!(result.prizes[1], 60);
        assert_eq!(result.total_paid(), 60);
    }

    #[test]
    fn test_split_remainder_goes_to_first_winner_in_seat_order() {
        let result = settle(
            &[
                contender(4, 11, false, 9),
                contender(1, 11, false, 9),
                contender(3, 11, true, 13),
            ],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.slices[0].winners, vec![1, 4]);
        assert_eq!(result.prizes[1], 17);
        assert_eq!(result.prizes[4], 16);
        assert_eq!(result.total_paid(), 33);
    }

    #[test]
    fn test_layer_with_only_folded_contributors_is_returned() {
        let result = settle(
            &[contender(0, 50, true, 13), contender(1, 10, false, 2)],
            &[],
            &FirstCardRanker,
        );
        assert_eq!(result.prizes[1], 20);
        assert_eq!(result.prizes[0], 40);
        assert_eq!(result.total_paid(), 60);
    }

    #[test]
    fn test_settlement_is_deterministic() {
        let contenders = [
            contender(0, 25, false, 6),
            contender(1, 60, false, 6),
            contender(2, 60, true, 1),
            contender(3, 45, false, 11),
        ];
        let a = settle(&contenders, &[], &FirstCardRanker);
        let b = settle(&contenders, &[], &FirstCardRanker);
        assert_eq!(a, b);
        assert_eq!(a.total_paid(), 190);
    }
}
