use super::{
    entities::{Card, SubHand},
    functional,
};

/// Comparable hand strength. Equal strengths split a pot.
pub type HandStrength = SubHand;

/// Ranks a seat's hole cards against the board at showdown.
pub trait HandRanker: Send + Sync {
    fn rank(&self, hole_cards: &[Card], board: &[Card]) -> HandStrength;
}

/// Default ranker: best five of the seven available cards.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestHandRanker;

impl HandRanker for BestHandRanker {
    fn rank(&self, hole_cards: &[Card], board: &[Card]) -> HandStrength {
        let cards: Vec<Card> = hole_cards.iter().chain(board).copied().collect();
        functional::eval(&cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Rank, Suit};

    #[test]
    fn test_best_hand_ranker_uses_board() {
        let board = [
            Card(5, Suit::Club),
            Card(5, Suit::Heart),
            Card(9, Suit::Spade),
            Card(12, Suit::Diamond),
            Card(2, Suit::Club),
        ];
        let strength = BestHandRanker.rank(&[Card(9, Suit::Heart), Card(3, Suit::Club)], &board);
        assert_eq!(strength.rank, Rank::TwoPair);
        assert_eq!(strength.values, vec![9, 5, 12]);
    }
}
