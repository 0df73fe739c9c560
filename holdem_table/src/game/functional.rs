//! Hand evaluation as plain functions over card slices.

use std::collections::BTreeMap;

use super::entities::{Card, Rank, Suit, SubHand, Value};

const ACE_HIGH: Value = 14;

fn high_value(card: &Card) -> Value {
    if card.0 == 1 { ACE_HIGH } else { card.0 }
}

/// Highest card of a five-card run within `values` (sorted descending,
/// duplicates allowed). A wheel (A-2-3-4-5) is five-high.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut distinct: Vec<Value> = values.to_vec();
    distinct.dedup();
    if distinct.first() == Some(&ACE_HIGH) {
        distinct.push(1);
    }
    distinct
        .windows(5)
        .find(|w| w[0] - w[4] == 4)
        .map(|w| w[0])
}

/// Best five-card hand that can be made from `cards`. Works with fewer than
/// five cards too, in which case only pairs and trips can be made.
pub fn eval(cards: &[Card]) -> SubHand {
    let mut values: Vec<Value> = cards.iter().map(high_value).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let mut flush: Option<Vec<Value>> = None;
    for suit in Suit::ALL {
        let mut suited: Vec<Value> = cards
            .iter()
            .filter(|c| c.1 == suit)
            .map(high_value)
            .collect();
        if suited.len() >= 5 {
            suited.sort_unstable_by(|a, b| b.cmp(a));
            if let Some(high) = straight_high(&suited) {
                return SubHand {
                    rank: Rank::StraightFlush,
                    values: vec![high],
                };
            }
            suited.truncate(5);
            flush = Some(suited);
        }
    }

    // Groups of equal value, biggest group first, then highest value.
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for value in &values {
        *counts.entry(*value).or_default() += 1;
    }
    let mut groups: Vec<(usize, Value)> = counts.into_iter().map(|(v, n)| (n, v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let kickers = |exclude: &[Value], n: usize| -> Vec<Value> {
        let mut out: Vec<Value> = values
            .iter()
            .copied()
            .filter(|v| !exclude.contains(v))
            .collect();
        out.dedup();
        out.truncate(n);
        out
    };

    let (top_count, top_value) = groups.first().copied().unwrap_or((0, 0));

    if top_count >= 4 {
        let mut hand = vec![top_value];
        hand.extend(kickers(&[top_value], 1));
        return SubHand {
            rank: Rank::FourOfAKind,
            values: hand,
        };
    }

    if top_count == 3
        && let Some(&(_, pair)) = groups.iter().skip(1).find(|(n, _)| *n >= 2)
    {
        return SubHand {
            rank: Rank::FullHouse,
            values: vec![top_value, pair],
        };
    }

    if let Some(flush) = flush {
        return SubHand {
            rank: Rank::Flush,
            values: flush,
        };
    }

    if let Some(high) = straight_high(&values) {
        return SubHand {
            rank: Rank::Straight,
            values: vec![high],
        };
    }

    match top_count {
        3 => {
            let mut hand = vec![top_value];
            hand.extend(kickers(&[top_value], 2));
            SubHand {
                rank: Rank::ThreeOfAKind,
                values: hand,
            }
        }
        2 => {
            let second_pair = groups.get(1).filter(|(n, _)| *n == 2).map(|(_, v)| *v);
            match second_pair {
                Some(low) => {
                    let mut hand = vec![top_value, low];
                    hand.extend(kickers(&[top_value, low], 1));
                    SubHand {
                        rank: Rank::TwoPair,
                        values: hand,
                    }
                }
                None => {
                    let mut hand = vec![top_value];
                    hand.extend(kickers(&[top_value], 3));
                    SubHand {
                        rank: Rank::OnePair,
                        values: hand,
                    }
                }
            }
        }
        _ => SubHand {
            rank: Rank::HighCard,
            values: kickers(&[], 5),
        },
    }
}

/// Indices of every hand tied for best.
pub fn argmax(hands: &[SubHand]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return vec![];
    };
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| *hand == best)
        .map(|(idx, _)| idx)
        .collect()
}
