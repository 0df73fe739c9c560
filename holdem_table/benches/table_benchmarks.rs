use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use holdem_table::{
    Address, Card, GameSettings, TableState,
    constants::MAX_SEATS,
    entities::Suit,
    functional::{argmax, eval},
    game::settlement::{Contender, settle},
    game::{BestHandRanker, constants::{ANIMATION_DELAY_MS, START_DELAY_MS}},
    project,
};

/// Helper to create a table with N seated players and the blinds posted
fn setup_table_with_players(n_players: usize) -> TableState {
    let mut table = TableState::new(GameSettings::default().with_seed(3));
    for i in 0..n_players {
        let address = Address::new(&format!("player{}", i));
        table.take_seat(address, i, 100).unwrap();
    }
    table.advance(START_DELAY_MS + ANIMATION_DELAY_MS).unwrap();
    table
}

/// Benchmark hand evaluation with 7 cards (hole cards + board)
fn bench_hand_eval_7_cards(c: &mut Criterion) {
    let cards = vec![
        Card(1, Suit::Spade),
        Card(13, Suit::Spade),
        Card(12, Suit::Spade),
        Card(11, Suit::Heart),
        Card(10, Suit::Diamond),
        Card(4, Suit::Club),
        Card(4, Suit::Heart),
    ];

    c.bench_function("hand_eval_7_cards", |b| {
        b.iter(|| eval(&cards));
    });
}

/// Benchmark comparing six hands for a showdown
fn bench_hand_comparison(c: &mut Criterion) {
    let board = [
        Card(2, Suit::Club),
        Card(7, Suit::Diamond),
        Card(9, Suit::Heart),
        Card(11, Suit::Spade),
        Card(13, Suit::Club),
    ];
    let hands: Vec<_> = (0..6u8)
        .map(|i| {
            let mut cards = vec![Card(i + 3, Suit::Spade), Card(i + 4, Suit::Heart)];
            cards.extend_from_slice(&board);
            eval(&cards)
        })
        .collect();

    c.bench_function("hand_comparison_6_players", |b| {
        b.iter(|| argmax(&hands));
    });
}

/// Benchmark side pot settlement with every seat all-in for a different amount
fn bench_settlement(c: &mut Criterion) {
    let board = [
        Card(2, Suit::Club),
        Card(7, Suit::Diamond),
        Card(9, Suit::Heart),
        Card(11, Suit::Spade),
        Card(13, Suit::Club),
    ];
    let contenders: Vec<Contender> = (0..MAX_SEATS)
        .map(|position| Contender {
            position,
            total_bet: 20 * (position as u32 + 1),
            folded: position == 2,
            hole_cards: vec![
                Card(position as u8 + 3, Suit::Spade),
                Card(position as u8 + 1, Suit::Heart),
            ],
        })
        .collect();

    c.bench_function("settlement_6_way_side_pots", |b| {
        b.iter(|| settle(&contenders, &board, &BestHandRanker));
    });
}

/// Benchmark snapshot projection with different player counts
fn bench_view_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_projection");

    for n_players in [2, 4, 6].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, &n| {
                let table = setup_table_with_players(n);
                let viewer = Address::new("player0");
                b.iter(|| project(&table, Some(&viewer)));
            },
        );
    }

    group.finish();
}

/// Benchmark a full hand checked down to showdown
fn bench_checked_down_hand(c: &mut Criterion) {
    c.bench_function("checked_down_hand_heads_up", |b| {
        b.iter_batched(
            || setup_table_with_players(2),
            |mut table| {
                while let Some(position) = table.current_seat() {
                    let address = table.seat(position).and_then(|s| s.address.clone()).unwrap();
                    if table.check(&address).is_err() {
                        table.call(&address).unwrap();
                    }
                }
                table
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    hand_evaluation,
    bench_hand_eval_7_cards,
    bench_hand_comparison,
    bench_settlement,
);

criterion_group!(table_operations, bench_view_projection, bench_checked_down_hand);

criterion_main!(hand_evaluation, table_operations);
