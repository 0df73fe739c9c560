//! The betting-round state machine for one table.
//!
//! `TableState` is a synchronous single-writer model. It never sleeps: all
//! delays are continuations queued in its [`Schedule`] and run when the
//! owner advances the table's logical clock with [`TableState::advance`].

use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, mem, sync::Arc};

use super::{
    constants::{
        ANIMATION_DELAY_MS, DEFAULT_COUNTDOWN, HOLE_CARDS, MAX_SEATS, SETTLE_DELAY_MS,
        START_DELAY_MS, STREET_DELAY_MS, TICK_MS,
    },
    entities::{
        Action, Address, Card, Chips, Deck, Round, Seat, SeatIndex, SeatStatus, TableEvent,
    },
    errors::{InvariantViolation, TableError, UserError},
    ranking::{BestHandRanker, HandRanker},
    schedule::{Continuation, Epoch, Schedule},
    sequencer::{next_active_seat, next_actor_seat, next_ready_seat},
    settlement::{Contender, Settlement, settle},
};

/// Rules and timings for a table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    /// Countdown ticks a seat gets to act.
    pub countdown_ticks: u32,
    pub animation_delay_ms: u64,
    pub street_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub start_delay_ms: u64,
    /// Base shuffle seed; each hand offsets it by the hand number. `None`
    /// seeds from the clock.
    pub deck_seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            countdown_ticks: DEFAULT_COUNTDOWN,
            animation_delay_ms: ANIMATION_DELAY_MS,
            street_delay_ms: STREET_DELAY_MS,
            settle_delay_ms: SETTLE_DELAY_MS,
            start_delay_ms: START_DELAY_MS,
            deck_seed: None,
        }
    }
}

impl GameSettings {
    pub fn new(small_blind: Chips, big_blind: Chips, min_buy_in: Chips, max_buy_in: Chips) -> Self {
        Self {
            small_blind,
            big_blind,
            min_buy_in,
            max_buy_in,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.deck_seed = Some(seed);
        self
    }
}

/// Result of the round-completion check run after every action.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundOutcome {
    /// One contender left; they take the pot without a showdown.
    Uncontested,
    /// At most one contender can still bet; deal out the board.
    Lockup,
    /// Every contender who can bet has acted and matched the bet.
    Ended,
    Running,
}

pub struct TableState {
    settings: GameSettings,
    ranker: Arc<dyn HandRanker>,
    seats: [Seat; MAX_SEATS],
    dealer_seat: SeatIndex,
    small_blind_seat: SeatIndex,
    current_seat: Option<SeatIndex>,
    round: Round,
    /// Chips swept in from completed betting rounds.
    pot: Chips,
    current_bet: Chips,
    min_raise: Chips,
    community_cards: Vec<Card>,
    deck: Deck,
    countdown: u32,
    is_lockup: bool,
    last_delta: Chips,
    /// Whether the last settlement compared hands.
    showdown: bool,
    last_settlement: Option<Settlement>,
    /// Seats that asked to leave while their chips were still contesting
    /// the pot; vacated once the hand is over.
    departures: [Option<SeatStatus>; MAX_SEATS],
    chips_in_play: u64,
    epoch: Epoch,
    clock_ms: u64,
    schedule: Schedule,
    events: VecDeque<TableEvent>,
}

impl TableState {
    pub fn new(settings: GameSettings) -> Self {
        Self::with_ranker(settings, Arc::new(BestHandRanker))
    }

    pub fn with_ranker(settings: GameSettings, ranker: Arc<dyn HandRanker>) -> Self {
        let min_raise = settings.big_blind;
        Self {
            settings,
            ranker,
            seats: Default::default(),
            dealer_seat: 0,
            small_blind_seat: 0,
            current_seat: None,
            round: Round::Wait,
            pot: 0,
            current_bet: 0,
            min_raise,
            community_cards: Vec::with_capacity(5),
            deck: Deck::default(),
            countdown: 0,
            is_lockup: false,
            last_delta: 0,
            showdown: false,
            last_settlement: None,
            departures: [None; MAX_SEATS],
            chips_in_play: 0,
            epoch: Epoch::default(),
            clock_ms: 0,
            schedule: Schedule::default(),
            events: VecDeque::new(),
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn seats(&self) -> &[Seat; MAX_SEATS] {
        &self.seats
    }

    pub fn seat(&self, position: SeatIndex) -> Option<&Seat> {
        self.seats.get(position)
    }

    pub fn position_of(&self, address: &Address) -> Option<SeatIndex> {
        self.seats.iter().position(|s| s.is_occupied_by(address))
    }

    pub fn occupied_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.is_seated()).count()
    }

    pub fn dealer_seat(&self) -> SeatIndex {
        self.dealer_seat
    }

    pub fn current_seat(&self) -> Option<SeatIndex> {
        self.current_seat
    }

    pub fn round(&self) -> Round {
        self.round
    }

    /// Chips swept in from completed betting rounds.
    pub fn pot(&self) -> Chips {
        self.pot
    }

    /// Everything in the middle, including the current round's bets.
    pub fn pot_size(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.bet_amount).sum::<Chips>()
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_lockup(&self) -> bool {
        self.is_lockup
    }

    pub fn last_delta(&self) -> Chips {
        self.last_delta
    }

    pub fn showdown(&self) -> bool {
        self.showdown
    }

    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.last_settlement.as_ref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn hand(&self) -> u64 {
        self.epoch.hand
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn pending_continuations(&self) -> usize {
        self.schedule.len()
    }

    /// Chips the table is accountable for.
    pub fn chips_in_play(&self) -> u64 {
        self.chips_in_play
    }

    pub fn drain_events(&mut self) -> VecDeque<TableEvent> {
        mem::take(&mut self.events)
    }

    fn ready_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_ready()).count()
    }

    fn bump(&mut self) {
        self.epoch.step += 1;
    }

    fn schedule_in(&mut self, delay_ms: u64, continuation: Continuation) {
        self.schedule
            .push(self.clock_ms + delay_ms, self.epoch, continuation);
    }

    /// Check whether `address` may sit at `position` with `buy_in` chips
    /// without touching the table.
    pub fn can_seat(
        &self,
        address: &Address,
        position: SeatIndex,
        buy_in: Chips,
    ) -> Result<(), UserError> {
        if address.is_empty() {
            return Err(UserError::InvalidAddress);
        }
        let seat = self
            .seats
            .get(position)
            .ok_or(UserError::InvalidSeat(position))?;
        if self.position_of(address).is_some() {
            return Err(UserError::AlreadySeated);
        }
        if seat.is_seated() {
            return Err(UserError::SeatTaken(position));
        }
        if buy_in < self.settings.min_buy_in || buy_in > self.settings.max_buy_in {
            return Err(UserError::BuyInOutOfRange {
                min: self.settings.min_buy_in,
                max: self.settings.max_buy_in,
            });
        }
        Ok(())
    }

    /// Seat a player. Mid-hand arrivals wait for the next hand. Once two
    /// players with chips are seated at an idle table, the first hand is
    /// scheduled.
    pub fn take_seat(
        &mut self,
        address: Address,
        position: SeatIndex,
        buy_in: Chips,
    ) -> Result<(), TableError> {
        self.can_seat(&address, position, buy_in)?;

        let status = if self.round == Round::Wait {
            self.dealer_seat = position;
            SeatStatus::None
        } else {
            SeatStatus::Join
        };
        self.seats[position] = Seat::new(address.clone(), buy_in, status);
        self.chips_in_play += u64::from(buy_in);
        log::info!("{} sat at seat {} with {}", address, position, buy_in);
        self.events.push_back(TableEvent::Seated {
            address,
            position,
            buy_in,
        });

        if self.round == Round::Wait && self.ready_count() >= 2 {
            // Each arrival restarts the countdown to the first hand.
            self.bump();
            self.schedule_in(self.settings.start_delay_ms, Continuation::NextHand);
        }
        self.check_conservation()?;
        Ok(())
    }

    /// Apply `action` for the seat owned by `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`UserError`] and leaves the table untouched if the action
    /// is illegal, or an [`InvariantViolation`] if the table is corrupt.
    pub fn act(&mut self, address: &Address, action: Action) -> Result<(), TableError> {
        let position = self.acting_seat(address)?;
        let staked = match action {
            Action::AllIn => self.apply_all_in(position),
            Action::Call => self.apply_call(position),
            Action::Check => self.apply_check(position)?,
            Action::Fold => self.apply_fold(position),
            Action::Raise(amount) => self.apply_raise(position, amount)?,
        };
        log::debug!("Seat {} {} ({} staked)", position, action, staked);
        self.events.push_back(TableEvent::Acted {
            position,
            action,
            amount: staked,
        });
        self.advance_flow(position)?;
        self.check_conservation()?;
        Ok(())
    }

    pub fn call(&mut self, address: &Address) -> Result<(), TableError> {
        self.act(address, Action::Call)
    }

    pub fn check(&mut self, address: &Address) -> Result<(), TableError> {
        self.act(address, Action::Check)
    }

    pub fn fold(&mut self, address: &Address) -> Result<(), TableError> {
        self.act(address, Action::Fold)
    }

    pub fn raise(&mut self, address: &Address, amount: Chips) -> Result<(), TableError> {
        self.act(address, Action::Raise(amount))
    }

    pub fn all_in(&mut self, address: &Address) -> Result<(), TableError> {
        self.act(address, Action::AllIn)
    }

    /// Leave the table. Chips still on the seat are cashed out once the seat
    /// is vacated.
    pub fn leave(&mut self, address: &Address) -> Result<(), TableError> {
        self.depart(address, SeatStatus::Leave)
    }

    /// The player's connection dropped.
    pub fn disconnect(&mut self, address: &Address) -> Result<(), TableError> {
        self.depart(address, SeatStatus::Disconnect)
    }

    /// Shut the table down. A hand in progress is called off and every
    /// seat gets back what it committed; then every seat is vacated.
    pub fn close(&mut self) -> Result<(), TableError> {
        if self.round.is_betting() {
            for seat in self.seats.iter_mut() {
                seat.stack += seat.total_bet;
                seat.bet_amount = 0;
                seat.total_bet = 0;
            }
            self.pot = 0;
            log::info!("Hand {} called off", self.epoch.hand);
        }
        for position in 0..MAX_SEATS {
            self.unseat(position);
        }
        self.bump();
        self.round = Round::Wait;
        self.current_seat = None;
        self.countdown = 0;
        self.is_lockup = false;
        self.community_cards.clear();
        self.check_conservation()?;
        Ok(())
    }

    /// Move the logical clock forward and run every continuation that comes
    /// due. Returns whether anything ran.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<bool, TableError> {
        let target = self.clock_ms + elapsed_ms;
        let mut ran = false;
        while let Some(job) = self.schedule.pop_due(target) {
            self.clock_ms = self.clock_ms.max(job.due_ms);
            if job.epoch != self.epoch {
                log::trace!("Dropping stale {:?} from {:?}", job.continuation, job.epoch);
                continue;
            }
            match job.continuation {
                Continuation::PostBigBlind => self.post_big_blind()?,
                Continuation::CountdownTick => self.countdown_tick()?,
                Continuation::DealStreet => self.deal_street()?,
                Continuation::NextHand => self.next_hand()?,
            }
            self.check_conservation()?;
            ran = true;
        }
        self.clock_ms = target;
        Ok(ran)
    }

    /// Classify the current betting round.
    pub fn round_outcome(&self) -> RoundOutcome {
        let active = self.seats.iter().filter(|s| s.is_active()).count();
        if active <= 1 {
            return RoundOutcome::Uncontested;
        }
        let actors: Vec<&Seat> = self.seats.iter().filter(|s| s.can_act()).collect();
        let matched = |s: &&Seat| s.bet_amount >= self.current_bet;
        if actors.len() < 2 && actors.iter().all(matched) {
            return RoundOutcome::Lockup;
        }
        if actors
            .iter()
            .all(|s| s.bet_amount == self.current_bet && s.status.has_acted())
        {
            return RoundOutcome::Ended;
        }
        RoundOutcome::Running
    }

    fn acting_seat(&self, address: &Address) -> Result<SeatIndex, UserError> {
        let position = self.position_of(address).ok_or(UserError::NotSeated)?;
        if !self.round.is_betting() {
            return Err(UserError::NoHandInProgress);
        }
        if self.current_seat != Some(position) {
            return Err(UserError::OutOfTurnAction);
        }
        Ok(position)
    }

    fn stake(&mut self, position: SeatIndex, amount: Chips) -> Chips {
        let moved = self.seats[position].stake(amount);
        self.last_delta = moved;
        moved
    }

    fn apply_call(&mut self, position: SeatIndex) -> Chips {
        let to_call = self
            .current_bet
            .saturating_sub(self.seats[position].bet_amount);
        self.seats[position].status = SeatStatus::Call;
        self.stake(position, to_call)
    }

    fn apply_check(&mut self, position: SeatIndex) -> Result<Chips, UserError> {
        let bet_amount = self.seats[position].bet_amount;
        if bet_amount != self.current_bet {
            return Err(UserError::CannotCheck {
                to_call: self.current_bet - bet_amount,
            });
        }
        self.seats[position].status = SeatStatus::Check;
        Ok(0)
    }

    fn apply_fold(&mut self, position: SeatIndex) -> Chips {
        self.seats[position].status = SeatStatus::Fold;
        0
    }

    fn apply_raise(&mut self, position: SeatIndex, amount: Chips) -> Result<Chips, UserError> {
        if amount < self.min_raise {
            return Err(UserError::RaiseBelowMinimum {
                amount,
                min_raise: self.min_raise,
            });
        }
        let seat = &self.seats[position];
        if amount >= seat.stack {
            return Ok(self.apply_all_in(position));
        }
        if seat.bet_amount + amount <= self.current_bet {
            return Err(UserError::RaiseNotAboveBet {
                current_bet: self.current_bet,
            });
        }
        self.current_bet = seat.bet_amount + amount;
        self.min_raise = amount;
        self.seats[position].status = SeatStatus::Raise;
        Ok(self.stake(position, amount))
    }

    fn apply_all_in(&mut self, position: SeatIndex) -> Chips {
        self.seats[position].status = SeatStatus::AllIn;
        let stack = self.seats[position].stack;
        let moved = self.stake(position, stack);
        let bet_amount = self.seats[position].bet_amount;
        if bet_amount > self.current_bet {
            self.current_bet = bet_amount;
            self.min_raise = self.min_raise.max(moved);
        }
        moved
    }

    /// Run the completion check after `from` acted and move the hand along.
    fn advance_flow(&mut self, from: SeatIndex) -> Result<(), TableError> {
        self.bump();
        match self.round_outcome() {
            RoundOutcome::Uncontested => self.settle_hand(false),
            RoundOutcome::Lockup => self.enter_lockup(),
            RoundOutcome::Ended => self.end_round(),
            RoundOutcome::Running => {
                let next = next_actor_seat(&self.seats, from)?;
                self.start_turn(next);
                Ok(())
            }
        }
    }

    fn start_turn(&mut self, position: SeatIndex) {
        self.current_seat = Some(position);
        self.countdown = self.settings.countdown_ticks;
        self.schedule_in(TICK_MS, Continuation::CountdownTick);
    }

    fn countdown_tick(&mut self) -> Result<(), TableError> {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            self.schedule_in(TICK_MS, Continuation::CountdownTick);
            return Ok(());
        }
        let Some(position) = self.current_seat else {
            return Ok(());
        };
        log::info!("Seat {} ran out of time and folds", position);
        self.events.push_back(TableEvent::TurnExpired { position });
        let staked = self.apply_fold(position);
        self.events.push_back(TableEvent::Acted {
            position,
            action: Action::Fold,
            amount: staked,
        });
        self.advance_flow(position)
    }

    /// Move the current round's bets into the pot.
    fn sweep_bets(&mut self) {
        for seat in self.seats.iter_mut() {
            self.pot += seat.bet_amount;
            seat.bet_amount = 0;
        }
    }

    fn deal(&mut self) -> Result<Card, InvariantViolation> {
        self.deck.deal_card().ok_or(InvariantViolation::DeckExhausted)
    }

    /// Reveal the next street. Returns `false` after the river.
    fn reveal_next_street(&mut self) -> Result<bool, TableError> {
        let Some((next, count)) = self.round.next_street() else {
            return Ok(false);
        };
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            cards.push(self.deal()?);
        }
        self.community_cards.extend(cards.iter().copied());
        self.round = next;
        log::debug!("Dealt {} ({} community cards)", next, self.community_cards.len());
        self.events
            .push_back(TableEvent::StreetDealt { round: next, cards });
        Ok(true)
    }

    fn end_round(&mut self) -> Result<(), TableError> {
        self.sweep_bets();
        for seat in self.seats.iter_mut().filter(|s| s.can_act()) {
            seat.status = SeatStatus::None;
        }
        self.current_bet = 0;
        self.min_raise = self.settings.big_blind;
        self.current_seat = None;

        if self.reveal_next_street()? {
            let first = next_actor_seat(&self.seats, self.dealer_seat)?;
            self.start_turn(first);
            Ok(())
        } else {
            self.settle_hand(true)
        }
    }

    fn enter_lockup(&mut self) -> Result<(), TableError> {
        self.sweep_bets();
        self.is_lockup = true;
        self.current_seat = None;
        self.countdown = 0;
        log::info!("Hand {} locked up", self.epoch.hand);
        self.events.push_back(TableEvent::Lockup);
        self.schedule_in(self.settings.street_delay_ms, Continuation::DealStreet);
        Ok(())
    }

    fn deal_street(&mut self) -> Result<(), TableError> {
        self.bump();
        if self.reveal_next_street()? {
            self.schedule_in(self.settings.street_delay_ms, Continuation::DealStreet);
            Ok(())
        } else {
            self.settle_hand(true)
        }
    }

    fn settle_hand(&mut self, showdown: bool) -> Result<(), TableError> {
        self.sweep_bets();
        self.current_seat = None;
        self.countdown = 0;

        let contenders: Vec<Contender> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_seated() && s.total_bet > 0)
            .map(|(position, s)| Contender {
                position,
                total_bet: s.total_bet,
                folded: !s.is_active(),
                hole_cards: s.hole_cards.clone(),
            })
            .collect();
        let settlement = settle(&contenders, &self.community_cards, self.ranker.as_ref());

        if settlement.total_paid() != u64::from(self.pot) {
            let violation = InvariantViolation::SettlementMismatch {
                pot: u64::from(self.pot),
                paid: settlement.total_paid(),
            };
            log::error!("Hand {}: {}", self.epoch.hand, violation);
            return Err(violation.into());
        }

        for (position, &prize) in settlement.prizes.iter().enumerate() {
            if prize > 0 {
                self.seats[position].stack += prize;
                self.events
                    .push_back(TableEvent::Prize { position, amount: prize });
            }
        }
        log::info!(
            "Hand {} settled: pot {} in {} slice(s){}",
            self.epoch.hand,
            self.pot,
            settlement.slices.len(),
            if showdown { " at showdown" } else { "" }
        );

        self.pot = 0;
        self.round = Round::Settle;
        self.showdown = showdown;
        self.last_settlement = Some(settlement);
        self.bump();
        self.schedule_in(self.settings.settle_delay_ms, Continuation::NextHand);
        Ok(())
    }

    fn unseat(&mut self, position: SeatIndex) {
        let seat = mem::take(&mut self.seats[position]);
        self.departures[position] = None;
        if let Some(address) = seat.address {
            self.chips_in_play -= u64::from(seat.stack);
            log::info!("{} left seat {} with {}", address, position, seat.stack);
            self.events.push_back(TableEvent::Unseated {
                address,
                position,
                stack: seat.stack,
            });
        }
    }

    /// Tidy up after a hand and either deal the next one or go idle.
    fn next_hand(&mut self) -> Result<(), TableError> {
        for position in 0..MAX_SEATS {
            let seat = &self.seats[position];
            if !seat.is_seated() {
                continue;
            }
            let leaving = self.departures[position].is_some()
                || matches!(seat.status, SeatStatus::Leave | SeatStatus::Disconnect);
            if leaving || seat.stack == 0 {
                self.unseat(position);
                continue;
            }
            let seat = &mut self.seats[position];
            seat.hole_cards.clear();
            seat.bet_amount = 0;
            seat.total_bet = 0;
            seat.status = SeatStatus::None;
        }
        self.community_cards.clear();
        self.current_seat = None;
        self.countdown = 0;
        self.is_lockup = false;

        if self.ready_count() >= 2 {
            self.start_hand()
        } else {
            if self.round != Round::Wait {
                log::info!("Not enough players, table is waiting");
            }
            self.round = Round::Wait;
            self.showdown = false;
            self.last_settlement = None;
            Ok(())
        }
    }

    fn start_hand(&mut self) -> Result<(), TableError> {
        self.epoch = Epoch {
            hand: self.epoch.hand + 1,
            step: 0,
        };
        let seed = self
            .settings
            .deck_seed
            .map(|seed| seed.wrapping_add(self.epoch.hand));
        self.deck = Deck::shuffled(seed);
        self.dealer_seat = next_ready_seat(&self.seats, self.dealer_seat)?;

        for position in 0..MAX_SEATS {
            if self.seats[position].is_ready() {
                let mut hole_cards = Vec::with_capacity(HOLE_CARDS);
                for _ in 0..HOLE_CARDS {
                    hole_cards.push(self.deal()?);
                }
                self.seats[position].reset_for_hand(hole_cards);
            }
        }

        self.community_cards.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.min_raise = self.settings.big_blind;
        self.round = Round::Preflop;
        self.is_lockup = false;
        self.showdown = false;
        self.last_settlement = None;
        self.current_seat = None;
        self.countdown = 0;
        log::info!(
            "Hand {} started, dealer at seat {}",
            self.epoch.hand,
            self.dealer_seat
        );
        self.events.push_back(TableEvent::HandStarted {
            hand: self.epoch.hand,
            dealer: self.dealer_seat,
        });

        self.small_blind_seat = next_active_seat(&self.seats, self.dealer_seat)?;
        self.post_blind(
            self.small_blind_seat,
            self.settings.small_blind,
            SeatStatus::SmallBlind,
        );
        self.schedule_in(
            self.settings.animation_delay_ms,
            Continuation::PostBigBlind,
        );
        Ok(())
    }

    fn post_blind(&mut self, position: SeatIndex, amount: Chips, status: SeatStatus) {
        self.seats[position].status = status;
        let moved = self.stake(position, amount);
        self.current_bet = self.current_bet.max(self.seats[position].bet_amount);
        self.events.push_back(TableEvent::BlindPosted {
            position,
            amount: moved,
        });
    }

    fn post_big_blind(&mut self) -> Result<(), TableError> {
        let big_blind_seat = next_active_seat(&self.seats, self.small_blind_seat)?;
        self.post_blind(big_blind_seat, self.settings.big_blind, SeatStatus::BigBlind);
        self.min_raise = self.settings.big_blind;
        self.advance_flow(big_blind_seat)
    }

    fn depart(&mut self, address: &Address, status: SeatStatus) -> Result<(), TableError> {
        let position = self.position_of(address).ok_or(UserError::NotSeated)?;
        let seat = &self.seats[position];
        let in_hand = self.round.is_betting() && !seat.hole_cards.is_empty();

        if !in_hand {
            self.unseat(position);
        } else if seat.status == SeatStatus::AllIn || self.is_lockup {
            // Chips already committed stay in contention until the hand ends.
            self.departures[position] = Some(status);
        } else {
            let was_active = seat.is_active();
            self.seats[position].status = status;
            log::info!("Seat {} {} mid-hand", position, status);
            if was_active {
                let outcome = self.round_outcome();
                let turn_live = self.current_seat.is_some();
                if self.current_seat == Some(position)
                    || outcome == RoundOutcome::Uncontested
                    || (turn_live && outcome != RoundOutcome::Running)
                {
                    self.advance_flow(position)?;
                }
            }
        }
        self.check_conservation()?;
        Ok(())
    }

    fn check_conservation(&self) -> Result<(), InvariantViolation> {
        let counted: u64 = self
            .seats
            .iter()
            .map(|s| u64::from(s.stack) + u64::from(s.bet_amount))
            .sum::<u64>()
            + u64::from(self.pot);
        if counted != self.chips_in_play {
            let violation = InvariantViolation::ChipConservation {
                expected: self.chips_in_play,
                counted,
            };
            log::error!("Hand {}: {}", self.epoch.hand, violation);
            return Err(violation);
        }
        Ok(())
    }
}
