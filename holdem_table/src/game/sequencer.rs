//! Turn order around the table.

use super::{
    constants::MAX_SEATS,
    entities::{Seat, SeatIndex},
    errors::InvariantViolation,
};

/// Scan clockwise from the seat after `from` for the first seat matching
/// `predicate`. `from` itself is checked last.
fn next_seat_where<F>(
    seats: &[Seat; MAX_SEATS],
    from: SeatIndex,
    predicate: F,
) -> Result<SeatIndex, InvariantViolation>
where
    F: Fn(&Seat) -> bool,
{
    (1..=MAX_SEATS)
        .map(|offset| (from + offset) % MAX_SEATS)
        .find(|&idx| predicate(&seats[idx]))
        .ok_or(InvariantViolation::NoActiveSeats)
}

/// Next seated seat still contesting the hand, skipping folded, joining,
/// leaving and disconnected seats.
pub fn next_active_seat(
    seats: &[Seat; MAX_SEATS],
    from: SeatIndex,
) -> Result<SeatIndex, InvariantViolation> {
    next_seat_where(seats, from, Seat::is_active)
}

/// Next active seat that can still put chips in; all-in seats never act.
pub fn next_actor_seat(
    seats: &[Seat; MAX_SEATS],
    from: SeatIndex,
) -> Result<SeatIndex, InvariantViolation> {
    next_seat_where(seats, from, Seat::can_act)
}

/// Next seat that can be dealt into a new hand.
pub fn next_ready_seat(
    seats: &[Seat; MAX_SEATS],
    from: SeatIndex,
) -> Result<SeatIndex, InvariantViolation> {
    next_seat_where(seats, from, Seat::is_ready)
}
