use super::{error::RatingError, structures::participant::Participant};

/// `sqrt(sum(volatility^2) / n + sum(rating^2) / (n - 1))` over the roster.
///
/// Scales performance differences (rank space) into rating points for this
/// particular field.
pub fn competition_factor(roster: &[Participant]) -> Result<f64, RatingError> {
    let n = roster.len();
    if n < 2 {
        return Err(RatingError::invalid_roster(format!(
            "competition factor needs at least 2 participants, found {}",
            n
        )));
    }

    let (volatility_sq, rating_sq) = roster.iter().fold((0.0, 0.0), |(v, r), p| {
        (v + p.volatility * p.volatility, r + p.rating * p.rating)
    });

    Ok((volatility_sq / n as f64 + rating_sq / (n - 1) as f64).sqrt())
}
