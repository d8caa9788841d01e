//! Multi-start acceptance loop.

use tracing::debug;

use super::minimizer::{BoundedMinimizer, Bounds, Minimum};

/// Candidate accepted by [`first_accepted`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accepted {
    pub guess_index: usize,
    pub initial_guess: f64,
    pub minimum: Minimum,
}

/// Run the minimizer from each guess in order and return the first candidate
/// that succeeded with an objective below `threshold`.
///
/// Later guesses are never compared against an earlier accepted one.
pub(crate) fn first_accepted<M>(
    minimizer: &M,
    objective: &dyn Fn(f64) -> f64,
    guesses: impl IntoIterator<Item = f64>,
    bounds: Bounds,
    threshold: f64,
) -> Option<Accepted>
where
    M: BoundedMinimizer + ?Sized,
{
    for (guess_index, initial_guess) in guesses.into_iter().enumerate() {
        let minimum = minimizer.minimize(objective, initial_guess, bounds);

        if minimum.success() && minimum.value < threshold {
            debug!(
                guess_index,
                initial_guess,
                x = minimum.x,
                objective = minimum.value,
                iterations = minimum.iterations,
                "Accepted candidate"
            );
            return Some(Accepted {
                guess_index,
                initial_guess,
                minimum,
            });
        }

        debug!(
            guess_index,
            initial_guess,
            x = minimum.x,
            objective = minimum.value,
            termination = ?minimum.termination,
            "Rejected candidate"
        );
    }
    None
}
