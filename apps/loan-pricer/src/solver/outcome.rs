//! Solve outcomes.

use serde::Serialize;

/// Accepted calibration result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Solution {
    /// Solved rate or fee.
    pub value: f64,
    /// Minimizer argument at the solution (strike for rates, fee for fees).
    pub argument: f64,
    /// Position of the accepted guess in the guess sequence.
    pub guess_index: usize,
    /// Starting point that led to the solution.
    pub initial_guess: f64,
    /// Objective value at the solution.
    pub objective: f64,
    /// Minimizer iterations spent on the accepted guess.
    pub iterations: u32,
}

/// Result of a rate or fee calibration.
///
/// Failure to find a fair value is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    /// A guess converged below the acceptance threshold.
    Solved(Solution),
    /// Every guess was exhausted without an accepted candidate.
    NoSolution {
        /// Number of guesses tried.
        guesses_tried: usize,
    },
}

impl SolveOutcome {
    /// Solved value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Solved(solution) => Some(solution.value),
            Self::NoSolution { .. } => None,
        }
    }

    /// Full solution, if any.
    #[must_use]
    pub const fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Solved(solution) => Some(solution),
            Self::NoSolution { .. } => None,
        }
    }

    /// Whether a solution was found.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_solution_has_no_value() {
        let outcome = SolveOutcome::NoSolution { guesses_tried: 20 };
        assert!(!outcome.is_solved());
        assert_eq!(outcome.value(), None);
        assert!(outcome.solution().is_none());
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let outcome = SolveOutcome::NoSolution { guesses_tried: 3 };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["status"], "no_solution");
        assert_eq!(json["guesses_tried"], 3);

        let solved = SolveOutcome::Solved(Solution {
            value: 0.05,
            argument: 70.3,
            guess_index: 3,
            initial_guess: 80.0,
            objective: 1e-9,
            iterations: 7,
        });
        let json = serde_json::to_value(solved).unwrap();
        assert_eq!(json["status"], "solved");
        assert_eq!(json["guess_index"], 3);
    }
}
