//! Bounded Scalar Minimizers
//!
//! Local minimization of a one-dimensional objective on `[lower, upper]`
//! (`upper` may be infinite):
//! - Projected quasi-Newton: finite-difference gradient, secant curvature,
//!   Armijo backtracking, projection onto the bounds. Starts from a guess.
//! - Golden-section: derivative-free bracketing over the bounded interval.
//!
//! Both implement [`BoundedMinimizer`], so the calibration solvers can swap
//! one for the other without touching their guess or acceptance policy.

use serde::{Deserialize, Serialize};

// ============================================================================
// Bounds and Results
// ============================================================================

/// Closed search interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower bound (inclusive).
    pub lower: f64,
    /// Upper bound (inclusive), possibly `f64::INFINITY`.
    pub upper: f64,
}

impl Bounds {
    /// Interval `[lower, upper]`.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Interval `[lower, ∞)`.
    #[must_use]
    pub const fn at_least(lower: f64) -> Self {
        Self {
            lower,
            upper: f64::INFINITY,
        }
    }

    /// Project `x` onto the interval.
    #[must_use]
    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.lower).min(self.upper)
    }

    /// Whether both ends are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
}

/// Why a minimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Projected gradient fell below tolerance.
    GradientTolerance,
    /// Relative objective reduction fell below tolerance.
    ObjectiveTolerance,
    /// No descent step longer than the step tolerance exists.
    StepTolerance,
    /// Bracketing interval shrank below tolerance.
    IntervalTolerance,
    /// Iteration cap reached.
    MaxIterations,
    /// Objective returned NaN or infinity.
    NonFiniteObjective,
}

impl Termination {
    /// Whether this termination counts as numerical success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(
            self,
            Self::GradientTolerance
                | Self::ObjectiveTolerance
                | Self::StepTolerance
                | Self::IntervalTolerance
        )
    }
}

/// Result of a single local minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub x: f64,
    /// Objective value at `x`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: u32,
    /// Objective evaluations performed.
    pub evaluations: u32,
    /// Stopping reason.
    pub termination: Termination,
}

impl Minimum {
    /// Whether the minimizer reports numerical success.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.termination.is_success()
    }
}

/// Bounded local minimizer of a scalar function.
pub trait BoundedMinimizer: Send + Sync {
    /// Minimize `objective` on `bounds` starting from `initial`.
    ///
    /// `initial` is projected onto `bounds` before the first evaluation.
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, initial: f64, bounds: Bounds) -> Minimum;
}

/// Objective wrapper counting evaluations.
struct Counted<'a> {
    objective: &'a dyn Fn(f64) -> f64,
    evaluations: u32,
}

impl<'a> Counted<'a> {
    fn new(objective: &'a dyn Fn(f64) -> f64) -> Self {
        Self {
            objective,
            evaluations: 0,
        }
    }

    fn eval(&mut self, x: f64) -> f64 {
        self.evaluations += 1;
        (self.objective)(x)
    }
}

// ============================================================================
// Projected Quasi-Newton
// ============================================================================

/// Configuration for [`ProjectedNewton`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectedNewtonConfig {
    /// Maximum iterations per minimization.
    pub max_iterations: u32,
    /// Projected gradient tolerance.
    pub gradient_tolerance: f64,
    /// Relative objective reduction tolerance.
    pub objective_tolerance: f64,
    /// Relative step length below which the search stops.
    pub step_tolerance: f64,
    /// Relative finite-difference step.
    pub finite_diff_step: f64,
    /// Maximum step halvings per line search.
    pub max_backtracks: u32,
    /// Armijo sufficient-decrease constant.
    pub armijo: f64,
}

impl Default for ProjectedNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            gradient_tolerance: 1e-5,
            objective_tolerance: 1e7 * f64::EPSILON,
            step_tolerance: 1e-12,
            finite_diff_step: 1e-8,
            max_backtracks: 60,
            armijo: 1e-4,
        }
    }
}

/// Projected quasi-Newton local minimizer.
///
/// Each iteration takes a Newton step using the secant estimate of the
/// curvature (a unit steepest-descent step when no positive estimate is
/// available), projects it onto the bounds, and backtracks until the Armijo
/// condition holds.
#[derive(Debug, Clone, Default)]
pub struct ProjectedNewton {
    config: ProjectedNewtonConfig,
}

impl ProjectedNewton {
    /// Create a minimizer with the given configuration.
    #[must_use]
    pub const fn new(config: ProjectedNewtonConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ProjectedNewtonConfig {
        &self.config
    }

    /// Finite-difference derivative, one-sided at the bounds.
    fn gradient(&self, f: &mut Counted<'_>, x: f64, fx: f64, bounds: Bounds) -> f64 {
        let h = self.config.finite_diff_step * x.abs().max(1.0);
        let can_up = x + h <= bounds.upper;
        let can_down = x - h >= bounds.lower;

        match (can_down, can_up) {
            (true, true) => (f.eval(x + h) - f.eval(x - h)) / (2.0 * h),
            (false, true) => (f.eval(x + h) - fx) / h,
            (true, false) => (fx - f.eval(x - h)) / h,
            (false, false) => 0.0,
        }
    }

    fn step_floor(&self, x: f64) -> f64 {
        self.config.step_tolerance * x.abs().max(1.0)
    }
}

/// Zero out gradient components pushing against an active bound.
fn projected_gradient(g: f64, x: f64, bounds: Bounds) -> f64 {
    if (x <= bounds.lower && g > 0.0) || (x >= bounds.upper && g < 0.0) {
        0.0
    } else {
        g
    }
}

impl BoundedMinimizer for ProjectedNewton {
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, initial: f64, bounds: Bounds) -> Minimum {
        let mut f = Counted::new(objective);
        let mut x = bounds.clamp(initial);
        let mut fx = f.eval(x);
        let mut previous: Option<(f64, f64)> = None;

        let finish = |x: f64, value: f64, iterations: u32, evaluations: u32, termination| Minimum {
            x,
            value,
            iterations,
            evaluations,
            termination,
        };

        if !fx.is_finite() {
            return finish(x, fx, 0, f.evaluations, Termination::NonFiniteObjective);
        }

        for iteration in 1..=self.config.max_iterations {
            let g = self.gradient(&mut f, x, fx, bounds);
            if !g.is_finite() {
                return finish(x, fx, iteration, f.evaluations, Termination::NonFiniteObjective);
            }
            if projected_gradient(g, x, bounds).abs() <= self.config.gradient_tolerance {
                return finish(x, fx, iteration, f.evaluations, Termination::GradientTolerance);
            }

            let curvature = previous.and_then(|(x_prev, g_prev)| {
                let dx = x - x_prev;
                let c = (g - g_prev) / dx;
                (dx != 0.0 && c.is_finite() && c > 0.0).then_some(c)
            });
            let full_step = curvature.map_or(-g.signum(), |c| -g / c);
            let step = bounds.clamp(x + full_step) - x;

            // Armijo backtracking along the projected step
            let mut scale = 1.0;
            let mut accepted = None;
            for _ in 0..self.config.max_backtracks {
                let trial = scale * step;
                if trial.abs() <= self.step_floor(x) {
                    break;
                }
                let candidate = x + trial;
                let fc = f.eval(candidate);
                if fc.is_finite() && fc <= fx + self.config.armijo * g * trial {
                    accepted = Some((candidate, fc));
                    break;
                }
                scale *= 0.5;
            }

            let Some((x_new, f_new)) = accepted else {
                return finish(x, fx, iteration, f.evaluations, Termination::StepTolerance);
            };

            let reduction = fx - f_new;
            let reference = fx.abs().max(f_new.abs()).max(1.0);
            previous = Some((x, g));
            x = x_new;
            fx = f_new;

            if reduction <= self.config.objective_tolerance * reference {
                return finish(x, fx, iteration, f.evaluations, Termination::ObjectiveTolerance);
            }
        }

        finish(
            x,
            fx,
            self.config.max_iterations,
            f.evaluations,
            Termination::MaxIterations,
        )
    }
}

// ============================================================================
// Golden-Section Search
// ============================================================================

/// Configuration for [`GoldenSection`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldenSectionConfig {
    /// Maximum interval reductions.
    pub max_iterations: u32,
    /// Relative interval width at which the search stops.
    pub tolerance: f64,
    /// With an infinite upper bound, the interval spans this many
    /// multiples of the starting point's distance from the lower bound.
    pub unbounded_span: f64,
}

impl Default for GoldenSectionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            unbounded_span: 10.0,
        }
    }
}

/// Golden-section search over the bounded interval.
///
/// Finds the minimum of a unimodal objective; for multimodal objectives it
/// returns one of the local minima. The starting point only matters when the
/// upper bound is infinite, where it sizes the searched interval.
#[derive(Debug, Clone, Default)]
pub struct GoldenSection {
    config: GoldenSectionConfig,
}

impl GoldenSection {
    /// Create a golden-section minimizer.
    #[must_use]
    pub const fn new(config: GoldenSectionConfig) -> Self {
        Self { config }
    }
}

impl BoundedMinimizer for GoldenSection {
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, initial: f64, bounds: Bounds) -> Minimum {
        let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
        let mut f = Counted::new(objective);

        let mut a = bounds.lower;
        let mut b = if bounds.upper.is_finite() {
            bounds.upper
        } else {
            let start = bounds.clamp(initial);
            a + (start - a).abs().max(1.0) * self.config.unbounded_span
        };

        let mut c = b - inv_phi * (b - a);
        let mut d = a + inv_phi * (b - a);
        let mut fc = f.eval(c);
        let mut fd = f.eval(d);
        let mut iterations = 0;
        let mut termination = Termination::MaxIterations;

        while iterations < self.config.max_iterations {
            if !fc.is_finite() || !fd.is_finite() {
                termination = Termination::NonFiniteObjective;
                break;
            }
            if (b - a).abs() <= self.config.tolerance * (a.abs() + b.abs()).max(1.0) {
                termination = Termination::IntervalTolerance;
                break;
            }
            iterations += 1;

            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - inv_phi * (b - a);
                fc = f.eval(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + inv_phi * (b - a);
                fd = f.eval(d);
            }
        }

        let (x, value) = if fc < fd { (c, fc) } else { (d, fd) };
        Minimum {
            x,
            value,
            iterations,
            evaluations: f.evaluations,
            termination,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
