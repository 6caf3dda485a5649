//! Resource-exploit detection.
//!
//! A target's expansion is turned into a single balance equation: the
//! weighted sum of the base materials it consumes equals one unit of the
//! target. With one equation, the solution set is unique only when exactly
//! one base material is involved; two or more leave a continuum of
//! consistent assignments, which is reported as an exploit.

use crate::error::CraftError;
use crate::expand::{EquationBuilder, expand};
use crate::linear::{LinearSystem, SolutionSet};
use crate::registry::Registry;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of exploit detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExploitVerdict {
    NoExploit,
    ExploitDetected,
}

/// The balance equation behind a verdict, for boundaries that want to
/// explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitReport {
    pub target: String,
    /// Left-hand side terms `(base material, coefficient)`; the right-hand
    /// side is always 1.
    pub equation: Vec<(String, BigInt)>,
    /// Rank of the coefficient matrix. Fewer pivots than base materials
    /// leaves some materials free.
    pub rank: usize,
    pub solutions: SolutionSet,
    pub verdict: ExploitVerdict,
}

/// Build and classify the balance equation of `target`.
pub fn analyze_exploit(registry: &Registry, target: &str) -> Result<ExploitReport, CraftError> {
    let mut builder = EquationBuilder::default();
    let root = expand(registry, target, &mut builder)?;
    let target = registry.name(root).to_string();

    let equation: Vec<(String, BigInt)> = builder
        .into_terms()
        .into_iter()
        .map(|(id, coefficient)| (registry.name(id).to_string(), coefficient))
        .collect();
    if equation.is_empty() {
        return Err(CraftError::NoSolution(target));
    }

    let mut system = LinearSystem::new();
    system.add_equation(
        equation
            .iter()
            .map(|(name, coefficient)| (name.as_str(), BigRational::from_integer(coefficient.clone()))),
        BigRational::one(),
    );

    let solutions = system.solve();
    if solutions == SolutionSet::None {
        return Err(CraftError::NoSolution(target));
    }
    let rank = system.rank();
    let verdict = if solutions.is_infinite() {
        ExploitVerdict::ExploitDetected
    } else {
        ExploitVerdict::NoExploit
    };

    match verdict {
        ExploitVerdict::ExploitDetected => warn!(
            item = %target,
            variables = system.variable_count(),
            rank,
            "multiple distinct solutions exist for crafting the target"
        ),
        ExploitVerdict::NoExploit => debug!(item = %target, "no resource exploit detected"),
    }

    Ok(ExploitReport {
        target,
        equation,
        rank,
        solutions,
        verdict,
    })
}

/// Whether `target`'s balance equation admits more than one solution.
pub fn detect_exploit(registry: &Registry, target: &str) -> Result<ExploitVerdict, CraftError> {
    analyze_exploit(registry, target).map(|report| report.verdict)
}
