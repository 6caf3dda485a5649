//! Exact linear systems over the rationals.
//!
//! A [`LinearSystem`] is a list of equations `sum(coefficient * variable) =
//! rhs` with `BigRational` coefficients. [`LinearSystem::solve`] reduces the
//! augmented matrix to reduced row-echelon form with Gauss-Jordan
//! elimination and classifies the solution set:
//!
//! - inconsistent (a row reads `0 = c` with `c != 0`) -> [`SolutionSet::None`]
//! - `rank == variables` -> [`SolutionSet::Unique`]
//! - `rank < variables` -> [`SolutionSet::Infinite`]
//!
//! No floating point is involved, so the classification is exact.

use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::HashMap;

/// Cardinality of a system's solution set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionSet {
    /// The equations contradict each other.
    None,
    /// Exactly one assignment, as `(variable, value)` in column order.
    Unique(Vec<(String, BigRational)>),
    /// A continuum of assignments. Lists the variables left free.
    Infinite { free_variables: Vec<String> },
}

impl SolutionSet {
    pub fn is_unique(&self) -> bool {
        matches!(self, SolutionSet::Unique(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, SolutionSet::Infinite { .. })
    }
}

/// A system of linear equations. Variables are columns, added on first use.
#[derive(Debug, Clone, Default)]
pub struct LinearSystem {
    variables: Vec<String>,
    columns: HashMap<String, usize>,
    /// Coefficient rows; shorter than `variables` means trailing zeros.
    rows: Vec<Vec<BigRational>>,
    rhs: Vec<BigRational>,
}

impl LinearSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable without using it in any equation yet.
    pub fn add_variable(&mut self, name: &str) -> usize {
        if let Some(&col) = self.columns.get(name) {
            return col;
        }
        let col = self.variables.len();
        self.variables.push(name.to_string());
        self.columns.insert(name.to_string(), col);
        col
    }

    /// Add `sum(terms) = rhs`. Repeated variables in `terms` are summed.
    pub fn add_equation<I, S>(&mut self, terms: I, rhs: BigRational)
    where
        I: IntoIterator<Item = (S, BigRational)>,
        S: AsRef<str>,
    {
        let mut row: Vec<BigRational> = Vec::new();
        for (name, coefficient) in terms {
            let col = self.add_variable(name.as_ref());
            if row.len() <= col {
                row.resize(col + 1, BigRational::zero());
            }
            row[col] += coefficient;
        }
        self.rows.push(row);
        self.rhs.push(rhs);
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn equation_count(&self) -> usize {
        self.rows.len()
    }

    /// Rank of the coefficient matrix.
    pub fn rank(&self) -> usize {
        self.reduce().1.len()
    }

    /// Classify (and, when unique, compute) the solution set.
    pub fn solve(&self) -> SolutionSet {
        let n = self.variables.len();
        let (matrix, pivots) = self.reduce();
        let rank = pivots.len();

        // Rows below the rank have all-zero coefficients after reduction.
        if matrix[rank..].iter().any(|row| !row[n].is_zero()) {
            return SolutionSet::None;
        }

        if rank == n {
            let values = pivots
                .iter()
                .enumerate()
                .map(|(row, &col)| (self.variables[col].clone(), matrix[row][n].clone()))
                .collect();
            return SolutionSet::Unique(values);
        }

        let free_variables = (0..n)
            .filter(|col| !pivots.contains(col))
            .map(|col| self.variables[col].clone())
            .collect();
        SolutionSet::Infinite { free_variables }
    }

    /// Gauss-Jordan elimination on the augmented matrix. Returns the reduced
    /// matrix (rhs in the last column) and the pivot column of each leading
    /// row.
    fn reduce(&self) -> (Vec<Vec<BigRational>>, Vec<usize>) {
        let n = self.variables.len();
        let mut matrix: Vec<Vec<BigRational>> = self
            .rows
            .iter()
            .zip(&self.rhs)
            .map(|(row, rhs)| {
                let mut full = row.clone();
                full.resize(n, BigRational::zero());
                full.push(rhs.clone());
                full
            })
            .collect();

        let mut pivots = Vec::new();
        let mut lead = 0;
        for col in 0..n {
            if lead == matrix.len() {
                break;
            }
            let Some(found) = (lead..matrix.len()).find(|&r| !matrix[r][col].is_zero()) else {
                continue;
            };
            matrix.swap(lead, found);

            let scale = BigRational::one() / &matrix[lead][col];
            for value in matrix[lead].iter_mut() {
                *value = &*value * &scale;
            }

            let pivot_row = matrix[lead].clone();
            for (r, row) in matrix.iter_mut().enumerate() {
                if r == lead || row[col].is_zero() {
                    continue;
                }
                let factor = row[col].clone();
                for (value, pivot) in row.iter_mut().zip(&pivot_row) {
                    let delta = &factor * pivot;
                    *value = &*value - &delta;
                }
            }

            pivots.push(col);
            lead += 1;
        }

        (matrix, pivots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn frac(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn single_variable_is_unique() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("wood", q(3))], q(1));
        assert_eq!(
            sys.solve(),
            SolutionSet::Unique(vec![("wood".to_string(), frac(1, 3))])
        );
        assert_eq!(sys.rank(), 1);
    }

    #[test]
    fn one_equation_two_variables_is_infinite() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("wood", q(2)), ("iron", q(1))], q(1));
        assert_eq!(
            sys.solve(),
            SolutionSet::Infinite {
                free_variables: vec!["iron".to_string()]
            }
        );
    }

    #[test]
    fn square_system_solves_exactly() {
        // x + y = 3, x - y = 1  ->  x = 2, y = 1
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(1)), ("y", q(1))], q(3));
        sys.add_equation([("x", q(1)), ("y", q(-1))], q(1));
        assert_eq!(
            sys.solve(),
            SolutionSet::Unique(vec![("x".to_string(), q(2)), ("y".to_string(), q(1))])
        );
    }

    #[test]
    fn thirds_stay_exact() {
        // 3x = 1, 3y = 2, x + y = 1 is consistent only with exact arithmetic.
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(3))], q(1));
        sys.add_equation([("y", q(3))], q(2));
        sys.add_equation([("x", q(1)), ("y", q(1))], q(1));
        assert!(sys.solve().is_unique());
        assert_eq!(sys.rank(), 2);
    }

    #[test]
    fn contradiction_has_no_solution() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(1)), ("y", q(1))], q(1));
        sys.add_equation([("x", q(2)), ("y", q(2))], q(3));
        assert_eq!(sys.solve(), SolutionSet::None);
    }

    #[test]
    fn dependent_rows_do_not_raise_rank() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(1)), ("y", q(2)), ("z", q(1))], q(4));
        sys.add_equation([("x", q(2)), ("y", q(4)), ("z", q(2))], q(8));
        assert_eq!(sys.rank(), 1);
        assert!(sys.solve().is_infinite());
    }

    #[test]
    fn empty_equation_is_inconsistent() {
        let mut sys = LinearSystem::new();
        sys.add_equation(Vec::<(String, BigRational)>::new(), q(1));
        assert_eq!(sys.variable_count(), 0);
        assert_eq!(sys.solve(), SolutionSet::None);
    }

    #[test]
    fn repeated_terms_are_summed() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(1)), ("x", q(1))], q(1));
        assert_eq!(
            sys.solve(),
            SolutionSet::Unique(vec![("x".to_string(), frac(1, 2))])
        );
    }

    #[test]
    fn variable_declared_later_extends_earlier_rows() {
        let mut sys = LinearSystem::new();
        sys.add_equation([("x", q(1))], q(1));
        sys.add_equation([("y", q(1))], q(5));
        assert_eq!(sys.variable_count(), 2);
        assert_eq!(sys.equation_count(), 2);
        assert!(sys.solve().is_unique());
    }
}
