//! Exhaustive search over per-variable candidate grids.
//!
//! The engine walks the full cartesian product of the grids, evaluates an
//! objective formula (what is minimised) and a result formula (what is
//! reported) at each assignment, and returns every combination ranked by
//! ascending error. There is no pruning: grid sizes are small enough that
//! exhaustiveness is cheap, and it guarantees the true minimum is found.

use std::cmp::Ordering;

use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;

use crate::formula::{Formula, FormulaError};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("variable '{0}' has no candidate grid")]
    MissingGrid(String),
}

/// One evaluated combination of candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Objective-formula value at this assignment; what the ranking
    /// minimises. May be non-finite.
    pub error: f64,
    /// Result-formula value at the same assignment.
    pub result: f64,
    values: Box<[f64]>,
}

impl Candidate {
    /// The assigned values, in canonical variable order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value assigned to the `idx`-th variable (canonical order).
    pub fn value(&self, idx: usize) -> f64 {
        self.values[idx]
    }
}

/// Ascending f64 ordering extended to a total order: `NaN` compares greater
/// than every non-NaN value and equal to itself, so out-of-domain
/// candidates always rank last.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn cmp_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    cmp_f64(a.error, b.error)
        .then_with(|| cmp_f64(a.result, b.result))
        .then_with(|| {
            a.values
                .iter()
                .zip(b.values.iter())
                .map(|(x, y)| cmp_f64(*x, *y))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
}

/// Ranked outcome of a search.
#[derive(Debug)]
pub struct ResultSet {
    names: Vec<String>,
    candidates: Vec<Candidate>,
}

impl ResultSet {
    fn new(names: Vec<String>) -> Self {
        ResultSet {
            names,
            candidates: Vec::new(),
        }
    }

    /// Variable names in canonical (first-seen) order; this is also the
    /// column order of every candidate's values.
    pub fn variables(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates from lowest to highest error.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// The lowest-error candidate, if any.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Stable in-place sort by error, ties broken by result and then each
    /// value in order, so output is reproducible across runs.
    fn rank(&mut self) {
        self.candidates.sort_by(cmp_candidates);
    }
}

#[derive(Debug)]
struct SearchVar {
    name: String,
    grid: Option<Vec<f64>>,
}

/// Brute-force searcher over candidate grids.
///
/// Built once per run from the objective and result formula text; grids are
/// assigned per variable and [`Search::run`] consumes the searcher and
/// produces the ranked [`ResultSet`].
#[derive(Debug)]
pub struct Search {
    objective: Formula,
    result: Formula,
    vars: Vec<SearchVar>,
}

impl Search {
    /// Compiles both formulas and fixes the search-variable order.
    ///
    /// Free variables are discovered from the objective text; any that
    /// appear in `constants` are bound once on both formulas and excluded
    /// from the search. A constant the formulas never mention is declared
    /// and ignored. The result formula may only reference identifiers the
    /// objective declares.
    pub fn new(
        objective_text: &str,
        result_text: &str,
        constants: &[(String, f64)],
    ) -> Result<Search, SearchError> {
        let mut declared = Formula::discover(objective_text)?;
        for (name, _) in constants {
            if !declared.contains(name) {
                declared.push(name.clone());
            }
        }

        let mut objective = Formula::compile(objective_text, &declared)?;
        let mut result = Formula::compile(result_text, &declared)?;
        for (name, value) in constants {
            objective.bind(name, *value)?;
            result.bind(name, *value)?;
        }

        let vars = declared
            .iter()
            .filter(|name| !constants.iter().any(|(c, _)| c == *name))
            .map(|name| SearchVar {
                name: name.clone(),
                grid: None,
            })
            .collect();

        Ok(Search {
            objective,
            result,
            vars,
        })
    }

    /// Search-variable names in canonical order.
    pub fn variables(&self) -> Vec<String> {
        self.vars.iter().map(|v| v.name.clone()).collect()
    }

    /// Assigns the candidate grid for one search variable.
    pub fn set_grid(&mut self, name: &str, grid: Vec<f64>) -> Result<(), SearchError> {
        match self.vars.iter_mut().find(|v| v.name == name) {
            Some(var) => {
                var.grid = Some(grid);
                Ok(())
            }
            None => Err(FormulaError::UnknownVariable(name.to_string()).into()),
        }
    }

    /// Number of combinations the search will evaluate.
    pub fn combinations(&self) -> u128 {
        self.vars
            .iter()
            .map(|v| v.grid.as_ref().map_or(0, Vec::len) as u128)
            .product()
    }

    /// Runs the exhaustive search and returns the ranked results.
    ///
    /// Any evaluation failure (an unbound variable points at a
    /// configuration bug, not bad data) aborts the whole search.
    /// Non-finite errors or results are kept as candidates and simply rank
    /// last.
    pub fn run(self) -> Result<ResultSet, SearchError> {
        let total = self.combinations();
        let Search {
            mut objective,
            mut result,
            vars,
        } = self;

        let names: Vec<String> = vars.iter().map(|v| v.name.clone()).collect();
        let mut grids: Vec<&[f64]> = Vec::with_capacity(vars.len());
        for var in &vars {
            match &var.grid {
                Some(grid) => grids.push(grid),
                None => return Err(SearchError::MissingGrid(var.name.clone())),
            }
        }

        let mut results = ResultSet::new(names.clone());

        if names.is_empty() {
            // A closed formula still produces one record.
            let error = objective.eval()?;
            let value = result.eval()?;
            results.candidates.push(Candidate {
                error,
                result: value,
                values: Vec::new().into_boxed_slice(),
            });
            return Ok(results);
        }

        info!(
            "searching {} combinations over {}",
            total,
            names.join(", ")
        );

        for assignment in grids
            .iter()
            .map(|g| g.iter().copied())
            .multi_cartesian_product()
        {
            for (name, value) in names.iter().zip(&assignment) {
                objective.bind(name, *value)?;
                result.bind(name, *value)?;
            }
            let error = objective.eval()?;
            let value = result.eval()?;
            results.candidates.push(Candidate {
                error,
                result: value,
                values: assignment.into_boxed_slice(),
            });
        }

        results.rank();
        if let Some(best) = results.best() {
            debug!("best error {} at {:?}", best.error, best.values());
        }
        Ok(results)
    }
}
