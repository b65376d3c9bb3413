//! A brute-force fitter for standard component values.
//!
//! Given a formula over free variables (say, two resistors in a divider) and
//! a target value, it evaluates the formula at every combination of candidate
//! values drawn from a standard E-series and ranks the combinations by how
//! far the formula lands from the target. No algebra required: the search is
//! exhaustive, so the true best combination is always found.
//!
//! # Example
//! Pick E12 values for `r1` and `r2` so that the gain `20*log10(1+r1/r2)`
//! comes as close to 24 dB as possible:
//! ```rust no_run
//! use eseries_fit::{write_report, Search, E12};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut search = Search::new(
//!         "abs(20*log10(1+r1/r2)-24)",
//!         "20*log10(1+r1/r2)",
//!         &[],
//!     )?;
//!
//!     let grid = E12.grid(&[1e2, 1e3, 1e4, 1e5, 1e6]);
//!     for name in search.variables() {
//!         search.set_grid(&name, grid.clone())?;
//!     }
//!     println!("Number of combinations: {}", search.combinations());
//!
//!     let results = search.run()?;
//!     write_report(&mut std::io::stdout(), "20*log10(1+r1/r2)", &results)?;
//!     Ok(())
//! }
//! ```
//! The report is tab-separated, one line per combination in ascending error
//! order, with the variable columns rounded to whole component values.

use itertools::Itertools;
use lazy_static::lazy_static;

pub mod formula;
pub mod report;
pub mod search;

pub use formula::{Formula, FormulaError};
pub use report::write_report;
pub use search::{Candidate, ResultSet, Search, SearchError};

lazy_static! {
    /// ValueSeries constant for the E12 standard series.
    pub static ref E12: ValueSeries = ValueSeries::new(&[
        1.0, 1.2, 1.5, 1.8, 2.2, 2.7, 3.3, 3.9, 4.7, 5.6, 6.8, 8.2,
    ]);
    /// ValueSeries constant for the E24 standard series.
    pub static ref E24: ValueSeries = ValueSeries::new(&[
        1.0, 1.1, 1.2, 1.3, 1.5, 1.6, 1.8, 2.0, 2.2, 2.4, 2.7, 3.0, 3.3, 3.6,
        3.9, 4.3, 4.7, 5.1, 5.6, 6.2, 6.8, 7.5, 8.2, 9.1,
    ]);
}

/// One decade of a standard component series, as ordered mantissas in
/// `[1.0, 10.0)`.
///
/// Constants are provided for the common series ([`struct@E12`],
/// [`struct@E24`]); custom series can be built with [`ValueSeries::new`].
#[derive(Debug, Clone)]
pub struct ValueSeries {
    mantissas: Box<[f64]>,
}

impl ValueSeries {
    pub fn new(mantissas: &[f64]) -> Self {
        ValueSeries {
            mantissas: mantissas.to_vec().into_boxed_slice(),
        }
    }

    /// Number of mantissas in one decade of the series.
    pub fn len(&self) -> usize {
        self.mantissas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mantissas.is_empty()
    }

    /// Expands the series into concrete candidate values, one per
    /// (mantissa, multiplier) pair.
    ///
    /// Mantissas iterate outermost: entry `i * multipliers.len() + j` is
    /// `mantissas[i] * multipliers[j]`. The output is neither sorted nor
    /// deduplicated; an empty series or multiplier list gives an empty grid.
    pub fn grid(&self, multipliers: &[f64]) -> Vec<f64> {
        self.mantissas
            .iter()
            .cartesian_product(multipliers.iter())
            .map(|(val, mul)| val * mul)
            .collect()
    }
}

/// Selects which standard series candidate values are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeriesKind {
    E12,
    E24,
}

impl SeriesKind {
    pub fn series(self) -> &'static ValueSeries {
        match self {
            SeriesKind::E12 => &E12,
            SeriesKind::E24 => &E24,
        }
    }
}
