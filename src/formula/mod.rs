//! Compile-once, evaluate-many arithmetic formulas with named variables.

mod errors;
mod parser;

pub use errors::FormulaError;

use std::collections::HashMap;

use log::debug;

use self::parser::{BinOp, Expr};

/// A compiled arithmetic formula.
///
/// The text is parsed exactly once in [`Formula::compile`]; after that the
/// tree never changes and only the variable bindings mutate between
/// evaluations, so one formula can be evaluated across a whole candidate
/// grid without re-parsing.
#[derive(Debug, Clone)]
pub struct Formula {
    text: String,
    root: Expr,
    declared: Vec<String>,
    bindings: HashMap<String, f64>,
}

impl Formula {
    /// Parses `text` and checks every referenced identifier against
    /// `declared`.
    ///
    /// `declared` may be a superset of the names the text actually uses.
    /// Referencing a name outside it fails with
    /// [`FormulaError::UnboundIdentifier`] listing all missing names.
    pub fn compile(text: &str, declared: &[String]) -> Result<Formula, FormulaError> {
        let root = parser::parse(text)?;
        let mut referenced = Vec::new();
        root.collect_vars(&mut referenced);

        let missing: Vec<String> = referenced
            .iter()
            .filter(|name| !declared.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(FormulaError::UnboundIdentifier {
                formula: text.to_string(),
                names: missing,
            });
        }

        debug!("compiled '{}', variables {:?}", text, referenced);
        Ok(Formula {
            text: text.to_string(),
            root,
            declared: declared.to_vec(),
            bindings: HashMap::new(),
        })
    }

    /// Returns the variables referenced by `text` in the order they first
    /// appear. A formula without free variables yields an empty list.
    ///
    /// This is a plain parse pass that reports unresolved identifiers as
    /// data; genuine syntax errors still fail with
    /// [`FormulaError::Parse`]. Compiling `text` with the returned list
    /// always succeeds, and the list order is the canonical variable order
    /// for everything built on top of it.
    pub fn discover(text: &str) -> Result<Vec<String>, FormulaError> {
        let root = parser::parse(text)?;
        let mut vars = Vec::new();
        root.collect_vars(&mut vars);
        Ok(vars)
    }

    /// Sets or overwrites the binding for `name`. Takes effect on the next
    /// [`Formula::eval`].
    pub fn bind(&mut self, name: &str, value: f64) -> Result<(), FormulaError> {
        if !self.declared.iter().any(|n| n == name) {
            return Err(FormulaError::UnknownVariable(name.to_string()));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Evaluates the formula under the current bindings.
    ///
    /// Every referenced variable must be bound. Math-domain situations
    /// (division by zero, log of a non-positive number) are not errors:
    /// the result is `NaN` or `inf` per IEEE-754 and propagates to the
    /// caller as an ordinary value.
    pub fn eval(&self) -> Result<f64, FormulaError> {
        self.eval_expr(&self.root)
    }

    /// The original formula text.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn eval_expr(&self, expr: &Expr) -> Result<f64, FormulaError> {
        match expr {
            Expr::Num(n) => Ok(*n),
            Expr::Var(name) => self
                .bindings
                .get(name)
                .copied()
                .ok_or_else(|| FormulaError::UnboundVariable(name.clone())),
            Expr::Neg(inner) => Ok(-self.eval_expr(inner)?),
            Expr::Call(func, arg) => Ok(func.apply(self.eval_expr(arg)?)),
            Expr::Bin(op, lhs, rhs) => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                Ok(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(text: &str) -> f64 {
        Formula::compile(text, &[]).unwrap().eval().unwrap()
    }

    #[test]
    fn evaluates_closed_formula() {
        assert_eq!(closed("2*3+4"), 10.0);
        assert_eq!(closed("2+3*4"), 14.0);
        assert_eq!(closed("(2+3)*4"), 20.0);
        assert_eq!(closed("2^3^2"), 512.0);
        assert_eq!(closed("-(2+3)"), -5.0);
    }

    #[test]
    fn evaluates_functions() {
        assert_eq!(closed("abs(0-7)"), 7.0);
        assert_eq!(closed("log10(1000)"), 3.0);
        assert!((closed("log(e)") - 1.0).abs() < 1e-12);
        assert_eq!(closed("sqrt(16)"), 4.0);
        assert!((closed("20*log10(1+1000/100)") - 20.827853703164503).abs() < 1e-9);
    }

    #[test]
    fn rebinding_reuses_compiled_tree() {
        let mut f = Formula::compile("x*2", &["x".to_string()]).unwrap();
        f.bind("x", 5.0).unwrap();
        assert_eq!(f.eval().unwrap(), 10.0);
        f.bind("x", 7.0).unwrap();
        assert_eq!(f.eval().unwrap(), 14.0);
    }

    #[test]
    fn discover_returns_first_seen_order() {
        assert_eq!(
            Formula::discover("20*log10(1+r1/r2)").unwrap(),
            ["r1", "r2"]
        );
        assert_eq!(Formula::discover("abs(b)+a*b").unwrap(), ["b", "a"]);
        assert!(Formula::discover("2*pi+1").unwrap().is_empty());
    }

    #[test]
    fn discover_propagates_syntax_errors() {
        assert!(matches!(
            Formula::discover("a + (b"),
            Err(FormulaError::Parse { .. })
        ));
    }

    #[test]
    fn compile_rejects_undeclared_identifiers() {
        let err = Formula::compile("x+y*z", &["x".to_string()]).unwrap_err();
        match err {
            FormulaError::UnboundIdentifier { names, .. } => {
                assert_eq!(names, ["y", "z"]);
            }
            other => panic!("expected UnboundIdentifier, got {:?}", other),
        }
    }

    #[test]
    fn compile_accepts_declared_superset() {
        let declared = vec!["x".to_string(), "unused".to_string()];
        assert!(Formula::compile("x+1", &declared).is_ok());
    }

    #[test]
    fn bind_rejects_undeclared_name() {
        let mut f = Formula::compile("x", &["x".to_string()]).unwrap();
        assert_eq!(
            f.bind("y", 1.0).unwrap_err(),
            FormulaError::UnknownVariable("y".to_string())
        );
    }

    #[test]
    fn eval_requires_all_bindings() {
        let f = Formula::compile("x+1", &["x".to_string()]).unwrap();
        assert_eq!(
            f.eval().unwrap_err(),
            FormulaError::UnboundVariable("x".to_string())
        );
    }

    #[test]
    fn non_finite_results_propagate() {
        let mut f = Formula::compile("log10(x)", &["x".to_string()]).unwrap();
        f.bind("x", -1.0).unwrap();
        assert!(f.eval().unwrap().is_nan());

        let mut f = Formula::compile("1/x", &["x".to_string()]).unwrap();
        f.bind("x", 0.0).unwrap();
        assert_eq!(f.eval().unwrap(), f64::INFINITY);
    }
}
