//! Backend-neutral mixed-integer linear program.
//!
//! Variables are addressed by [`VarId`] handles; constraints and the
//! objective are sparse linear expressions over those handles.

use serde::{Deserialize, Serialize};

/// Handle of a variable in a [`LinearProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// 0 or 1.
    Binary,
    /// Integer at or above the lower bound.
    Integer,
    /// Real at or above the lower bound.
    Continuous,
}

/// A variable definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    /// Diagnostic name (e.g. `member_3_1_0`).
    pub name: String,
    /// Domain.
    pub kind: VarKind,
    /// Lower bound.
    pub lower: f64,
}

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `expr <= rhs`
    LessEq,
    /// `expr >= rhs`
    GreaterEq,
    /// `expr == rhs`
    Equal,
}

/// A sparse linear expression `Σ coef·var`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    /// (variable, coefficient) terms.
    pub terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coef · var`.
    pub fn add(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// Sum of `vars`, each with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    /// Evaluates the expression against a value vector indexed by `VarId`.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum()
    }
}

/// A linear constraint `expr (<=|>=|==) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Diagnostic name.
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Sense.
    pub relation: Relation,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.eval(values);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tol,
            Relation::GreaterEq => lhs >= self.rhs - tol,
            Relation::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// A minimization MILP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    /// Variables; `VarId(i)` is `variables[i]`.
    pub variables: Vec<VarDef>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective to minimize.
    pub objective: LinearExpr,
}

impl LinearProgram {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its handle.
    pub fn add_variable(&mut self, name: impl Into<String>, kind: VarKind, lower: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VarDef {
            name: name.into(),
            kind,
            lower,
        });
        id
    }

    /// Adds a constraint.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            relation,
            rhs,
        });
    }

    /// Sets the objective (always minimized).
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Number of variables.
    #[inline]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of binary or integer variables.
    pub fn integer_count(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind != VarKind::Continuous)
            .count()
    }

    /// Names of constraints violated by `values` (within `tol`).
    pub fn violated(&self, values: &[f64], tol: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tol))
            .map(|c| c.name.as_str())
            .collect()
    }
}
