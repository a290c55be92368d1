//! Point formulas for the user-defined generation mode

use crate::io::error::{IfsError, Result};
use crate::math::expression::{EvaluationError, Expression};
use rand::Rng;

/// Parameter names available to point formulas, in evaluation order
pub const FORMULA_PARAMETERS: [&str; 8] = ["x", "y", "a", "b", "c", "d", "e", "f"];

/// Formula used when formula mode is selected without explicit text
pub const STANDARD_NEXT_X: &str = "+ * y d f";
/// Formula used when formula mode is selected without explicit text
pub const STANDARD_NEXT_Y: &str = "+ cos * x a + e sin + * x c * y b";

/// Pair of expressions computing the image of a point
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaPoint {
    next_x: Expression,
    next_y: Expression,
}

impl FormulaPoint {
    /// Parse both coordinate formulas over `FORMULA_PARAMETERS`
    ///
    /// # Errors
    ///
    /// Returns `IfsError::Formula` naming the axis whose text is malformed
    pub fn new(next_x: &str, next_y: &str) -> Result<Self> {
        let next_x = Expression::parse(next_x, &FORMULA_PARAMETERS)
            .map_err(|source| IfsError::Formula { axis: "x", source })?;
        let next_y = Expression::parse(next_y, &FORMULA_PARAMETERS)
            .map_err(|source| IfsError::Formula { axis: "y", source })?;
        Ok(Self { next_x, next_y })
    }

    /// The built-in formula pair
    ///
    /// # Errors
    ///
    /// Never fails in practice; parsing is shared with user formulas
    pub fn standard() -> Result<Self> {
        Self::new(STANDARD_NEXT_X, STANDARD_NEXT_Y)
    }

    /// Image of `(x, y)` under coefficients `[a, b, c, d, e, f]`
    ///
    /// Both coordinates see the original `x` and `y`.
    ///
    /// # Errors
    ///
    /// Propagates the first evaluation failure; callers keep the previous point
    pub fn apply<R: Rng + ?Sized>(
        &self,
        x: f64,
        y: f64,
        coefficients: [f64; 6],
        rng: &mut R,
    ) -> std::result::Result<(f64, f64), EvaluationError> {
        let [a, b, c, d, e, f] = coefficients;
        let params = [x, y, a, b, c, d, e, f];
        let next_x = self.next_x.evaluate(&params, rng)?;
        let next_y = self.next_y.evaluate(&params, rng)?;
        Ok((next_x, next_y))
    }

    /// Source text of the x formula
    pub fn x_text(&self) -> &str {
        self.next_x.text()
    }

    /// Source text of the y formula
    pub fn y_text(&self) -> &str {
        self.next_y.text()
    }
}
