//! Calibration tables used by the interpolator

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use thiserror::Error;

use crate::servo_ctrl::PulseWidth;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Unvalidated calibration table as it appears in a parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableParams {
    /// Non-negative command breakpoints, nearest zero first.
    pub domain_pos: Vec<i32>,

    /// Non-positive command breakpoints, nearest zero first.
    pub domain_neg: Vec<i32>,

    /// Pulse widths matching `domain_pos`.
    ///
    /// Units: microseconds
    pub output_pos: Vec<PulseWidth>,

    /// Pulse widths matching `domain_neg`.
    ///
    /// Units: microseconds
    pub output_neg: Vec<PulseWidth>,
}

/// A validated set of breakpoints mapping commands to pulse widths.
///
/// Each branch (positive and negative) is ordered by increasing distance from zero, with domain
/// values strictly monotonic, and all four sequences share the same non-zero length. A table can
/// only be built through [`CalibTable::new`] (or deserialised, which calls it), so holding one is
/// proof that interpolation can never divide by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableParams", into = "TableParams")]
pub struct CalibTable {
    domain_pos: Vec<i32>,
    domain_neg: Vec<i32>,
    output_pos: Vec<PulseWidth>,
    output_neg: Vec<PulseWidth>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which half of a calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Positive,
    Negative,
}

/// Reasons a calibration table is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Calibration table is empty")]
    Empty,

    #[error(
        "Calibration table sequences have different lengths (domain_pos: {domain_pos}, \
         domain_neg: {domain_neg}, output_pos: {output_pos}, output_neg: {output_neg})"
    )]
    LengthMismatch {
        domain_pos: usize,
        domain_neg: usize,
        output_pos: usize,
        output_neg: usize,
    },

    #[error("The first {0} breakpoint ({1}) is on the wrong side of zero")]
    WrongSign(Branch, i32),

    #[error("{0} breakpoints {1} and {2} are equal, the interval between them has zero width")]
    ZeroWidthInterval(Branch, usize, usize),

    #[error("{0} breakpoint {1} ({2}) is not further from zero than the one before it")]
    NotMonotonic(Branch, usize, i32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CalibTable {
    /// Build a table, checking every invariant the interpolator relies on.
    pub fn new(
        domain_pos: Vec<i32>,
        domain_neg: Vec<i32>,
        output_pos: Vec<PulseWidth>,
        output_neg: Vec<PulseWidth>,
    ) -> Result<Self, TableError> {
        let n = domain_pos.len();

        if n != domain_neg.len() || n != output_pos.len() || n != output_neg.len() {
            return Err(TableError::LengthMismatch {
                domain_pos: domain_pos.len(),
                domain_neg: domain_neg.len(),
                output_pos: output_pos.len(),
                output_neg: output_neg.len(),
            });
        }

        if n == 0 {
            return Err(TableError::Empty);
        }

        if domain_pos[0] < 0 {
            return Err(TableError::WrongSign(Branch::Positive, domain_pos[0]));
        }
        if domain_neg[0] > 0 {
            return Err(TableError::WrongSign(Branch::Negative, domain_neg[0]));
        }

        check_branch(Branch::Positive, &domain_pos)?;
        check_branch(Branch::Negative, &domain_neg)?;

        Ok(Self {
            domain_pos,
            domain_neg,
            output_pos,
            output_neg,
        })
    }

    /// Number of breakpoints in each branch.
    pub fn len(&self) -> usize {
        self.domain_pos.len()
    }

    pub fn domain_pos(&self) -> &[i32] {
        &self.domain_pos
    }

    pub fn domain_neg(&self) -> &[i32] {
        &self.domain_neg
    }

    pub fn output_pos(&self) -> &[PulseWidth] {
        &self.output_pos
    }

    pub fn output_neg(&self) -> &[PulseWidth] {
        &self.output_neg
    }
}

impl TryFrom<TableParams> for CalibTable {
    type Error = TableError;

    fn try_from(p: TableParams) -> Result<Self, Self::Error> {
        Self::new(p.domain_pos, p.domain_neg, p.output_pos, p.output_neg)
    }
}

impl From<CalibTable> for TableParams {
    fn from(t: CalibTable) -> Self {
        Self {
            domain_pos: t.domain_pos,
            domain_neg: t.domain_neg,
            output_pos: t.output_pos,
            output_neg: t.output_neg,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Positive => write!(f, "positive"),
            Branch::Negative => write!(f, "negative"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check that the breakpoints of a branch move strictly away from zero.
fn check_branch(branch: Branch, domain: &[i32]) -> Result<(), TableError> {
    for i in 1..domain.len() {
        let (prev, curr) = (domain[i - 1], domain[i]);

        if prev == curr {
            return Err(TableError::ZeroWidthInterval(branch, i - 1, i));
        }

        let away_from_zero = match branch {
            Branch::Positive => curr > prev,
            Branch::Negative => curr < prev,
        };

        if !away_from_zero {
            return Err(TableError::NotMonotonic(branch, i, curr));
        }
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn pw(v: &[u16]) -> Vec<PulseWidth> {
        v.iter().copied().map(PulseWidth).collect()
    }

    #[test]
    fn test_valid_table() -> Result<(), TableError> {
        let table = CalibTable::new(
            vec![1, 10, 25],
            vec![-1, -10, -25],
            pw(&[1500, 1600, 1700]),
            pw(&[1500, 1400, 1300]),
        )?;

        assert_eq!(table.len(), 3);
        assert_eq!(table.domain_neg()[2], -25);
        assert_eq!(table.output_pos()[1], PulseWidth(1600));

        // A single breakpoint per branch, both at zero, is still a valid table
        CalibTable::new(vec![0], vec![0], pw(&[1500]), pw(&[1500]))?;

        Ok(())
    }

    #[test]
    fn test_invalid_tables() {
        assert_eq!(
            CalibTable::new(vec![], vec![], vec![], vec![]),
            Err(TableError::Empty)
        );

        assert_eq!(
            CalibTable::new(vec![1, 2], vec![-1], pw(&[1500, 1600]), pw(&[1400])),
            Err(TableError::LengthMismatch {
                domain_pos: 2,
                domain_neg: 1,
                output_pos: 2,
                output_neg: 1
            })
        );

        assert_eq!(
            CalibTable::new(vec![-1, 2], vec![-1, -2], pw(&[1, 2]), pw(&[1, 2])),
            Err(TableError::WrongSign(Branch::Positive, -1))
        );

        assert_eq!(
            CalibTable::new(vec![1, 2], vec![1, -2], pw(&[1, 2]), pw(&[1, 2])),
            Err(TableError::WrongSign(Branch::Negative, 1))
        );

        assert_eq!(
            CalibTable::new(vec![1, 10, 10], vec![-1, -2, -3], pw(&[1, 2, 3]), pw(&[1, 2, 3])),
            Err(TableError::ZeroWidthInterval(Branch::Positive, 1, 2))
        );

        assert_eq!(
            CalibTable::new(vec![1, 2, 3], vec![-1, -5, -5], pw(&[1, 2, 3]), pw(&[1, 2, 3])),
            Err(TableError::ZeroWidthInterval(Branch::Negative, 1, 2))
        );

        assert_eq!(
            CalibTable::new(vec![1, 5, 3], vec![-1, -2, -3], pw(&[1, 2, 3]), pw(&[1, 2, 3])),
            Err(TableError::NotMonotonic(Branch::Positive, 2, 3))
        );

        assert_eq!(
            CalibTable::new(vec![1, 2, 3], vec![-3, -2, -1], pw(&[1, 2, 3]), pw(&[1, 2, 3])),
            Err(TableError::NotMonotonic(Branch::Negative, 1, -2))
        );
    }

    #[test]
    fn test_deserialise_rejects_invalid_table() {
        let res: Result<CalibTable, _> = util::params::from_str(
            "domain_pos = [0, 10, 10]\n\
             domain_neg = [0, -10, -20]\n\
             output_pos = [1500, 1600, 1700]\n\
             output_neg = [1500, 1400, 1300]\n",
        );

        assert!(res.is_err());

        let table: CalibTable = util::params::from_str(
            "domain_pos = [0, 10, 20]\n\
             domain_neg = [0, -10, -20]\n\
             output_pos = [1500, 1600, 1700]\n\
             output_neg = [1500, 1400, 1300]\n",
        )
        .unwrap();

        assert_eq!(table.output_neg()[2], PulseWidth(1300));
    }
}
