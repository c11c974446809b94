//! Relational operators over [`Dataset`]s
//!
//! Every operator takes its inputs by reference and returns a new dataset.
//! The methods on [`Dataset`] defined here are thin wrappers so analyses can
//! be written as chains.

pub mod aggregate;
pub mod derive;
pub mod join;
pub mod project;
pub mod rank;

pub use self::aggregate::{Aggregate, COUNT_COLUMN, SUM_COLUMN, group_aggregate};
pub use self::derive::{NumericExpr, derive_column};
pub use self::join::equi_join;
pub use self::project::project;
pub use self::rank::{RANK_COLUMN, RankSpec, rank, rank_at_most, rank_between};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{self, Expr};

impl Dataset {
    pub fn filter(&self, expr: &Expr) -> Result<Self> {
        filter::filter(self, expr)
    }

    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        project(self, columns, false)
    }

    pub fn distinct(&self, columns: &[&str]) -> Result<Self> {
        project(self, columns, true)
    }

    pub fn join(&self, right: &Dataset, key: &str) -> Result<Self> {
        equi_join(self, right, key)
    }

    pub fn derive(&self, name: &str, expr: &NumericExpr) -> Result<Self> {
        derive_column(self, name, expr)
    }

    pub fn group_by(&self, by: &[&str], aggregate: &Aggregate) -> Result<Self> {
        group_aggregate(self, by, aggregate)
    }

    pub fn rank(&self, spec: &RankSpec) -> Result<Self> {
        rank(self, spec)
    }
}
