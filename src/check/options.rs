//! Column restriction for a check
//!
//! `only` and `except` are mutually exclusive and must not be empty; both
//! rules are enforced when the options are built, so a `CheckOptions` value
//! is always usable.

use super::errors::{CheckError, CheckResult};
use crate::reflect::UniqueScope;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Every column takes part
    #[default]
    All,
    /// Only the listed columns take part
    Only(Vec<String>),
    /// The listed columns are ignored
    Except(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOptions {
    filter: ColumnFilter,
}

impl CheckOptions {
    /// No restriction
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds options from optional lists, as a caller parsing flags would.
    pub fn new(only: Option<Vec<String>>, except: Option<Vec<String>>) -> CheckResult<Self> {
        match (only, except) {
            (Some(_), Some(_)) => Err(CheckError::OnlyAndExcept),
            (Some(only), None) => Self::only(only),
            (None, Some(except)) => Self::except(except),
            (None, None) => Ok(Self::all()),
        }
    }

    pub fn only<I, S>(columns: I) -> CheckResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::all().and_only(columns)
    }

    pub fn except<I, S>(columns: I) -> CheckResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::all().and_except(columns)
    }

    /// Restricts to `columns`; fails if an except list is already set.
    pub fn and_only<I, S>(self, columns: I) -> CheckResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if matches!(self.filter, ColumnFilter::Except(_)) {
            return Err(CheckError::OnlyAndExcept);
        }
        let columns = collect(columns);
        if columns.is_empty() {
            return Err(CheckError::EmptyOnlyList);
        }
        Ok(Self {
            filter: ColumnFilter::Only(columns),
        })
    }

    /// Ignores `columns`; fails if an only list is already set.
    pub fn and_except<I, S>(self, columns: I) -> CheckResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if matches!(self.filter, ColumnFilter::Only(_)) {
            return Err(CheckError::OnlyAndExcept);
        }
        let columns = collect(columns);
        if columns.is_empty() {
            return Err(CheckError::EmptyExceptList);
        }
        Ok(Self {
            filter: ColumnFilter::Except(columns),
        })
    }

    pub fn filter(&self) -> &ColumnFilter {
        &self.filter
    }

    /// Intersects with `only` or subtracts `except`, keeping input order.
    pub fn filter_names(&self, names: Vec<String>) -> Vec<String> {
        match &self.filter {
            ColumnFilter::All => names,
            ColumnFilter::Only(only) => names.into_iter().filter(|n| only.contains(n)).collect(),
            ColumnFilter::Except(except) => {
                names.into_iter().filter(|n| !except.contains(n)).collect()
            }
        }
    }

    /// Keeps a scope iff all its members are allowed (`only`) or none of
    /// them is excluded (`except`). One excluded member discards the whole
    /// scope.
    pub fn filter_scopes(&self, scopes: Vec<UniqueScope>) -> Vec<UniqueScope> {
        match &self.filter {
            ColumnFilter::All => scopes,
            ColumnFilter::Only(only) => scopes
                .into_iter()
                .filter(|scope| scope.is_covered_by(only))
                .collect(),
            ColumnFilter::Except(except) => scopes
                .into_iter()
                .filter(|scope| !scope.intersects(except))
                .collect(),
        }
    }
}

fn collect<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}
