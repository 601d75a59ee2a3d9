// ── Column definitions and cell values ──

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Value a column extracts from a row.
///
/// Rendering, faceting, searching and the built-in sort strategies all
/// operate on this, so a column defines its behavior once through its
/// accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl CellValue {
    /// Human-readable form, used for display and fuzzy matching.
    pub fn render(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Text(s) => s.clone(),
            Self::Time(t) => t.to_rfc3339(),
        }
    }

    /// Bucket key for faceted filtering. Missing cells facet under "".
    pub fn facet_key(&self) -> String {
        self.render()
    }

    /// Numeric reading that treats anything non-numeric as zero.
    pub fn numeric_lenient(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        match self {
            Self::Int(n) => *n as f64,
            Self::Float(x) => *x,
            Self::Bool(b) => f64::from(*b),
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
            Self::Missing | Self::Time(_) => 0.0,
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Time(_) => 3,
            Self::Text(_) => 4,
        }
    }

    /// Total order across all cell values. Mixed variants compare by a
    /// fixed rank so sorting never panics on heterogeneous columns.
    pub fn value_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

type RowCmp<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// How a column orders rows.
#[derive(Clone)]
pub enum SortStrategy<T> {
    /// Natural order of the cell values.
    ValueOrder,
    /// Numeric order with non-numeric cells reading as zero.
    NumericLenient,
    /// Caller-supplied comparison over whole rows.
    Custom(RowCmp<T>),
}

impl<T> fmt::Debug for SortStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueOrder => write!(f, "ValueOrder"),
            Self::NumericLenient => write!(f, "NumericLenient"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// One column of a tabular view over rows of `T`.
#[derive(Clone)]
pub struct Column<T> {
    id: &'static str,
    title: String,
    accessor: Accessor<T>,
    sortable: bool,
    searchable: bool,
    facetable: bool,
    sort: SortStrategy<T>,
}

impl<T> Column<T> {
    pub fn new(
        id: &'static str,
        title: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            accessor: Arc::new(accessor),
            sortable: true,
            searchable: true,
            facetable: false,
            sort: SortStrategy::ValueOrder,
        }
    }

    #[must_use]
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    #[must_use]
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// Expose this column's distinct values as facet buckets.
    #[must_use]
    pub fn faceted(mut self) -> Self {
        self.facetable = true;
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: SortStrategy<T>) -> Self {
        self.sort = sort;
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_facetable(&self) -> bool {
        self.facetable
    }

    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }

    /// Compare two rows under this column's sort strategy.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.sort {
            SortStrategy::ValueOrder => self.value(a).value_cmp(&self.value(b)),
            SortStrategy::NumericLenient => self
                .value(a)
                .numeric_lenient()
                .total_cmp(&self.value(b).numeric_lenient()),
            SortStrategy::Custom(cmp) => cmp(a, b),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("facetable", &self.facetable)
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}
