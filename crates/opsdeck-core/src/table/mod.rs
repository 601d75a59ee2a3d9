//! Tabular view engine.
//!
//! Pure presentation state over a snapshot of rows: fuzzy search,
//! faceted filters, stable sorting, pagination and row selection.
//! Nothing here touches the network; feed it snapshots from a
//! [`crate::store::DataSource`] and render the result.

mod bulk;
mod column;
mod filter;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use bulk::{BulkOutcome, run_bulk};
pub use column::{CellValue, Column, SortStrategy};
pub use filter::{MatchTier, by_relevance, rank};

use indexmap::IndexMap;

use crate::model::{Entity, EntityId};

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One rendered page of a table.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    pub rows: Vec<Arc<T>>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_filtered: usize,
}

/// Interactive state of one table.
///
/// `visible` is the single entry point: it runs the full pipeline over
/// a snapshot and clamps the page index in place, so the state is
/// always valid for the data it last rendered.
pub struct TableState<T: Entity> {
    columns: Vec<Column<T>>,
    query: String,
    facets: HashMap<&'static str, HashSet<String>>,
    sort: Option<(&'static str, SortDirection)>,
    page_index: usize,
    page_size: usize,
    selection: HashSet<EntityId>,
}

impl<T: Entity> TableState<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            query: String::new(),
            facets: HashMap::new(),
            sort: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            selection: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the global search needle. Resets to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page_index = 0;
    }

    /// Toggle one facet bucket on a column. Resets to the first page.
    pub fn toggle_facet(&mut self, column_id: &'static str, bucket: impl Into<String>) {
        let bucket = bucket.into();
        let set = self.facets.entry(column_id).or_default();
        if !set.remove(&bucket) {
            set.insert(bucket);
        }
        if set.is_empty() {
            self.facets.remove(column_id);
        }
        self.page_index = 0;
    }

    pub fn clear_facets(&mut self) {
        self.facets.clear();
        self.page_index = 0;
    }

    /// Cycle a column's sort: none → ascending → descending → none.
    /// Sorting on a different column starts it at ascending.
    pub fn toggle_sort(&mut self, column_id: &'static str) {
        let sortable = self
            .columns
            .iter()
            .any(|c| c.id() == column_id && c.is_sortable());
        if !sortable {
            return;
        }
        self.sort = match self.sort {
            Some((id, SortDirection::Ascending)) if id == column_id => {
                Some((column_id, SortDirection::Descending))
            }
            Some((id, SortDirection::Descending)) if id == column_id => None,
            _ => Some((column_id, SortDirection::Ascending)),
        };
    }

    pub fn sort(&self) -> Option<(&'static str, SortDirection)> {
        self.sort
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, index: usize) {
        self.page_index = index;
    }

    // ── Selection ──────────────────────────────────────────────────

    pub fn toggle_selected(&mut self, id: EntityId) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.selection.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every row on the current page of `view`.
    pub fn select_visible(&mut self, view: &TableView<T>) {
        for row in &view.rows {
            self.selection.insert(row.entity_id());
        }
    }

    // ── Pipeline ───────────────────────────────────────────────────

    fn row_passes_search(&self, row: &T) -> bool {
        if self.query.is_empty() {
            return true;
        }
        self.columns
            .iter()
            .filter(|c| c.is_searchable())
            .any(|c| rank(&c.value(row).render(), &self.query).passes())
    }

    fn row_passes_facets(&self, row: &T) -> bool {
        self.facets.iter().all(|(column_id, buckets)| {
            let Some(column) = self.columns.iter().find(|c| c.id() == *column_id) else {
                return true;
            };
            buckets.contains(&column.value(row).facet_key())
        })
    }

    /// Run search → facets → sort → paginate over `rows`.
    ///
    /// The page index is clamped against the filtered row count and the
    /// clamp persists, so shrinking data can never strand the view on a
    /// page past the end.
    pub fn visible(&mut self, rows: &[Arc<T>]) -> TableView<T> {
        let mut filtered: Vec<Arc<T>> = rows
            .iter()
            .filter(|row| self.row_passes_search(row) && self.row_passes_facets(row))
            .cloned()
            .collect();

        if let Some((column_id, direction)) = self.sort {
            if let Some(column) = self.columns.iter().find(|c| c.id() == column_id) {
                filtered.sort_by(|a, b| {
                    let ord = column.compare(a, b);
                    match direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }

        let total_filtered = filtered.len();
        let page_count = total_filtered.div_ceil(self.page_size).max(1);
        self.page_index = self.page_index.min(page_count - 1);

        let start = self.page_index * self.page_size;
        let rows = filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        TableView {
            rows,
            page_index: self.page_index,
            page_count,
            total_filtered,
        }
    }

    /// Distinct facet buckets for `column_id` with their row counts,
    /// computed over the unfiltered snapshot in first-seen order.
    pub fn facet_values(&self, column_id: &'static str, rows: &[Arc<T>]) -> IndexMap<String, usize> {
        let mut buckets = IndexMap::new();
        let Some(column) = self
            .columns
            .iter()
            .find(|c| c.id() == column_id && c.is_facetable())
        else {
            return buckets;
        };
        for row in rows {
            *buckets.entry(column.value(row).facet_key()).or_insert(0) += 1;
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: String,
        status: String,
        score: Option<i64>,
    }

    impl Entity for Row {
        const KIND: EntityKind = EntityKind::Accounts;

        fn entity_id(&self) -> EntityId {
            EntityId::from(self.id)
        }
    }

    fn row(id: i64, name: &str, status: &str, score: Option<i64>) -> Arc<Row> {
        Arc::new(Row {
            id,
            name: name.into(),
            status: status.into(),
            score,
        })
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::new("name", "Name", |r: &Row| CellValue::from(r.name.as_str())),
            Column::new("status", "Status", |r: &Row| {
                CellValue::from(r.status.as_str())
            })
            .faceted(),
            Column::new("score", "Score", |r: &Row| CellValue::from(r.score))
                .not_searchable()
                .sorted_by(SortStrategy::NumericLenient),
        ]
    }

    fn sample() -> Vec<Arc<Row>> {
        vec![
            row(1, "Ann", "Active", Some(10)),
            row(2, "Bob", "Inactive", None),
            row(3, "Cara", "Active", Some(5)),
            row(4, "Joanna", "Banned", Some(7)),
            row(5, "Dan", "Active", Some(5)),
        ]
    }

    #[test]
    fn search_matches_across_searchable_columns_only() {
        let mut state = TableState::new(columns());
        state.set_query("ann");
        let view = state.visible(&sample());
        let names: Vec<_> = view.rows.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Ann", "Joanna"]);

        // "10" only appears in the score column, which is not searchable.
        state.set_query("10");
        assert_eq!(state.visible(&sample()).total_filtered, 0);
    }

    #[test]
    fn facets_or_within_and_between_columns() {
        let mut state = TableState::new(columns());
        state.toggle_facet("status", "Active");
        state.toggle_facet("status", "Banned");
        let view = state.visible(&sample());
        assert_eq!(view.total_filtered, 4);

        // Search composes with facets regardless of application order.
        state.set_query("ann");
        let view = state.visible(&sample());
        let names: Vec<_> = view.rows.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Ann", "Joanna"]);
    }

    #[test]
    fn sort_is_stable_and_cycles() {
        let mut state = TableState::new(columns());
        state.toggle_sort("score");
        let view = state.visible(&sample());
        let ids: Vec<_> = view.rows.iter().map(|r| r.id).collect();
        // Bob's missing score reads as 0; Cara (3) precedes Dan (5) on ties.
        assert_eq!(ids, vec![2, 3, 5, 4, 1]);

        state.toggle_sort("score");
        let view = state.visible(&sample());
        let ids: Vec<_> = view.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 3, 5, 2]);

        state.toggle_sort("score");
        assert_eq!(state.sort(), None);
    }

    #[test]
    fn page_clamp_persists_when_data_shrinks() {
        let mut state = TableState::new(columns()).with_page_size(2);
        let rows = sample();
        state.set_page(2);
        let view = state.visible(&rows);
        assert_eq!(view.page_index, 2);
        assert_eq!(view.page_count, 3);

        let shrunk = vec![rows[0].clone(), rows[1].clone(), rows[2].clone()];
        let view = state.visible(&shrunk);
        assert_eq!(view.page_index, 1);
        assert_eq!(state.page_index(), 1);
    }

    #[test]
    fn empty_filter_result_stays_on_page_zero() {
        let mut state = TableState::new(columns());
        state.set_query("no such row");
        let view = state.visible(&sample());
        assert_eq!(view.total_filtered, 0);
        assert_eq!(view.page_count, 1);
        assert_eq!(view.page_index, 0);
    }

    #[test]
    fn facet_values_count_over_unfiltered_rows() {
        let state = TableState::new(columns());
        let buckets = state.facet_values("status", &sample());
        assert_eq!(buckets.get("Active"), Some(&3));
        assert_eq!(buckets.get("Inactive"), Some(&1));
        assert_eq!(buckets.get("Banned"), Some(&1));
        // Non-facetable columns expose no buckets.
        assert!(state.facet_values("name", &sample()).is_empty());
    }

    #[test]
    fn selection_survives_filtering() {
        let mut state = TableState::new(columns());
        state.toggle_selected(EntityId::from(2));
        state.set_query("ann");
        let _ = state.visible(&sample());
        assert!(state.is_selected(&EntityId::from(2)));

        state.set_query("");
        state.toggle_selected(EntityId::from(2));
        assert_eq!(state.selection_len(), 0);
    }

    #[test]
    fn select_visible_takes_current_page_only() {
        let mut state = TableState::new(columns()).with_page_size(2);
        let view = state.visible(&sample());
        state.select_visible(&view);
        assert_eq!(state.selection_len(), 2);
        assert!(state.is_selected(&EntityId::from(1)));
        assert!(state.is_selected(&EntityId::from(2)));
        assert!(!state.is_selected(&EntityId::from(3)));
    }

    #[test]
    fn unsortable_column_ignores_toggle() {
        let cols = vec![
            Column::new("name", "Name", |r: &Row| CellValue::from(r.name.as_str()))
                .not_sortable(),
        ];
        let mut state = TableState::new(cols);
        state.toggle_sort("name");
        assert_eq!(state.sort(), None);
    }
}
