use crate::config::DEFAULT_PAGE_SIZE;
use crate::ranking::is_active_market;
use crate::types::Market;

use super::filter::{matches_query, FilterCategory, SortKey};

/// Filter by activity, category and query (all conjunctive), then sort.
///
/// Total: an empty result is a valid "no markets match" state.
pub fn recompute(all: &[Market], filter: FilterCategory, sort: SortKey, query: &str) -> Vec<Market> {
    let mut out: Vec<Market> = all
        .iter()
        .filter(|m| is_active_market(m) && filter.matches(m) && matches_query(m, query))
        .cloned()
        .collect();
    out.sort_by(|a, b| sort.compare(a, b));
    out
}

/// Filter/sort/search knobs plus the cursor and scroll over their result.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub filter: FilterCategory,
    pub sort: SortKey,
    pub query: String,
    pub search_mode: bool,
    pub cursor: usize,
    pub scroll: usize,
    /// Rows that fit in the table viewport.
    pub page_size: usize,
    visible: Vec<Market>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: FilterCategory::All,
            sort: SortKey::Volume,
            query: String::new(),
            search_mode: false,
            cursor: 0,
            scroll: 0,
            page_size: page_size.max(1),
            visible: Vec::new(),
        }
    }

    /// The full filtered and sorted list.
    pub fn visible(&self) -> &[Market] {
        &self.visible
    }

    /// The slice currently on screen.
    pub fn window(&self) -> &[Market] {
        let start = self.scroll.min(self.visible.len());
        let end = (start + self.page_size).min(self.visible.len());
        &self.visible[start..end]
    }

    pub fn selected(&self) -> Option<&Market> {
        self.visible.get(self.cursor)
    }

    pub fn has_filters(&self) -> bool {
        self.filter != FilterCategory::All || self.sort != SortKey::Volume || !self.query.is_empty()
    }

    // -----------------------------------------------------------------------
    // Recompute triggers
    // -----------------------------------------------------------------------

    /// Re-run filter/sort/search over `all` and pull cursor/scroll back in bounds.
    pub fn refresh(&mut self, all: &[Market]) {
        self.visible = recompute(all, self.filter, self.sort, &self.query);
        self.clamp();
    }

    pub fn cycle_filter(&mut self, all: &[Market]) {
        self.filter = self.filter.next();
        self.refresh(all);
    }

    pub fn cycle_sort(&mut self, all: &[Market]) {
        self.sort = self.sort.next();
        self.refresh(all);
    }

    pub fn push_query_char(&mut self, c: char, all: &[Market]) {
        self.query.push(c);
        self.refresh(all);
    }

    pub fn pop_query_char(&mut self, all: &[Market]) {
        self.query.pop();
        self.refresh(all);
    }

    pub fn begin_search(&mut self) {
        self.search_mode = true;
    }

    /// Leave search mode keeping the query.
    pub fn confirm_search(&mut self) {
        self.search_mode = false;
    }

    /// Leave search mode dropping the query.
    pub fn cancel_search(&mut self, all: &[Market]) {
        self.search_mode = false;
        self.query.clear();
        self.refresh(all);
    }

    /// Back to defaults: all categories, volume sort, no query, top of list.
    pub fn clear(&mut self, all: &[Market]) {
        self.filter = FilterCategory::All;
        self.sort = SortKey::Volume;
        self.query.clear();
        self.search_mode = false;
        self.cursor = 0;
        self.scroll = 0;
        self.refresh(all);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp();
    }

    // -----------------------------------------------------------------------
    // Cursor movement
    // -----------------------------------------------------------------------

    pub fn move_up(&mut self) {
        self.move_to(self.cursor.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        self.move_to(self.cursor.saturating_add(1));
    }

    pub fn page_up(&mut self) {
        self.move_to(self.cursor.saturating_sub(self.page_size));
    }

    pub fn page_down(&mut self) {
        self.move_to(self.cursor.saturating_add(self.page_size));
    }

    pub fn home(&mut self) {
        self.move_to(0);
    }

    pub fn end(&mut self) {
        self.move_to(usize::MAX);
    }

    pub fn select(&mut self, index: usize) {
        self.move_to(index);
    }

    /// Cursor row relative to the top of the window.
    pub fn cursor_in_window(&self) -> Option<usize> {
        if self.visible.is_empty() {
            return None;
        }
        self.cursor.checked_sub(self.scroll)
    }

    fn last_index(&self) -> usize {
        self.visible.len().saturating_sub(1)
    }

    fn max_scroll(&self) -> usize {
        self.visible.len().saturating_sub(self.page_size)
    }

    /// Move within bounds, then soft-follow: the window only scrolls once the
    /// cursor is past its vertical midpoint.
    fn move_to(&mut self, target: usize) {
        self.cursor = target.min(self.last_index());
        self.scroll = self
            .cursor
            .saturating_sub(self.page_size / 2)
            .min(self.max_scroll());
    }

    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.last_index());
        self.scroll = self.scroll.min(self.max_scroll());
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + self.page_size {
            self.scroll = self.cursor + 1 - self.page_size;
        }
    }
}
