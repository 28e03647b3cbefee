use std::collections::HashSet;

use crate::favorites::{FavoritesStore, StoreError};
use crate::filter::{FilterMark, FilterState, FilterSummary};
use crate::pagination::{self, PagePlan};
use crate::query::{self, QueryParams, ViewMode};
use crate::record::Record;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed(String),
}

/// Everything that can happen to a browsing session.
#[derive(Debug)]
pub enum Event {
    Loaded(Vec<Record>),
    LoadFailed(String),
    ToggleFilter(String),
    SetFilter(String, FilterMark),
    ClearFilters,
    SetView(ViewMode),
    Search(String),
    ToggleFavorite(String),
    GoToPage(usize),
    ToggleExpanded(String),
}

#[derive(Debug)]
pub struct AppState {
    records: Vec<Record>,
    status: LoadStatus,
    filters: FilterState,
    keyword: String,
    view: ViewMode,
    favorites: FavoritesStore,
    expanded: HashSet<String>,
    current_page: usize,
    items_per_page: usize,
    group_size: usize,
}

#[derive(Clone, Debug)]
pub struct PageItem<'a> {
    /// 1-based position on the page.
    pub position: usize,
    pub record: &'a Record,
    pub favorite: bool,
    pub expanded: bool,
}

#[derive(Clone, Debug)]
pub struct PageView<'a> {
    pub status: &'a LoadStatus,
    pub result_count: usize,
    pub favorites_count: usize,
    pub filter_summary: FilterSummary,
    pub keyword: &'a str,
    pub view: ViewMode,
    pub current_page: usize,
    pub items: Vec<PageItem<'a>>,
    pub plan: PagePlan,
}

impl AppState {
    pub fn new(favorites: FavoritesStore, items_per_page: usize, group_size: usize) -> Self {
        Self {
            records: Vec::new(),
            status: LoadStatus::Loading,
            filters: FilterState::new(),
            keyword: String::new(),
            view: ViewMode::All,
            favorites,
            expanded: HashSet::new(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
            group_size: group_size.max(1),
        }
    }

    /// Leaves the loading phase. Never touches favorites storage.
    pub fn finish_loading(&mut self, outcome: Result<Vec<Record>, String>) {
        match outcome {
            Ok(records) => {
                self.records = records;
                self.status = LoadStatus::Loaded;
            }
            Err(message) => {
                self.records.clear();
                self.status = LoadStatus::Failed(message);
            }
        }
        self.current_page = 1;
    }

    /// Applies one event. Only a favorites write can fail, and the in-memory
    /// state has already changed when it does.
    pub fn apply(&mut self, event: Event) -> Result<(), StoreError> {
        match event {
            Event::Loaded(records) => self.finish_loading(Ok(records)),
            Event::LoadFailed(message) => self.finish_loading(Err(message)),
            Event::ToggleFilter(label) => {
                let mark = self.filters.toggle(&label);
                tracing::debug!(label = %label, ?mark, "filter toggled");
                self.current_page = 1;
            }
            Event::SetFilter(label, mark) => {
                self.filters.set(&label, mark);
                self.current_page = 1;
            }
            Event::ClearFilters => {
                self.filters.clear();
                self.current_page = 1;
            }
            Event::SetView(view) => {
                self.view = view;
                self.current_page = 1;
            }
            Event::Search(keyword) => {
                self.keyword = keyword;
                self.current_page = 1;
            }
            Event::ToggleFavorite(id) => {
                let outcome = self.favorites.toggle(&id);
                if self.view == ViewMode::Favorites {
                    self.keep_page_in_range();
                }
                outcome?;
            }
            Event::GoToPage(page) => {
                if page >= 1 {
                    self.current_page = page;
                }
            }
            Event::ToggleExpanded(id) => {
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
            }
        }
        Ok(())
    }

    /// Steps back to the last page when the current one has emptied out,
    /// e.g. after un-starring the only entry of the last favorites page.
    fn keep_page_in_range(&mut self) {
        let total_pages = self.results().len().div_ceil(self.items_per_page);
        if self.current_page > total_pages {
            self.current_page = total_pages.max(1);
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn results(&self) -> Vec<&Record> {
        let params = QueryParams::new(&self.filters, &self.keyword, self.view, self.favorites.all());
        query::query(&self.records, &params)
    }

    /// Projects the state onto the page the user sees. Calling it twice
    /// without an event in between yields the same view.
    pub fn page_view(&self) -> PageView<'_> {
        let results = self.results();
        let mut plan = pagination::plan(
            results.len(),
            self.current_page,
            self.items_per_page,
            self.group_size,
        );
        let items: Vec<PageItem<'_>> = results[plan.slice.clone()]
            .iter()
            .copied()
            .enumerate()
            .map(|(i, record)| PageItem {
                position: i + 1,
                record,
                favorite: self.favorites.is_favorite(&record.id),
                expanded: self.expanded.contains(&record.id),
            })
            .collect();
        if items.is_empty() {
            plan.controls.clear();
        }
        PageView {
            status: &self.status,
            result_count: results.len(),
            favorites_count: self.favorites.count(),
            filter_summary: self.filters.summary(),
            keyword: &self.keyword,
            view: self.view,
            current_page: self.current_page,
            items,
            plan,
        }
    }
}
