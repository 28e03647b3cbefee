use indexmap::IndexSet;

use crate::filter::FilterState;
use crate::record::Record;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    All,
    Favorites,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "fav" | "favs" | "favorites" | "favourites" => Some(Self::Favorites),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Favorites => "favorites",
        }
    }
}

/// Inputs of a single query run. Labels are compared case-insensitively,
/// so they are lower-cased once here instead of per record.
#[derive(Clone, Debug, Default)]
pub struct QueryParams<'a> {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
    pub keyword: String,
    pub view: ViewMode,
    pub favorites: Option<&'a IndexSet<String>>,
}

impl<'a> QueryParams<'a> {
    pub fn new(
        filters: &FilterState,
        keyword: &str,
        view: ViewMode,
        favorites: &'a IndexSet<String>,
    ) -> Self {
        Self {
            included: filters.included().iter().map(|l| l.to_lowercase()).collect(),
            excluded: filters.excluded().iter().map(|l| l.to_lowercase()).collect(),
            keyword: keyword.trim().to_lowercase(),
            view,
            favorites: Some(favorites),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.excluded.iter().any(|ex| record.has_category_ci(ex)) {
            return false;
        }
        if !self.included.is_empty() && !self.included.iter().any(|inc| record.has_category_ci(inc))
        {
            return false;
        }
        if !self.keyword.is_empty() && !record.search_text().contains(&self.keyword) {
            return false;
        }
        if self.view == ViewMode::Favorites {
            let favorited = self
                .favorites
                .map(|f| f.contains(&record.id))
                .unwrap_or(false);
            if !favorited {
                return false;
            }
        }
        true
    }
}

/// Returns the records passing every clause, in their original order.
pub fn query<'r>(records: &'r [Record], params: &QueryParams<'_>) -> Vec<&'r Record> {
    records.iter().filter(|r| params.matches(r)).collect()
}
