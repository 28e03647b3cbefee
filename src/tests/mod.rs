use indexmap::IndexSet;
use serde_json::json;

use crate::favorites::{FavoritesStore, JsonFileStore, MemoryStore};
use crate::filter::{FilterMark, FilterState};
use crate::output;
use crate::query::{self, QueryParams, ViewMode};
use crate::record::Record;
use crate::state::{AppState, Event};

fn directory_body() -> String {
    let data: Vec<_> = (1..=12)
        .map(|i| {
            let target = match i {
                3 => "만 19~34세 청년",
                9 => "청년 구직자",
                _ => "중위소득 50% 이하 가구",
            };
            json!({
                "서비스ID": format!("WF{i:04}"),
                "정책명": format!("생활지원 {i}"),
                "카테고리": if i % 2 == 0 { "저소득, 주거" } else { "노인 / 의료" },
                "지원대상": target,
                "상세내용": "월 최대 20만원",
                "링크": format!("https://example.go.kr/{i}"),
            })
        })
        .collect();
    json!({ "data": data }).to_string()
}

fn record(id: &str, cats: &[&str]) -> Record {
    Record {
        id: id.to_string(),
        service_id: None,
        title: id.to_string(),
        categories: cats.iter().map(|c| c.to_string()).collect(),
        support_target: String::new(),
        details: String::new(),
        notes: String::new(),
        link: String::new(),
    }
}

fn memory_state() -> AppState {
    AppState::new(FavoritesStore::load(Box::new(MemoryStore::new())), 5, 10)
}

#[test]
fn keyword_search_over_loaded_directory() {
    let records = crate::source::decode_records(&directory_body()).unwrap();
    assert_eq!(records.len(), 12);

    let mut state = memory_state();
    state.apply(Event::Loaded(records)).unwrap();
    state.apply(Event::Search("청년".to_string())).unwrap();

    let view = state.page_view();
    assert_eq!(view.result_count, 2);
    assert_eq!(view.items.len(), 2);
    assert!(view.plan.controls.is_empty());
    let text = output::render_text(&view, false);
    assert!(text.contains("2 results"));
    assert!(text.contains("생활지원 3"));
    assert!(text.contains("생활지원 9"));

    state.apply(Event::GoToPage(2)).unwrap();
    let view = state.page_view();
    assert!(view.items.is_empty());
    assert!(view.plan.controls.is_empty());
    assert_eq!(output::status_message(&view), Some(output::EMPTY_MESSAGE));
}

#[test]
fn loaded_categories_are_split_and_deduplicated() {
    let body = json!({
        "data": [{ "정책명": "돌봄", "카테고리": ["아동, 청소년", "교육", "아동"] }]
    })
    .to_string();
    let records = crate::source::decode_records(&body).unwrap();
    assert_eq!(records[0].categories, vec!["아동", "청소년", "교육"]);
}

#[test]
fn exclusion_beats_inclusion() {
    let records = vec![
        record("a", &["청년", "장애인"]),
        record("b", &["청년"]),
        record("c", &["노인"]),
    ];
    let mut filters = FilterState::new();
    filters.set("청년", FilterMark::Included);
    filters.set("장애인", FilterMark::Excluded);
    let favorites = IndexSet::new();
    let params = QueryParams::new(&filters, "", ViewMode::All, &favorites);
    let ids: Vec<_> = query::query(&records, &params)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b"]);
}

#[test]
fn inclusion_is_any_of() {
    let records = vec![
        record("a", &["청년"]),
        record("b", &["여성"]),
        record("c", &["노인"]),
        record("d", &["여성", "청년"]),
    ];
    let mut state = memory_state();
    state.apply(Event::Loaded(records)).unwrap();
    state
        .apply(Event::SetFilter("청년".to_string(), FilterMark::Included))
        .unwrap();
    state
        .apply(Event::SetFilter("여성".to_string(), FilterMark::Included))
        .unwrap();
    let ids: Vec<_> = state.results().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec!["a", "b", "d"]);
}

#[test]
fn tri_state_cycle_drives_results() {
    let records = vec![record("a", &["청년"]), record("b", &["노인"])];
    let mut state = memory_state();
    state.apply(Event::Loaded(records)).unwrap();

    state.apply(Event::ToggleFilter("청년".to_string())).unwrap();
    assert_eq!(state.results().len(), 1);
    state.apply(Event::ToggleFilter("청년".to_string())).unwrap();
    assert_eq!(state.results()[0].id, "b");
    state.apply(Event::ToggleFilter("청년".to_string())).unwrap();
    assert_eq!(state.results().len(), 2);
    assert!(state.filters().is_empty());
}

#[test]
fn pagination_window_for_twelfth_page() {
    let records = (0..47).map(|i| record(&format!("s{i}"), &[])).collect();
    let mut state = memory_state();
    state.apply(Event::Loaded(records)).unwrap();
    state.apply(Event::GoToPage(12)).unwrap();
    let view = state.page_view();
    assert_eq!(view.plan.total_pages, 10);
    assert_eq!((view.plan.group_start, view.plan.group_end), (11, 10));
    assert!(view.items.is_empty());
}

#[test]
fn favorites_survive_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");

    let mut favorites = FavoritesStore::load(Box::new(JsonFileStore::new(&path)));
    assert!(favorites.toggle("생활지원 3").unwrap());
    drop(favorites);

    let mut favorites = FavoritesStore::load(Box::new(JsonFileStore::new(&path)));
    assert!(favorites.is_favorite("생활지원 3"));
    assert!(!favorites.toggle("생활지원 3").unwrap());
    drop(favorites);

    let favorites = FavoritesStore::load(Box::new(JsonFileStore::new(&path)));
    assert!(!favorites.is_favorite("생활지원 3"));
    assert_eq!(favorites.count(), 0);
}

#[test]
fn favorites_view_after_starring() {
    let records = crate::source::decode_records(&directory_body()).unwrap();
    let mut state = memory_state();
    state.apply(Event::Loaded(records)).unwrap();
    state
        .apply(Event::ToggleFavorite("생활지원 7".to_string()))
        .unwrap();
    state.apply(Event::SetView(ViewMode::Favorites)).unwrap();

    let page = output::build_page(&state.page_view());
    assert_eq!(page.result_count, 1);
    assert_eq!(page.favorites_count, 1);
    assert_eq!(page.services[0].id, "생활지원 7");
    assert!(page.services[0].favorite);
}

#[tokio::test]
async fn session_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("services.json");
    tokio::fs::write(&data, directory_body()).await.unwrap();

    let options = crate::session::Options {
        source: crate::source::RecordSource::File(data.to_string_lossy().to_string()),
        favorites: crate::session::FavoritesBackend::File(dir.path().join("favorites.json")),
        ..crate::session::Options::default()
    };
    let session = crate::session::Session::new(options).unwrap();
    let (state, err) = session.start().await;
    assert!(err.is_none());
    assert_eq!(state.records().len(), 12);
    assert_eq!(state.page_view().items.len(), 5);
}

#[tokio::test]
async fn missing_source_file_degrades_to_failed_state() {
    let dir = tempfile::tempdir().unwrap();
    let options = crate::session::Options {
        source: crate::source::RecordSource::File(
            dir.path().join("nope.json").to_string_lossy().to_string(),
        ),
        favorites: crate::session::FavoritesBackend::Memory,
        retry: crate::source::RetryPolicy::once(),
        ..crate::session::Options::default()
    };
    let session = crate::session::Session::new(options).unwrap();
    let (state, err) = session.start().await;
    assert!(err.is_some());
    let view = state.page_view();
    assert_eq!(output::status_message(&view), Some(output::LOAD_FAILED_MESSAGE));
}
