//! Tests for sorting, paging, loading and row interaction.

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::ManualSource;
use common::Recorder;
use common::Song;
use common::columns;
use common::memory_source;
use common::settle;
use common::song;
use songbook_table::FilterModel;
use songbook_table::FilterValue;
use songbook_table::Interaction;
use songbook_table::LoadError;
use songbook_table::LoadRequest;
use songbook_table::Order;
use songbook_table::SearchableTable;
use songbook_table::TableConfig;
use songbook_table::TableError;
use songbook_table::loader::source_fn;
use songbook_table::selection::SelectAllState;
use songbook_table::surface::Layout;

fn titles(table: &SearchableTable<Song>) -> Vec<String> {
    table.rows().into_iter().map(|s| s.title).collect()
}

#[tokio::test(start_paused = true)]
async fn test_latest_issued_load_wins() {
    let source = ManualSource::default();
    let table = SearchableTable::new(columns(), source.clone(), 37, TableConfig::new("title")).unwrap();
    settle().await;

    table.change_page(1).unwrap();
    settle().await;

    let mut pending = source.take();
    assert_eq!(pending.len(), 2);
    let (second_request, second) = pending.pop().unwrap();
    let (first_request, first) = pending.pop().unwrap();
    assert_eq!((first_request.offset, first_request.limit), (0, 25));
    assert_eq!((second_request.offset, second_request.limit), (25, 25));

    second.send(Ok(vec![song(2, "second", &[], false)])).unwrap();
    settle().await;
    assert!(!table.is_loading());

    first.send(Ok(vec![song(1, "first", &[], false)])).unwrap();
    settle().await;
    assert_eq!(titles(&table), vec!["second"]);
    assert!(!table.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_keeps_loading_flag() {
    let source = ManualSource::default();
    let table = SearchableTable::new(columns(), source.clone(), 37, TableConfig::new("title")).unwrap();
    settle().await;
    table.request_sort("title").unwrap();
    settle().await;

    let mut pending = source.take();
    let (_, second) = pending.pop().unwrap();
    let (_, first) = pending.pop().unwrap();

    first.send(Ok(vec![song(1, "first", &[], false)])).unwrap();
    settle().await;
    assert!(table.is_loading());
    assert!(table.rows().is_empty());

    second.send(Ok(Vec::new())).unwrap();
    settle().await;
    assert!(!table.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_request_sort_toggles_and_reloads() {
    let table = SearchableTable::new(columns(), memory_source(), 4, TableConfig::new("title")).unwrap();
    table.settled().await;
    assert_eq!(titles(&table), vec!["Amazing Grace", "Rain", "Wind", "Windmill"]);

    table.request_sort("title").unwrap();
    table.settled().await;
    assert_eq!(table.sort().order, Order::Desc);
    assert_eq!(titles(&table), vec!["Windmill", "Wind", "Rain", "Amazing Grace"]);

    table.request_sort("title").unwrap();
    assert_eq!(table.sort().order, Order::Asc);

    assert_eq!(
        table.request_sort("genres"),
        Err(TableError::NotSortable("genres".into()))
    );
    assert_eq!(
        table.request_sort("year"),
        Err(TableError::UnknownColumn("year".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_page_window() {
    let source = ManualSource::default();
    let table = SearchableTable::new(columns(), source.clone(), 37, TableConfig::new("title")).unwrap();
    assert_eq!(table.page_count(), 2);
    assert_eq!(table.loading_placeholder_rows(), 25);

    table.change_page(1).unwrap();
    let request = table.last_request().unwrap();
    assert_eq!((request.offset, request.limit), (25, 25));
    assert_eq!(table.displayed_rows_label(), "26-37 of 37");

    assert_eq!(
        table.change_page(2),
        Err(TableError::PageOutOfRange { page: 2, page_count: 2 })
    );
}

#[tokio::test(start_paused = true)]
async fn test_change_rows_per_page_resets_page() {
    let table = SearchableTable::new(columns(), ManualSource::default(), 120, TableConfig::new("title")).unwrap();
    table.change_page(3).unwrap();

    assert_eq!(table.change_rows_per_page(10), Ok(true));
    assert_eq!(table.pagination().page, 0);
    let request = table.last_request().unwrap();
    assert_eq!((request.offset, request.limit), (0, 10));

    assert_eq!(table.change_rows_per_page(12), Err(TableError::InvalidRowsPerPage(12)));
}

#[tokio::test(start_paused = true)]
async fn test_total_row_count_caps_limit() {
    let table = SearchableTable::new(columns(), ManualSource::default(), 0, TableConfig::new("title")).unwrap();
    assert_eq!(table.last_request().map(|r| r.limit), Some(0));
    assert_eq!(table.loading_placeholder_rows(), 0);

    table.set_total_row_count(7);
    assert_eq!(table.last_request().map(|r| r.limit), Some(7));
    assert_eq!(table.loading_placeholder_rows(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_keeps_rows() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source = source_fn(move |_request: LoadRequest| {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 0 {
                Ok(vec![song(1, "Wind", &[], false)])
            } else {
                Err(LoadError::new("service unavailable"))
            }
        }
    });
    let table = SearchableTable::new(columns(), source, 1, TableConfig::new("title")).unwrap();
    table.settled().await;
    assert_eq!(titles(&table), vec!["Wind"]);

    table.reload();
    table.settled().await;
    assert!(!table.is_loading());
    assert_eq!(titles(&table), vec!["Wind"]);
    assert_eq!(table.error(), Some(LoadError::new("service unavailable")));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_click_mode_dispatches_row_id() {
    let clicks = Recorder::default();
    let recorder = clicks.clone();
    let config = TableConfig::new("title")
        .with_interaction(Interaction::click(move |id: &i64| recorder.push(*id)));
    let table = SearchableTable::new(columns(), memory_source(), 4, config).unwrap();
    table.settled().await;

    table.click_row(&3);
    assert_eq!(clicks.calls(), vec![3]);
    assert!(table.selected_ids().is_empty());

    table.select_all(true);
    assert!(table.selected_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_selection_mode_toggles_membership() {
    let selections: Recorder<Vec<i64>> = Recorder::default();
    let recorder = selections.clone();
    let config = TableConfig::new("title")
        .with_title("Songs")
        .with_interaction(Interaction::select(move |ids: &[i64]| {
            let mut ids = ids.to_vec();
            ids.sort();
            recorder.push(ids);
        }));
    let table = SearchableTable::new(columns(), memory_source(), 4, config).unwrap();
    table.settled().await;
    assert_eq!(table.toolbar_text().as_deref(), Some("Songs"));

    table.click_row(&1);
    table.click_row(&2);
    table.click_row(&1);
    assert_eq!(selections.calls(), vec![vec![1], vec![1, 2], vec![2]]);
    assert_eq!(table.select_all_state(), SelectAllState::Indeterminate);
    assert_eq!(table.toolbar_text().as_deref(), Some("1 selected"));

    let selected: Vec<bool> = table.rendered_rows().iter().map(|r| r.selected).collect();
    assert_eq!(selected, vec![false, true, false, false]);

    table.select_all(true);
    assert_eq!(table.select_all_state(), SelectAllState::Checked);
    assert_eq!(selections.calls().last(), Some(&vec![1, 2, 3, 4]));

    table.select_all(false);
    assert_eq!(table.select_all_state(), SelectAllState::Unchecked);
    assert_eq!(selections.calls().last(), Some(&Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn test_rendered_cells() {
    let table = SearchableTable::new(columns(), memory_source(), 4, TableConfig::new("title")).unwrap();
    table.settled().await;

    let rows = table.rendered_rows();
    assert_eq!(rows[0].cells[0], "cover-4");
    assert_eq!(rows[0].cells[1], "Amazing Grace");
    assert_eq!(rows[0].cells[2], "Cannot render...");

    let header = table.header();
    assert_eq!(header[1].sort_direction, Some(Order::Asc));
    assert!(header.iter().filter(|h| h.sortable).count() == 1);
}

#[tokio::test(start_paused = true)]
async fn test_breakpoint_transition_closes_dialog() {
    let config = TableConfig::new("title").with_viewport_width(500);
    let table = SearchableTable::new(columns(), memory_source(), 4, config).unwrap();
    assert_eq!(table.layout(), Layout::Mobile);

    assert!(table.open_filter_dialog());
    assert!(table.is_filter_dialog_open());

    table.set_viewport_width(1280);
    assert_eq!(table.layout(), Layout::Desktop);
    assert!(!table.is_filter_dialog_open());
    assert!(!table.open_filter_dialog());

    table.set_viewport_width(400);
    assert!(!table.is_filter_dialog_open());
}

#[tokio::test(start_paused = true)]
async fn test_unfilterable_columns_stay_out_of_model() {
    let table = SearchableTable::new(columns(), memory_source(), 4, TableConfig::new("title")).unwrap();

    let model = table.committed_filter();
    assert!(model.get("preview_image").is_none());
    assert_eq!(model.entries().count(), 3);
    assert_eq!(model, FilterModel::for_columns(&columns()));

    assert_eq!(
        table.set_boolean_filter("preview_image", true),
        Err(TableError::NotFilterable("preview_image".into()))
    );
    assert_eq!(
        table.set_filter("year", Some(FilterValue::Boolean(true))),
        Err(TableError::UnknownColumn("year".into()))
    );
    assert!(matches!(
        table.set_text_filter("pdf", "yes"),
        Err(TableError::FilterTypeMismatch { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_filters_narrow_rows_and_reset_page() {
    let table = SearchableTable::new(columns(), memory_source(), 4, TableConfig::new("title").with_rows_per_page(5)).unwrap();
    table.settled().await;

    table.toggle_filter_option("genres", 9).unwrap();
    table.set_boolean_filter("pdf", true).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    table.settled().await;

    assert_eq!(titles(&table), vec!["Amazing Grace"]);
    assert_eq!(table.pagination().page, 0);

    let chips: Vec<String> = table.filter_chips().into_iter().map(|c| c.title).collect();
    assert_eq!(chips, vec!["Genre", "Has PDF"]);

    assert!(table.reset_all_filters());
    table.flush_filters();
    table.settled().await;
    assert_eq!(titles(&table).len(), 4);
    assert!(table.filter_chips().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropdown_loads_options_lazily() {
    let table = SearchableTable::new(columns(), memory_source(), 4, TableConfig::new("title")).unwrap();
    assert!(table.toggle_filter_dropdown("genres").await.unwrap());

    let options = table.load_filter_options("genres").await.unwrap();
    assert_eq!(options.len(), 3);
    assert!(matches!(
        table.load_filter_options("title").await,
        Err(TableError::FilterTypeMismatch { .. })
    ));
    assert!(!table.toggle_filter_dropdown("genres").await.unwrap());
}
