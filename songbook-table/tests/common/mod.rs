//! Shared fixtures for the table integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use songbook_table::Column;
use songbook_table::ColumnDefinition;
use songbook_table::DataSource;
use songbook_table::FilterOption;
use songbook_table::FilterSettings;
use songbook_table::LoadError;
use songbook_table::LoadRequest;
use songbook_table::OptionId;
use songbook_table::OptionSource;
use songbook_table::TableRow;
use songbook_table::loader::MemorySource;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub genres: Vec<i64>,
    pub has_pdf: bool,
}

impl TableRow for Song {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            _ => None,
        }
    }
}

pub fn song(id: i64, title: &str, genres: &[i64], has_pdf: bool) -> Song {
    Song {
        id,
        title: title.to_string(),
        genres: genres.to_vec(),
        has_pdf,
    }
}

pub fn columns() -> ColumnDefinition<Song> {
    ColumnDefinition::new()
        .column(
            "preview_image",
            Column::new("").render(|song: &Song, _| format!("cover-{}", song.id)),
        )
        .column(
            "title",
            Column::new("Title")
                .sortable_by(|song: &Song| song.title.to_lowercase())
                .filter(FilterSettings::text("Title contains", 0)),
        )
        .column(
            "genres",
            Column::new("Genres").filter(FilterSettings::multi_select(
                "Genre",
                OptionSource::Static(vec![
                    FilterOption::new(3, "Folk"),
                    FilterOption::new(7, "Gospel"),
                    FilterOption::new(9, "Hymn"),
                ]),
                1,
            )),
        )
        .column(
            "pdf",
            Column::new("PDF").filter(FilterSettings::boolean("Has PDF", 3)),
        )
}

pub fn catalog() -> Vec<Song> {
    vec![
        song(1, "Wind", &[3], true),
        song(2, "Rain", &[7], false),
        song(3, "Windmill", &[3, 9], false),
        song(4, "Amazing Grace", &[7, 9], true),
    ]
}

pub fn memory_source() -> MemorySource<Song> {
    MemorySource::new(catalog(), columns()).with_predicate(|song, filter| {
        let title = filter
            .text_value("title")
            .is_none_or(|needle| song.title.to_lowercase().contains(&needle.to_lowercase()));
        let genres = filter.option_values("genres").is_none_or(|ids| {
            song.genres
                .iter()
                .any(|genre| ids.contains(&OptionId::from(*genre)))
        });
        let pdf = !filter.bool_value("pdf") || song.has_pdf;
        title && genres && pdf
    })
}

type Pending = (LoadRequest, oneshot::Sender<Result<Vec<Song>, LoadError>>);

/// A source whose loads complete only when the test resolves them.
#[derive(Clone, Default)]
pub struct ManualSource {
    pending: Arc<Mutex<Vec<Pending>>>,
}

impl ManualSource {
    pub fn take(&self) -> Vec<Pending> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}

#[async_trait]
impl DataSource<Song> for ManualSource {
    async fn load(&self, request: LoadRequest) -> Result<Vec<Song>, LoadError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push((request, tx));
        rx.await
            .unwrap_or_else(|_| Err(LoadError::new("load abandoned")))
    }
}

/// Lets spawned tasks run without advancing the paused clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Collects values passed to a callback.
#[derive(Clone, Default)]
pub struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn push(&self, value: T) {
        self.calls.lock().unwrap().push(value);
    }

    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().unwrap().clone()
    }
}
