//! The author list

use std::collections::BTreeMap;

use async_trait::async_trait;
use songbook_table::Column;
use songbook_table::ColumnDefinition;
use songbook_table::DataSource;
use songbook_table::FilterModel;
use songbook_table::FilterSettings;
use songbook_table::FilterValue;
use songbook_table::LoadError;
use songbook_table::LoadRequest;
use songbook_table::TableRow;
use songbook_table::column::Alignment;
use songbook_table::filter::FilterSchema;
use songbook_table::filter::FilterType;

use super::is_empty_window;
use super::page_options;
use super::text_filter;
use crate::CmsClient;
use crate::api::query::Filter;
use crate::error::Error;
use crate::model::Author;

impl TableRow for Author {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "first_name" => self.first_name.clone(),
            "songs_count" => self.songs_count.map(|n| n.to_string()),
            _ => None,
        }
    }
}

/// Columns of the author list.
pub fn author_columns() -> ColumnDefinition<Author> {
    ColumnDefinition::new()
        .column(
            "name",
            Column::new("Name")
                .sortable_by(|author: &Author| author.name.to_lowercase())
                .filter(FilterSettings::text("Name contains", 0)),
        )
        .column(
            "first_name",
            Column::new("First name")
                .sortable_by(|author: &Author| author.first_name.as_deref().unwrap_or_default().to_lowercase()),
        )
        .column(
            "songs_count",
            Column::new("Songs").align(Alignment::Right),
        )
}

/// Translates the author list's filter model into a CMS filter.
pub fn author_filter(model: &FilterModel) -> Option<Filter> {
    text_filter(model, "name", "name")
}

/// Which name authors are grouped and ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameOrder {
    #[default]
    LastName,
    FirstName,
}

/// Groups authors by the upper-cased initial of the chosen name.
///
/// Groups are ordered by letter and authors within a group by that name.
/// Authors without a first name fall back to their family name.
pub fn group_by_initial(authors: &[Author], order: NameOrder) -> BTreeMap<char, Vec<&Author>> {
    let key = |author: &Author| -> String {
        match order {
            NameOrder::LastName => author.name.clone(),
            NameOrder::FirstName => author
                .first_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| author.name.clone()),
        }
    };

    let mut sorted: Vec<&Author> = authors.iter().collect();
    sorted.sort_by_cached_key(|author| key(author).to_lowercase());

    let mut groups: BTreeMap<char, Vec<&Author>> = BTreeMap::new();
    for author in sorted {
        let initial = key(author)
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('#');
        groups.entry(initial).or_default().push(author);
    }
    groups
}

/// The song list filter that shows one author's songs.
///
/// Serialised with [`songbook_table::url_sync::to_param`] this is the
/// `filter` parameter an author entry links to.
pub fn songs_by_author_filter(author_id: i64) -> FilterModel {
    let schema: FilterSchema = [("authors".to_string(), FilterType::MultiSelect)]
        .into_iter()
        .collect();
    FilterModel::from_schema(&schema).with("authors", FilterValue::options([author_id]))
}

/// Loads pages of authors from the CMS.
#[derive(Debug, Clone)]
pub struct AuthorListSource {
    client: CmsClient,
}

impl AuthorListSource {
    pub fn new(client: CmsClient) -> Self {
        Self { client }
    }

    /// Counts the authors matching a filter model.
    pub async fn count(&self, model: &FilterModel) -> Result<usize, Error> {
        self.client.count_authors(author_filter(model)).await
    }
}

#[async_trait]
impl DataSource<Author> for AuthorListSource {
    async fn load(&self, request: LoadRequest) -> Result<Vec<Author>, LoadError> {
        if is_empty_window(&request) {
            return Ok(Vec::new());
        }
        let options = page_options(&request, author_filter(&request.filter));
        Ok(self.client.find_authors(options).await?)
    }
}
