//! Column schema: sortability, cell rendering and filter descriptors.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::error::OptionsError;
use crate::error::TableError;
use crate::filter::FilterType;

/// Text shown in a cell whose row exposes no string form for the column.
pub const UNRENDERABLE_CELL: &str = "Cannot render...";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Order {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        }
    }

    /// Applies this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Trait for items that can be displayed as rows in a searchable table.
///
/// # Examples
///
/// ```ignore
/// impl TableRow for Genre {
///     type Id = i64;
///
///     fn id(&self) -> i64 { self.id }
///
///     fn field(&self, key: &str) -> Option<String> {
///         match key {
///             "name" => Some(self.name.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Stable identifier used for click dispatch and selection.
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Returns this row's identifier.
    fn id(&self) -> Self::Id;

    /// Returns the string form of a field, used when a column has no renderer.
    fn field(&self, key: &str) -> Option<String> {
        let _ = key;
        None
    }
}

/// Compares two rows for a sort direction.
pub type Comparator<T> = Arc<dyn Fn(Order, &T, &T) -> Ordering + Send + Sync>;

/// Renders one cell of a row; receives the row and its index on the page.
pub type CellRenderer<T> = Arc<dyn Fn(&T, usize) -> String + Send + Sync>;

/// Column configuration.
///
/// # Examples
///
/// ```ignore
/// let title = Column::new("Title")
///     .sortable_by(|song: &Song| song.title.to_lowercase())
///     .filter(FilterSettings::text("Title contains", 0));
/// ```
pub struct Column<T> {
    /// Header text
    pub label: String,
    /// Horizontal alignment
    pub align: Alignment,
    /// Minimum width hint for the presentation layer
    pub min_width: Option<String>,
    /// Maximum width hint for the presentation layer
    pub max_width: Option<String>,
    /// Whether the presentation layer should drop cell padding
    pub disable_padding: bool,
    comparator: Option<Comparator<T>>,
    renderer: Option<CellRenderer<T>>,
    filter: Option<FilterSettings>,
}

impl<T> Column<T> {
    /// Create a new, unsortable and unfilterable column.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            align: Alignment::Left,
            min_width: None,
            max_width: None,
            disable_padding: false,
            comparator: None,
            renderer: None,
            filter: None,
        }
    }

    /// Make the column sortable with an explicit comparator.
    pub fn sortable<F>(mut self, comparator: F) -> Self
    where
        F: Fn(Order, &T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Make the column sortable by an ordered key.
    pub fn sortable_by<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sortable(move |order, lhs, rhs| order.apply(key(lhs).cmp(&key(rhs))))
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn min_width(mut self, width: impl Into<String>) -> Self {
        self.min_width = Some(width.into());
        self
    }

    pub fn max_width(mut self, width: impl Into<String>) -> Self {
        self.max_width = Some(width.into());
        self
    }

    pub fn disable_padding(mut self) -> Self {
        self.disable_padding = true;
        self
    }

    /// Set a custom cell renderer.
    pub fn render<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&T, usize) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Make the column filterable.
    pub fn filter(mut self, settings: FilterSettings) -> Self {
        self.filter = Some(settings);
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.comparator.is_some()
    }

    pub fn comparator(&self) -> Option<&Comparator<T>> {
        self.comparator.as_ref()
    }

    pub fn filter_settings(&self) -> Option<&FilterSettings> {
        self.filter.as_ref()
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            align: self.align,
            min_width: self.min_width.clone(),
            max_width: self.max_width.clone(),
            disable_padding: self.disable_padding,
            comparator: self.comparator.clone(),
            renderer: self.renderer.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("align", &self.align)
            .field("sortable", &self.is_sortable())
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Filter descriptors
// =============================================================================

/// Identifier of a multi-select option.
///
/// CMS ids are either numeric or strings; both survive a round trip through
/// the URL filter parameter unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Int(i64),
    Text(String),
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionId::Int(n) => write!(f, "{}", n),
            OptionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OptionId {
    fn from(n: i64) -> Self {
        OptionId::Int(n)
    }
}

impl From<i32> for OptionId {
    fn from(n: i32) -> Self {
        OptionId::Int(i64::from(n))
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId::Text(s.to_string())
    }
}

impl From<String> for OptionId {
    fn from(s: String) -> Self {
        OptionId::Text(s)
    }
}

impl From<&OptionId> for serde_json::Value {
    fn from(id: &OptionId) -> Self {
        match id {
            OptionId::Int(n) => serde_json::Value::from(*n),
            OptionId::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

/// A selectable option of a multi-select filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub id: OptionId,
    pub label: String,
}

impl FilterOption {
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Future returned by an asynchronous option source.
pub type OptionsFuture = BoxFuture<'static, Result<Vec<FilterOption>, OptionsError>>;

/// Where a multi-select filter gets its options from.
#[derive(Clone)]
pub enum OptionSource {
    /// A fixed list.
    Static(Vec<FilterOption>),
    /// Computed synchronously on first use.
    Computed(Arc<dyn Fn() -> Vec<FilterOption> + Send + Sync>),
    /// Loaded asynchronously on first use.
    Async(Arc<dyn Fn() -> OptionsFuture + Send + Sync>),
}

impl OptionSource {
    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn() -> Vec<FilterOption> + Send + Sync + 'static,
    {
        OptionSource::Computed(Arc::new(compute))
    }

    pub fn load<F>(load: F) -> Self
    where
        F: Fn() -> OptionsFuture + Send + Sync + 'static,
    {
        OptionSource::Async(Arc::new(load))
    }
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::Static(options) => f.debug_tuple("Static").field(options).finish(),
            OptionSource::Computed(_) => f.write_str("Computed(..)"),
            OptionSource::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// A multi-select filter with lazily resolved, cached options.
///
/// The cache is shared by every clone of the column definition it was
/// created in, so options are resolved at most once per definition.
#[derive(Debug, Clone)]
pub struct MultiSelectFilter {
    pub dropdown_title: String,
    source: OptionSource,
    cache: Arc<OnceCell<Vec<FilterOption>>>,
}

impl MultiSelectFilter {
    pub fn new(dropdown_title: impl Into<String>, source: OptionSource) -> Self {
        Self {
            dropdown_title: dropdown_title.into(),
            source,
            cache: Arc::new(OnceCell::new()),
        }
    }

    /// Resolves the options, loading them on first call.
    ///
    /// A failing source degrades to an empty option list.
    pub async fn options(&self) -> Vec<FilterOption> {
        self.cache
            .get_or_init(|| async {
                match &self.source {
                    OptionSource::Static(options) => options.clone(),
                    OptionSource::Computed(compute) => compute(),
                    OptionSource::Async(load) => match load().await {
                        Ok(options) => options,
                        Err(e) => {
                            log::warn!("{} ({})", e, self.dropdown_title);
                            Vec::new()
                        }
                    },
                }
            })
            .await
            .clone()
    }

    /// Returns the options if they have already been resolved.
    pub fn cached_options(&self) -> Option<&[FilterOption]> {
        self.cache.get().map(Vec::as_slice)
    }
}

/// The kind of filter a column offers.
#[derive(Debug, Clone)]
pub enum FilterKind {
    Boolean { toggle_title: String },
    Text { title: String },
    MultiSelect(MultiSelectFilter),
}

/// Filter configuration of a column.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub kind: FilterKind,
    /// Position in the filter panel (ascending).
    pub order: i32,
}

impl FilterSettings {
    pub fn boolean(toggle_title: impl Into<String>, order: i32) -> Self {
        Self {
            kind: FilterKind::Boolean {
                toggle_title: toggle_title.into(),
            },
            order,
        }
    }

    pub fn text(title: impl Into<String>, order: i32) -> Self {
        Self {
            kind: FilterKind::Text {
                title: title.into(),
            },
            order,
        }
    }

    pub fn multi_select(dropdown_title: impl Into<String>, options: OptionSource, order: i32) -> Self {
        Self {
            kind: FilterKind::MultiSelect(MultiSelectFilter::new(dropdown_title, options)),
            order,
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match &self.kind {
            FilterKind::Boolean { .. } => FilterType::Boolean,
            FilterKind::Text { .. } => FilterType::Text,
            FilterKind::MultiSelect(_) => FilterType::MultiSelect,
        }
    }

    /// The title shown for this filter in the panel and on reset chips.
    pub fn title(&self) -> &str {
        match &self.kind {
            FilterKind::Boolean { toggle_title } => toggle_title,
            FilterKind::Text { title } => title,
            FilterKind::MultiSelect(filter) => &filter.dropdown_title,
        }
    }
}

// =============================================================================
// Column definition
// =============================================================================

/// An ordered mapping from field key to column.
///
/// Iteration follows insertion order, which is also the display order of
/// the columns.
pub struct ColumnDefinition<T> {
    columns: Vec<(String, Column<T>)>,
}

impl<T> ColumnDefinition<T> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Adds a column, replacing any column with the same key in place.
    pub fn column(mut self, key: impl Into<String>, column: Column<T>) -> Self {
        let key = key.into();
        match self.columns.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = column,
            None => self.columns.push((key, column)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column<T>)> {
        self.columns.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Filterable columns in panel order.
    pub fn filterable(&self) -> Vec<(&str, &FilterSettings)> {
        let mut filterable: Vec<_> = self
            .iter()
            .filter_map(|(key, column)| column.filter_settings().map(|f| (key, f)))
            .collect();
        filterable.sort_by_key(|(_, settings)| settings.order);
        filterable
    }

    /// Returns the comparator of a sortable column.
    pub fn comparator(&self, key: &str) -> Result<&Comparator<T>, TableError> {
        let column = self
            .get(key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))?;
        column
            .comparator()
            .ok_or_else(|| TableError::NotSortable(key.to_string()))
    }

    /// Sorts rows in place by a sortable column.
    pub fn sort_rows(&self, key: &str, order: Order, rows: &mut [T]) -> Result<(), TableError> {
        let comparator = self.comparator(key)?;
        rows.sort_by(|lhs, rhs| comparator(order, lhs, rhs));
        Ok(())
    }
}

impl<T: TableRow> ColumnDefinition<T> {
    /// Renders a single cell.
    pub fn render_cell(&self, key: &str, row: &T, index: usize) -> String {
        match self.get(key).and_then(|c| c.renderer.as_ref()) {
            Some(render) => render(row, index),
            None => row
                .field(key)
                .unwrap_or_else(|| UNRENDERABLE_CELL.to_string()),
        }
    }

    /// Renders every cell of a row in column order.
    pub fn render_row(&self, row: &T, index: usize) -> Vec<String> {
        self.keys().map(|key| self.render_cell(key, row, index)).collect()
    }
}

impl<T> Default for ColumnDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ColumnDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.columns.iter().map(|(k, c)| (k, c))).finish()
    }
}
