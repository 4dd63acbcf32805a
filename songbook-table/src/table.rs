//! The searchable table: ties the column schema, filter store, URL sync,
//! sort/paginate controller and loader together.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::column::ColumnDefinition;
use crate::column::FilterKind;
use crate::column::FilterOption;
use crate::column::MultiSelectFilter;
use crate::column::OptionId;
use crate::column::Order;
use crate::column::TableRow;
use crate::controller::Controller;
use crate::controller::DEFAULT_ROWS_PER_PAGE;
use crate::controller::Pagination;
use crate::controller::SortState;
use crate::debounce::Debouncer;
use crate::error::LoadError;
use crate::error::TableError;
use crate::filter::FilterModel;
use crate::filter::FilterSchema;
use crate::filter::FilterStore;
use crate::filter::FilterType;
use crate::filter::FilterValue;
use crate::loader::Completion;
use crate::loader::DataSource;
use crate::loader::LoadRequest;
use crate::loader::LoaderState;
use crate::location::Location;
use crate::selection::SelectAllState;
use crate::selection::Selection;
use crate::surface;
use crate::surface::DESKTOP_BREAKPOINT;
use crate::surface::FilterChip;
use crate::surface::FilterEntryView;
use crate::surface::FilterPanel;
use crate::surface::HeaderCell;
use crate::surface::Interaction;
use crate::surface::Layout;
use crate::surface::RenderedRow;
use crate::url_sync;
use crate::url_sync::FilterUrlSync;

/// Default debounce window between a filter edit and its propagation.
pub const DEFAULT_FILTER_CHANGE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Receives the committed filter model after every change.
pub type FilterChangeCallback = Arc<dyn Fn(&FilterModel) + Send + Sync>;

/// Configuration of a [`SearchableTable`].
///
/// # Example
///
/// ```ignore
/// let config = TableConfig::new("title")
///     .with_title("Songs")
///     .with_filter_change_debounce(Duration::from_millis(300))
///     .with_url_filtering(location.clone())
///     .with_interaction(Interaction::click(|id: &i64| open_song(*id)));
/// ```
pub struct TableConfig<T: TableRow> {
    pub default_order: String,
    pub default_direction: Order,
    pub initial_filter: Vec<(String, FilterValue)>,
    pub filter_change_debounce: Duration,
    /// Location the filters are synced into; `None` disables URL filtering.
    pub location: Option<Location>,
    pub rows_per_page: usize,
    pub desktop_breakpoint: u32,
    pub viewport_width: u32,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub no_data_text: Option<String>,
    pub interaction: Interaction<T::Id>,
    pub on_filter_change: Option<FilterChangeCallback>,
}

impl<T: TableRow> TableConfig<T> {
    /// Sorts ascending by `default_order` initially.
    pub fn new(default_order: impl Into<String>) -> Self {
        Self {
            default_order: default_order.into(),
            default_direction: Order::Asc,
            initial_filter: Vec::new(),
            filter_change_debounce: DEFAULT_FILTER_CHANGE_DEBOUNCE,
            location: None,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            desktop_breakpoint: DESKTOP_BREAKPOINT,
            viewport_width: DESKTOP_BREAKPOINT,
            title: None,
            subtitle: None,
            no_data_text: None,
            interaction: Interaction::default(),
            on_filter_change: None,
        }
    }

    pub fn with_default_direction(mut self, order: Order) -> Self {
        self.default_direction = order;
        self
    }

    /// Adds an initial filter value. Initial filters take precedence over
    /// the filters found in the URL.
    pub fn with_initial_filter(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.initial_filter.push((column.into(), value));
        self
    }

    pub fn with_filter_change_debounce(mut self, debounce: Duration) -> Self {
        self.filter_change_debounce = debounce;
        self
    }

    /// Enables reading and writing the `filter` query parameter of `location`.
    pub fn with_url_filtering(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }

    pub fn with_desktop_breakpoint(mut self, breakpoint: u32) -> Self {
        self.desktop_breakpoint = breakpoint;
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_no_data_text(mut self, text: impl Into<String>) -> Self {
        self.no_data_text = Some(text.into());
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction<T::Id>) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_on_filter_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FilterModel) + Send + Sync + 'static,
    {
        self.on_filter_change = Some(Arc::new(callback));
        self
    }
}

struct TableState<T: TableRow> {
    controller: Controller,
    filters: FilterStore,
    url_sync: Option<FilterUrlSync>,
    debouncer: Debouncer,
    loader: LoaderState<T>,
    selection: Selection<T::Id>,
    panel: FilterPanel,
    total_row_count: usize,
    loading_override: bool,
}

struct Shared<T: TableRow> {
    columns: ColumnDefinition<T>,
    source: Arc<dyn DataSource<T>>,
    location: Option<Location>,
    interaction: Interaction<T::Id>,
    on_filter_change: Option<FilterChangeCallback>,
    title: Option<String>,
    subtitle: Option<String>,
    no_data_text: Option<String>,
    desktop_breakpoint: u32,
    state: Mutex<TableState<T>>,
    revision: watch::Sender<u64>,
}

impl<T: TableRow> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, TableState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn check_column(&self, column: &str) -> Result<(), TableError> {
        if self.columns.contains(column) {
            Ok(())
        } else {
            Err(TableError::UnknownColumn(column.to_string()))
        }
    }

    /// Issues a load for the current parameters and spawns it.
    fn start_load(self: &Arc<Self>, state: &mut TableState<T>) {
        let window = state.controller.window(state.total_row_count);
        let sort = state.controller.sort().clone();
        let request = LoadRequest {
            offset: window.offset,
            limit: window.limit,
            order: sort.order,
            order_by: sort.order_by,
            filter: state.filters.committed().clone(),
        };
        let generation = state.loader.issue(request.clone());
        log::debug!(
            "Loading {} (offset {}, limit {}, {} {})",
            generation,
            request.offset,
            request.limit,
            request.order_by,
            request.order
        );

        let source = Arc::clone(&self.source);
        let shared = Arc::downgrade(self);
        tokio::spawn(async move {
            let result = source.load(request).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let completion = shared.lock().loader.complete(generation, result);
            if completion == Completion::Applied {
                shared.bump();
            }
        });
    }

    fn edit_filters<F>(self: &Arc<Self>, column: Option<&str>, edit: F) -> Result<bool, TableError>
    where
        F: FnOnce(&mut FilterStore) -> Result<bool, TableError>,
    {
        if let Some(column) = column {
            self.check_column(column)?;
        }
        let changed = {
            let mut state = self.lock();
            let changed = edit(&mut state.filters)?;
            if changed {
                let shared = Arc::downgrade(self);
                state.debouncer.schedule(move || {
                    if let Some(shared) = shared.upgrade() {
                        shared.commit_filters();
                    }
                });
            }
            changed
        };
        if changed {
            self.bump();
        }
        Ok(changed)
    }

    /// Promotes the displayed filters and propagates them to the loader,
    /// the URL and the filter change callback.
    fn commit_filters(self: &Arc<Self>) {
        let committed = {
            let mut state = self.lock();
            state.debouncer.disarm();
            let Some(committed) = state.filters.commit() else {
                self.restore_url(&mut state);
                return;
            };
            state.controller.set_page(0);
            if let Some(location) = &self.location
                && let Some(sync) = state.url_sync.as_mut()
            {
                sync.record_push(&committed);
                let next = sync.url_for(&location.current(), &committed);
                location.navigate(next);
            }
            self.start_load(&mut state);
            committed
        };
        self.bump();
        if let Some(callback) = &self.on_filter_change {
            callback(&committed);
        }
    }

    /// Pushes the committed filters back into a URL that drifted from them
    /// while a local edit was pending and was then reverted.
    fn restore_url(&self, state: &mut TableState<T>) {
        let (Some(location), Some(sync)) = (&self.location, state.url_sync.as_mut()) else {
            return;
        };
        let current = location.current();
        let committed = state.filters.committed();
        if sync.is_out_of_sync(&current, committed) {
            log::debug!("Restoring URL filters after a reverted edit");
            sync.record_push(committed);
            location.navigate(sync.url_for(&current, committed));
        }
    }

    /// Pulls a filter change made to the URL by someone else.
    fn apply_url(self: &Arc<Self>, url: &Url) {
        let committed = {
            let mut state = self.lock();
            let observed = state.url_sync.as_mut().and_then(|sync| sync.observe(url));
            let Some(model) = observed else {
                return;
            };
            if state.filters.is_pending() {
                log::debug!("Keeping pending filter edit over URL change");
                return;
            }
            if *state.filters.committed() == model {
                return;
            }
            log::debug!("Taking filters from URL");
            state.filters.replace(model);
            state.controller.set_page(0);
            self.start_load(&mut state);
            state.filters.committed().clone()
        };
        self.bump();
        if let Some(callback) = &self.on_filter_change {
            callback(&committed);
        }
    }
}

/// A paginated, sortable, filterable table over a [`DataSource`].
///
/// All state lives behind the table; the presentation layer reads view
/// models from it and calls its operations in response to user input.
/// Every change bumps a revision counter observable through
/// [`SearchableTable::subscribe`].
///
/// Loads, debounce timers and URL listening run as tokio tasks, so the
/// table must be created inside a tokio runtime. Dropping the table
/// cancels a pending filter commit and discards in-flight loads.
pub struct SearchableTable<T: TableRow> {
    shared: Arc<Shared<T>>,
    url_listener: Option<JoinHandle<()>>,
}

impl<T: TableRow> SearchableTable<T> {
    /// Builds the table and issues the first load.
    pub fn new<S>(
        columns: ColumnDefinition<T>,
        source: S,
        total_row_count: usize,
        config: TableConfig<T>,
    ) -> Result<Self, TableError>
    where
        S: DataSource<T> + 'static,
    {
        let controller = Controller::new(
            &columns,
            &config.default_order,
            config.default_direction,
            config.rows_per_page,
        )?;

        let schema = FilterSchema::from_columns(&columns);
        let mut url_sync = config
            .location
            .as_ref()
            .map(|_| FilterUrlSync::new(schema.clone()));
        let url_model = match (&config.location, url_sync.as_mut()) {
            (Some(location), Some(sync)) => Some(sync.initial_model(&location.current())),
            _ => None,
        };

        let mut filters = FilterStore::new(schema);
        if config.initial_filter.is_empty() {
            if let Some(model) = url_model {
                filters.replace(model);
            }
        } else {
            for (column, value) in config.initial_filter {
                if !columns.contains(&column) {
                    return Err(TableError::UnknownColumn(column));
                }
                filters.set_filter(&column, Some(value))?;
            }
            filters.commit();
            if let (Some(location), Some(sync)) = (&config.location, url_sync.as_mut()) {
                let current = location.current();
                if sync.is_out_of_sync(&current, filters.committed()) {
                    log::debug!("Writing initial filters into the URL");
                    sync.record_push(filters.committed());
                    location.navigate(sync.url_for(&current, filters.committed()));
                }
            }
        }

        let layout = Layout::for_width(config.viewport_width, config.desktop_breakpoint);
        let state = TableState {
            controller,
            filters,
            url_sync,
            debouncer: Debouncer::new(config.filter_change_debounce),
            loader: LoaderState::new(),
            selection: Selection::new(),
            panel: FilterPanel::new(layout),
            total_row_count,
            loading_override: false,
        };
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            columns,
            source: Arc::new(source),
            location: config.location,
            interaction: config.interaction,
            on_filter_change: config.on_filter_change,
            title: config.title,
            subtitle: config.subtitle,
            no_data_text: config.no_data_text,
            desktop_breakpoint: config.desktop_breakpoint,
            state: Mutex::new(state),
            revision,
        });

        let url_listener = shared
            .location
            .as_ref()
            .map(|location| spawn_url_listener(&shared, location));

        {
            let mut state = shared.lock();
            shared.start_load(&mut state);
        }

        Ok(Self {
            shared,
            url_listener,
        })
    }

    // =========================================================================
    // Sorting and pagination
    // =========================================================================

    /// Sorts by `column`, toggling the direction if it already is the sort column.
    pub fn request_sort(&self, column: &str) -> Result<(), TableError> {
        {
            let mut state = self.shared.lock();
            state.controller.request_sort(&self.shared.columns, column)?;
            self.shared.start_load(&mut state);
        }
        self.shared.bump();
        Ok(())
    }

    pub fn change_page(&self, page: usize) -> Result<bool, TableError> {
        let changed = {
            let mut state = self.shared.lock();
            let total = state.total_row_count;
            let changed = state.controller.change_page(page, total)?;
            if changed {
                self.shared.start_load(&mut state);
            }
            changed
        };
        if changed {
            self.shared.bump();
        }
        Ok(changed)
    }

    /// Changes the page size and returns to the first page.
    pub fn change_rows_per_page(&self, rows_per_page: usize) -> Result<bool, TableError> {
        let changed = {
            let mut state = self.shared.lock();
            let changed = state.controller.change_rows_per_page(rows_per_page)?;
            if changed {
                self.shared.start_load(&mut state);
            }
            changed
        };
        if changed {
            self.shared.bump();
        }
        Ok(changed)
    }

    /// Updates the total row count reported by the page.
    pub fn set_total_row_count(&self, total_row_count: usize) {
        {
            let mut state = self.shared.lock();
            if state.total_row_count == total_row_count {
                return;
            }
            state.total_row_count = total_row_count;
            self.shared.start_load(&mut state);
        }
        self.shared.bump();
    }

    /// Reissues a load with the current parameters.
    pub fn reload(&self) {
        {
            let mut state = self.shared.lock();
            self.shared.start_load(&mut state);
        }
        self.shared.bump();
    }

    /// Forces the loading indicator on, e.g. while the page refreshes the
    /// total row count.
    pub fn set_loading_override(&self, loading: bool) {
        self.shared.lock().loading_override = loading;
        self.shared.bump();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Sets the displayed value of a filter; `None` clears it.
    ///
    /// The change is committed after the debounce window. Returns
    /// `Ok(false)` if the displayed model did not change.
    pub fn set_filter(&self, column: &str, value: Option<FilterValue>) -> Result<bool, TableError> {
        self.shared
            .edit_filters(Some(column), |filters| filters.set_filter(column, value))
    }

    /// Sets a text filter; an empty string clears it.
    pub fn set_text_filter(&self, column: &str, text: impl Into<String>) -> Result<bool, TableError> {
        self.set_filter(column, Some(FilterValue::Text(text.into())))
    }

    /// Sets a boolean filter; `false` clears it.
    pub fn set_boolean_filter(&self, column: &str, enabled: bool) -> Result<bool, TableError> {
        self.set_filter(column, Some(FilterValue::Boolean(enabled)))
    }

    /// Adds or removes one option of a multi-select filter.
    pub fn toggle_filter_option(&self, column: &str, id: impl Into<OptionId>) -> Result<bool, TableError> {
        let id = id.into();
        self.shared
            .edit_filters(Some(column), |filters| filters.toggle_option(column, id))
    }

    /// Clears one filter (deleting its reset chip).
    pub fn reset_filter(&self, column: &str) -> Result<bool, TableError> {
        self.shared
            .edit_filters(Some(column), |filters| filters.reset_filter(column))
    }

    /// Clears every filter.
    pub fn reset_all_filters(&self) -> bool {
        self.shared
            .edit_filters(None, |filters| Ok(filters.reset_all()))
            .unwrap_or(false)
    }

    /// Commits pending filter edits without waiting for the debounce window.
    pub fn flush_filters(&self) {
        self.shared.lock().debouncer.cancel();
        self.shared.commit_filters();
    }

    fn multi_select_filter(&self, column: &str) -> Result<&MultiSelectFilter, TableError> {
        self.shared.check_column(column)?;
        let settings = self
            .shared
            .columns
            .get(column)
            .and_then(|c| c.filter_settings())
            .ok_or_else(|| TableError::NotFilterable(column.to_string()))?;
        match &settings.kind {
            FilterKind::MultiSelect(filter) => Ok(filter),
            _ => Err(TableError::FilterTypeMismatch {
                column: column.to_string(),
                expected: settings.filter_type(),
                actual: FilterType::MultiSelect,
            }),
        }
    }

    /// Resolves the options of a multi-select filter, loading them on first use.
    pub async fn load_filter_options(&self, column: &str) -> Result<Vec<FilterOption>, TableError> {
        let filter = self.multi_select_filter(column)?;
        let first_load = filter.cached_options().is_none();
        let options = filter.options().await;
        if first_load {
            self.shared.bump();
        }
        Ok(options)
    }

    /// Expands or collapses a multi-select dropdown, loading its options
    /// when it opens. Returns whether it is now expanded.
    pub async fn toggle_filter_dropdown(&self, column: &str) -> Result<bool, TableError> {
        self.multi_select_filter(column)?;
        let expanded = self.shared.lock().panel.toggle_dropdown(column);
        self.shared.bump();
        if expanded {
            self.load_filter_options(column).await?;
        }
        Ok(expanded)
    }

    // =========================================================================
    // Rows, selection and layout
    // =========================================================================

    /// Routes a row click: activates the row in click mode, toggles its
    /// selection in selection mode.
    pub fn click_row(&self, id: &T::Id) {
        match &self.shared.interaction {
            Interaction::Click(on_click) => {
                if let Some(on_click) = on_click {
                    on_click(id);
                }
            }
            Interaction::Select(on_select) => {
                let ids = {
                    let mut state = self.shared.lock();
                    state.selection.toggle(id.clone());
                    state.selection.ids()
                };
                self.shared.bump();
                if let Some(on_select) = on_select {
                    on_select(&ids);
                }
            }
        }
    }

    /// Selects every visible row, or clears the selection. No-op in click mode.
    pub fn select_all(&self, checked: bool) {
        let Interaction::Select(on_select) = &self.shared.interaction else {
            return;
        };
        let ids = {
            let mut state = self.shared.lock();
            if checked {
                let visible: Vec<T::Id> = state.loader.rows().iter().map(TableRow::id).collect();
                state.selection.select_only(visible);
            } else {
                state.selection.clear();
            }
            state.selection.ids()
        };
        self.shared.bump();
        if let Some(on_select) = on_select {
            on_select(&ids);
        }
    }

    /// Updates the viewport width; crossing the breakpoint closes the filter dialog.
    pub fn set_viewport_width(&self, width: u32) {
        let layout = Layout::for_width(width, self.shared.desktop_breakpoint);
        if self.shared.lock().panel.set_layout(layout) {
            self.shared.bump();
        }
    }

    /// Opens the filter dialog. Only possible in the mobile layout of a
    /// table with filterable columns.
    pub fn open_filter_dialog(&self) -> bool {
        if !self.shows_filters() {
            return false;
        }
        let opened = self.shared.lock().panel.open_dialog();
        if opened {
            self.shared.bump();
        }
        opened
    }

    pub fn close_filter_dialog(&self) {
        if self.shared.lock().panel.close_dialog() {
            self.shared.bump();
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn columns(&self) -> &ColumnDefinition<T> {
        &self.shared.columns
    }

    pub fn rows(&self) -> Vec<T> {
        self.shared.lock().loader.rows().to_vec()
    }

    /// The loaded rows with their cells rendered.
    pub fn rendered_rows(&self) -> Vec<RenderedRow<T::Id>> {
        let state = self.shared.lock();
        state
            .loader
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let id = row.id();
                RenderedRow {
                    selected: self.shared.interaction.is_selection()
                        && state.selection.is_selected(&id),
                    id,
                    index,
                    cells: self.shared.columns.render_row(row, index),
                }
            })
            .collect()
    }

    pub fn header(&self) -> Vec<HeaderCell> {
        let sort = self.sort();
        surface::header_cells(&self.shared.columns, &sort.order_by, sort.order)
    }

    pub fn filter_view(&self) -> Vec<FilterEntryView> {
        let state = self.shared.lock();
        surface::filter_view(&self.shared.columns, state.filters.displayed(), &state.panel)
    }

    pub fn filter_chips(&self) -> Vec<FilterChip> {
        surface::filter_chips(&self.shared.columns, self.shared.lock().filters.displayed())
    }

    pub fn shows_filters(&self) -> bool {
        !self.shared.columns.filterable().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        let state = self.shared.lock();
        state.loader.is_loading() || state.loading_override
    }

    /// Number of skeleton rows to show while loading.
    pub fn loading_placeholder_rows(&self) -> usize {
        let state = self.shared.lock();
        if state.loader.is_loading() || state.loading_override {
            state
                .total_row_count
                .min(state.controller.pagination().rows_per_page)
        } else {
            0
        }
    }

    /// Error of the last applied load, if it failed.
    pub fn error(&self) -> Option<LoadError> {
        self.shared.lock().loader.error().cloned()
    }

    pub fn last_request(&self) -> Option<LoadRequest> {
        self.shared.lock().loader.last_request().cloned()
    }

    /// The filter model shown in the filter controls.
    pub fn displayed_filter(&self) -> FilterModel {
        self.shared.lock().filters.displayed().clone()
    }

    /// The filter model loads are issued with.
    pub fn committed_filter(&self) -> FilterModel {
        self.shared.lock().filters.committed().clone()
    }

    pub fn has_pending_filter_change(&self) -> bool {
        self.shared.lock().filters.is_pending()
    }

    pub fn sort(&self) -> SortState {
        self.shared.lock().controller.sort().clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.shared.lock().controller.pagination()
    }

    pub fn total_row_count(&self) -> usize {
        self.shared.lock().total_row_count
    }

    pub fn page_count(&self) -> usize {
        let state = self.shared.lock();
        state.controller.page_count(state.total_row_count)
    }

    pub fn displayed_rows_label(&self) -> String {
        let state = self.shared.lock();
        let pagination = state.controller.pagination();
        surface::displayed_rows_label(
            pagination.page,
            pagination.rows_per_page,
            state.total_row_count,
        )
    }

    pub fn entries_found_label(&self) -> String {
        surface::entries_found_label(self.total_row_count())
    }

    pub fn selected_ids(&self) -> Vec<T::Id> {
        self.shared.lock().selection.ids()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        let state = self.shared.lock();
        state.selection.select_all_state(state.loader.rows().len())
    }

    /// "n selected" while rows are selected, the title otherwise.
    pub fn toolbar_text(&self) -> Option<String> {
        let selected = self.shared.lock().selection.len();
        if selected > 0 {
            Some(surface::selected_label(selected))
        } else {
            self.shared.title.clone()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.shared.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.shared.subtitle.as_deref()
    }

    pub fn no_data_text(&self) -> &str {
        self.shared
            .no_data_text
            .as_deref()
            .unwrap_or(surface::DEFAULT_NO_DATA_TEXT)
    }

    pub fn layout(&self) -> Layout {
        self.shared.lock().panel.layout()
    }

    pub fn is_filter_dialog_open(&self) -> bool {
        self.shared.lock().panel.is_dialog_open()
    }

    /// The `filter` query parameter for the committed filters.
    pub fn filter_param(&self) -> Option<String> {
        url_sync::to_param(self.shared.lock().filters.committed())
    }

    /// Current URL of the synced location.
    pub fn share_url(&self) -> Option<Url> {
        self.shared.location.as_ref().map(Location::current)
    }

    /// Receives the revision number, bumped on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Waits until no filter edit is pending and no load is in flight.
    pub async fn settled(&self) {
        let mut revision = self.subscribe();
        loop {
            {
                let state = self.shared.lock();
                if !state.filters.is_pending() && !state.loader.is_loading() {
                    return;
                }
            }
            if revision.changed().await.is_err() {
                return;
            }
        }
    }
}

impl<T: TableRow> Drop for SearchableTable<T> {
    fn drop(&mut self) {
        if let Some(listener) = self.url_listener.take() {
            listener.abort();
        }
        let mut state = self.shared.lock();
        state.debouncer.cancel();
        state.loader.invalidate();
    }
}

fn spawn_url_listener<T: TableRow>(shared: &Arc<Shared<T>>, location: &Location) -> JoinHandle<()> {
    let mut urls = location.subscribe();
    let shared = Arc::downgrade(shared);
    tokio::spawn(async move {
        while urls.changed().await.is_ok() {
            let url = urls.borrow_and_update().clone();
            let Some(shared) = shared.upgrade() else {
                break;
            };
            shared.apply_url(&url);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::column::FilterSettings;
    use crate::loader::MemorySource;

    #[derive(Debug, Clone, PartialEq)]
    struct Song {
        id: i64,
        title: String,
    }

    impl TableRow for Song {
        type Id = i64;

        fn id(&self) -> i64 {
            self.id
        }

        fn field(&self, key: &str) -> Option<String> {
            (key == "title").then(|| self.title.clone())
        }
    }

    fn columns() -> ColumnDefinition<Song> {
        ColumnDefinition::new().column(
            "title",
            Column::new("Title")
                .sortable_by(|s: &Song| s.title.clone())
                .filter(FilterSettings::text("Title contains", 0)),
        )
    }

    fn source() -> MemorySource<Song> {
        let songs = ["Wind", "Rain", "Windmill"]
            .iter()
            .enumerate()
            .map(|(i, title)| Song {
                id: i as i64 + 1,
                title: title.to_string(),
            })
            .collect();
        MemorySource::new(songs, columns()).with_predicate(|song, filter| {
            filter
                .text_value("title")
                .is_none_or(|needle| song.title.contains(needle))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load() {
        let table = SearchableTable::new(columns(), source(), 3, TableConfig::new("title")).unwrap();
        assert!(table.is_loading());
        assert_eq!(table.loading_placeholder_rows(), 3);

        table.settled().await;
        let titles: Vec<_> = table.rows().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Rain", "Wind", "Windmill"]);
        assert_eq!(table.loading_placeholder_rows(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_default_order_fails() {
        let result = SearchableTable::new(columns(), source(), 3, TableConfig::new("year"));
        assert_eq!(result.err(), Some(TableError::UnknownColumn("year".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_filter_is_validated() {
        let config = TableConfig::new("title").with_initial_filter("title", FilterValue::Boolean(true));
        assert!(matches!(
            SearchableTable::new(columns(), source(), 3, config).err(),
            Some(TableError::FilterTypeMismatch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_edit_commits_after_debounce() {
        let table = SearchableTable::new(columns(), source(), 3, TableConfig::new("title")).unwrap();
        table.settled().await;

        assert_eq!(table.set_text_filter("title", "Wind"), Ok(true));
        assert_eq!(table.displayed_filter().text_value("title"), Some("Wind"));
        assert_eq!(table.committed_filter().text_value("title"), None);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(table.has_pending_filter_change());

        table.settled().await;
        let titles: Vec<_> = table.rows().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Wind", "Windmill"]);
        assert_eq!(table.filter_param().as_deref(), Some(r#"{"title":"Wind"}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_commit() {
        let committed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&committed);
        let config = TableConfig::new("title").with_on_filter_change(move |_| {
            if let Ok(mut count) = counter.lock() {
                *count += 1;
            }
        });
        let table = SearchableTable::new(columns(), source(), 3, config).unwrap();
        table.set_text_filter("title", "Rain").unwrap();
        drop(table);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*committed.lock().unwrap(), 0);
    }
}
