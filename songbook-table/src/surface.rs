//! Headless view models for the table: header cells, rows, filter panel
//! and reset chips.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::column::Alignment;
use crate::column::ColumnDefinition;
use crate::column::FilterKind;
use crate::column::OptionId;
use crate::column::Order;
use crate::filter::FilterModel;

/// Viewport width (in pixels) from which the filter panel is a side panel.
pub const DESKTOP_BREAKPOINT: u32 = 900;

pub const DEFAULT_NO_DATA_TEXT: &str = "No data found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Filters shown in a persistent side panel.
    Desktop,
    /// Filters shown in a dismissible dialog.
    Mobile,
}

impl Layout {
    pub fn for_width(width: u32, breakpoint: u32) -> Self {
        if width >= breakpoint {
            Layout::Desktop
        } else {
            Layout::Mobile
        }
    }
}

pub type ClickHandler<Id> = Arc<dyn Fn(&Id) + Send + Sync>;
pub type SelectHandler<Id> = Arc<dyn Fn(&[Id]) + Send + Sync>;

/// What clicking a row does.
pub enum Interaction<Id> {
    /// Rows are activated; the handler receives the clicked row's id.
    Click(Option<ClickHandler<Id>>),
    /// Rows toggle their selection; the handler receives every selected id.
    Select(Option<SelectHandler<Id>>),
}

impl<Id> Interaction<Id> {
    pub fn click<F>(on_click: F) -> Self
    where
        F: Fn(&Id) + Send + Sync + 'static,
    {
        Interaction::Click(Some(Arc::new(on_click)))
    }

    pub fn select<F>(on_select: F) -> Self
    where
        F: Fn(&[Id]) + Send + Sync + 'static,
    {
        Interaction::Select(Some(Arc::new(on_select)))
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Interaction::Select(_))
    }
}

impl<Id> Default for Interaction<Id> {
    fn default() -> Self {
        Interaction::Click(None)
    }
}

impl<Id> Clone for Interaction<Id> {
    fn clone(&self) -> Self {
        match self {
            Interaction::Click(handler) => Interaction::Click(handler.clone()),
            Interaction::Select(handler) => Interaction::Select(handler.clone()),
        }
    }
}

impl<Id> fmt::Debug for Interaction<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::Click(_) => f.write_str("Click"),
            Interaction::Select(_) => f.write_str("Select"),
        }
    }
}

/// Layout, dialog and dropdown state of the filter panel.
#[derive(Debug, Clone)]
pub struct FilterPanel {
    layout: Layout,
    dialog_open: bool,
    expanded: BTreeSet<String>,
}

impl FilterPanel {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            dialog_open: false,
            expanded: BTreeSet::new(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Switches layout. Any transition closes an open dialog.
    pub fn set_layout(&mut self, layout: Layout) -> bool {
        if self.layout == layout {
            return false;
        }
        self.layout = layout;
        self.dialog_open = false;
        true
    }

    /// Opens the dialog. Only possible in the mobile layout.
    pub fn open_dialog(&mut self) -> bool {
        if self.layout != Layout::Mobile || self.dialog_open {
            return false;
        }
        self.dialog_open = true;
        true
    }

    pub fn close_dialog(&mut self) -> bool {
        std::mem::replace(&mut self.dialog_open, false)
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Whether filter controls are currently on screen.
    pub fn is_visible(&self) -> bool {
        match self.layout {
            Layout::Desktop => true,
            Layout::Mobile => self.dialog_open,
        }
    }

    /// Toggles a multi-select dropdown. Returns whether it is now expanded.
    pub fn toggle_dropdown(&mut self, column: &str) -> bool {
        if self.expanded.remove(column) {
            false
        } else {
            self.expanded.insert(column.to_string());
            true
        }
    }

    pub fn is_expanded(&self, column: &str) -> bool {
        self.expanded.contains(column)
    }
}

/// One cell of the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub label: String,
    pub align: Alignment,
    pub sortable: bool,
    /// Set on the column the table is sorted by.
    pub sort_direction: Option<Order>,
    pub disable_padding: bool,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
}

impl HeaderCell {
    /// Accessible description of the active sort.
    pub fn sort_description(&self) -> Option<&'static str> {
        self.sort_direction.map(|order| match order {
            Order::Asc => "sorted ascending",
            Order::Desc => "sorted descending",
        })
    }
}

pub fn header_cells<T>(columns: &ColumnDefinition<T>, order_by: &str, order: Order) -> Vec<HeaderCell> {
    columns
        .iter()
        .map(|(key, column)| HeaderCell {
            column_id: key.to_string(),
            label: column.label.clone(),
            align: column.align,
            sortable: column.is_sortable(),
            sort_direction: (key == order_by).then_some(order),
            disable_padding: column.disable_padding,
            min_width: column.min_width.clone(),
            max_width: column.max_width.clone(),
        })
        .collect()
}

/// A row with its cells rendered in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow<Id> {
    pub id: Id,
    pub index: usize,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// A reset chip for one active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub column_id: String,
    pub title: String,
}

/// One chip per active filter, sorted by title.
pub fn filter_chips<T>(columns: &ColumnDefinition<T>, model: &FilterModel) -> Vec<FilterChip> {
    let mut chips: Vec<FilterChip> = model
        .active()
        .filter_map(|entry| {
            let settings = columns.get(&entry.column_id)?.filter_settings()?;
            Some(FilterChip {
                column_id: entry.column_id.clone(),
                title: settings.title().to_string(),
            })
        })
        .collect();
    chips.sort_by(|a, b| a.title.cmp(&b.title));
    chips
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub id: OptionId,
    pub label: String,
    pub selected: bool,
}

/// A control in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEntryView {
    Boolean {
        column_id: String,
        toggle_title: String,
        checked: bool,
    },
    Text {
        column_id: String,
        title: String,
        value: String,
    },
    MultiSelect {
        column_id: String,
        dropdown_title: String,
        expanded: bool,
        /// `None` until the options have been loaded.
        options: Option<Vec<OptionView>>,
        selected_count: usize,
    },
}

/// Filter controls in panel order, showing the displayed model.
pub fn filter_view<T>(
    columns: &ColumnDefinition<T>,
    model: &FilterModel,
    panel: &FilterPanel,
) -> Vec<FilterEntryView> {
    columns
        .filterable()
        .into_iter()
        .map(|(key, settings)| match &settings.kind {
            FilterKind::Boolean { toggle_title } => FilterEntryView::Boolean {
                column_id: key.to_string(),
                toggle_title: toggle_title.clone(),
                checked: model.bool_value(key),
            },
            FilterKind::Text { title } => FilterEntryView::Text {
                column_id: key.to_string(),
                title: title.clone(),
                value: model.text_value(key).unwrap_or_default().to_string(),
            },
            FilterKind::MultiSelect(filter) => {
                let selected = model.option_values(key);
                FilterEntryView::MultiSelect {
                    column_id: key.to_string(),
                    dropdown_title: filter.dropdown_title.clone(),
                    expanded: panel.is_expanded(key),
                    options: filter.cached_options().map(|options| {
                        options
                            .iter()
                            .map(|option| OptionView {
                                id: option.id.clone(),
                                label: option.label.clone(),
                                selected: selected.is_some_and(|ids| ids.contains(&option.id)),
                            })
                            .collect()
                    }),
                    selected_count: selected.map_or(0, |ids| ids.len()),
                }
            }
        })
        .collect()
}

/// Pagination caption, e.g. `26-37 of 37`.
pub fn displayed_rows_label(page: usize, rows_per_page: usize, count: usize) -> String {
    let from = if count == 0 { 0 } else { page * rows_per_page + 1 };
    let to = count.min((page + 1) * rows_per_page);
    format!("{}-{} of {}", from, to, count)
}

pub fn selected_label(count: usize) -> String {
    format!("{} selected", count)
}

/// Result count shown in the mobile filter dialog.
pub fn entries_found_label(count: usize) -> String {
    if count == 1 {
        "1 entry found".to_string()
    } else {
        format!("{} entries found", count)
    }
}
