//! Sort and pagination state.

use crate::column::ColumnDefinition;
use crate::column::Order;
use crate::error::TableError;

/// Page sizes offered by the pagination control.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 6] = [5, 10, 25, 50, 100, 200];

/// Page size used when none is configured.
pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub order_by: String,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub rows_per_page: usize,
}

/// Slice of the row set requested from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataWindow {
    pub offset: usize,
    pub limit: usize,
}

/// Tracks sort column, direction, page and page size.
#[derive(Debug, Clone)]
pub struct Controller {
    sort: SortState,
    pagination: Pagination,
}

impl Controller {
    /// Fails when `order_by` is not a sortable column or the page size is
    /// not one of [`ROWS_PER_PAGE_OPTIONS`].
    pub fn new<T>(
        columns: &ColumnDefinition<T>,
        order_by: &str,
        order: Order,
        rows_per_page: usize,
    ) -> Result<Self, TableError> {
        columns.comparator(order_by)?;
        validate_rows_per_page(rows_per_page)?;
        Ok(Self {
            sort: SortState {
                order_by: order_by.to_string(),
                order,
            },
            pagination: Pagination {
                page: 0,
                rows_per_page,
            },
        })
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Toggles the direction on the current column, otherwise sorts the
    /// new column ascending.
    pub fn request_sort<T>(
        &mut self,
        columns: &ColumnDefinition<T>,
        column: &str,
    ) -> Result<(), TableError> {
        columns.comparator(column)?;
        if self.sort.order_by == column {
            self.sort.order = self.sort.order.toggled();
        } else {
            self.sort = SortState {
                order_by: column.to_string(),
                order: Order::Asc,
            };
        }
        Ok(())
    }

    /// Moves to `page`. Returns whether the page changed.
    ///
    /// Page 0 is always accepted, even for an empty table.
    pub fn change_page(&mut self, page: usize, total_row_count: usize) -> Result<bool, TableError> {
        let page_count = self.page_count(total_row_count);
        if page > 0 && page >= page_count {
            return Err(TableError::PageOutOfRange { page, page_count });
        }
        Ok(self.set_page(page))
    }

    /// Changes the page size and returns to the first page.
    pub fn change_rows_per_page(&mut self, rows_per_page: usize) -> Result<bool, TableError> {
        validate_rows_per_page(rows_per_page)?;
        let changed = self.pagination.rows_per_page != rows_per_page || self.pagination.page != 0;
        self.pagination = Pagination {
            page: 0,
            rows_per_page,
        };
        Ok(changed)
    }

    pub(crate) fn set_page(&mut self, page: usize) -> bool {
        let changed = self.pagination.page != page;
        self.pagination.page = page;
        changed
    }

    /// The window to load for the current page.
    pub fn window(&self, total_row_count: usize) -> DataWindow {
        let Pagination {
            page,
            rows_per_page,
        } = self.pagination;
        DataWindow {
            offset: page * rows_per_page,
            limit: rows_per_page.min(total_row_count),
        }
    }

    pub fn page_count(&self, total_row_count: usize) -> usize {
        total_row_count.div_ceil(self.pagination.rows_per_page)
    }
}

fn validate_rows_per_page(rows_per_page: usize) -> Result<(), TableError> {
    if ROWS_PER_PAGE_OPTIONS.contains(&rows_per_page) {
        Ok(())
    } else {
        Err(TableError::InvalidRowsPerPage(rows_per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;

    #[derive(Clone)]
    struct Row(u32);

    fn columns() -> ColumnDefinition<Row> {
        ColumnDefinition::new()
            .column("title", Column::new("Title").sortable_by(|r: &Row| r.0))
            .column("year", Column::new("Year").sortable_by(|r: &Row| r.0))
            .column("cover", Column::new("Cover"))
    }

    fn controller() -> Controller {
        Controller::new(&columns(), "title", Order::Asc, DEFAULT_ROWS_PER_PAGE).unwrap()
    }

    #[test]
    fn test_new_validates_defaults() {
        assert_eq!(
            Controller::new(&columns(), "cover", Order::Asc, 25).err(),
            Some(TableError::NotSortable("cover".into()))
        );
        assert_eq!(
            Controller::new(&columns(), "title", Order::Asc, 30).err(),
            Some(TableError::InvalidRowsPerPage(30))
        );
    }

    #[test]
    fn test_request_sort_toggles() {
        let columns = columns();
        let mut controller = controller();

        controller.request_sort(&columns, "title").unwrap();
        assert_eq!(controller.sort().order, Order::Desc);
        controller.request_sort(&columns, "title").unwrap();
        assert_eq!(controller.sort().order, Order::Asc);
    }

    #[test]
    fn test_request_sort_new_column_starts_ascending() {
        let columns = columns();
        let mut controller = controller();
        controller.request_sort(&columns, "title").unwrap();
        controller.request_sort(&columns, "year").unwrap();
        assert_eq!(
            controller.sort(),
            &SortState {
                order_by: "year".into(),
                order: Order::Asc
            }
        );
    }

    #[test]
    fn test_request_sort_on_unsortable_column_fails() {
        let columns = columns();
        let mut controller = controller();
        assert_eq!(
            controller.request_sort(&columns, "cover"),
            Err(TableError::NotSortable("cover".into()))
        );
        assert_eq!(controller.sort().order_by, "title");
    }

    #[test]
    fn test_window_and_page_count() {
        let mut controller = controller();
        assert_eq!(controller.page_count(37), 2);
        assert_eq!(controller.change_page(1, 37), Ok(true));
        assert_eq!(controller.window(37), DataWindow { offset: 25, limit: 25 });

        assert_eq!(
            controller.change_page(2, 37),
            Err(TableError::PageOutOfRange { page: 2, page_count: 2 })
        );
    }

    #[test]
    fn test_limit_is_capped_by_total() {
        let controller = controller();
        assert_eq!(controller.window(7), DataWindow { offset: 0, limit: 7 });
        assert_eq!(controller.window(0), DataWindow { offset: 0, limit: 0 });
    }

    #[test]
    fn test_change_rows_per_page_resets_page() {
        let mut controller = controller();
        controller.change_page(3, 200).unwrap();
        assert_eq!(controller.change_rows_per_page(50), Ok(true));
        assert_eq!(
            controller.pagination(),
            Pagination {
                page: 0,
                rows_per_page: 50
            }
        );
        assert_eq!(controller.change_rows_per_page(50), Ok(false));
        assert_eq!(controller.change_rows_per_page(7), Err(TableError::InvalidRowsPerPage(7)));
    }

    #[test]
    fn test_first_page_of_empty_table() {
        let mut controller = controller();
        assert_eq!(controller.change_page(0, 0), Ok(false));
    }
}
