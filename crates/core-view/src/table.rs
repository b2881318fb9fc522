//! Table of items backed by a generated grid.
//!
//! Each column pairs a header view with a cell factory. Setting items or
//! adding a column rebuilds the backing [`GridView`]: one header row, then
//! one size-to-content row per item. Measure and render delegate to the
//! current grid. Updates of the grid's cells are re-raised on the table.
//!
//! Cell factories may read the table (`items`, `item_count`, ...) but must
//! not modify it.

use crate::error::LayoutError;
use crate::grid::{ColumnDefinition, GridView, TrackDefinition};
use crate::notify::{SubscriptionId, UpdateNotifier, forward};
use crate::view::View;
use anyhow::Result;
use core_render::{Region, Renderer, Size};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::debug;

pub type CellFactory<T> = Arc<dyn Fn(&T) -> Arc<dyn View> + Send + Sync>;

pub struct TableViewColumn<T> {
    pub header: Arc<dyn View>,
    pub cell: CellFactory<T>,
    pub definition: ColumnDefinition,
}

impl<T> Clone for TableViewColumn<T> {
    fn clone(&self) -> Self {
        Self {
            header: Arc::clone(&self.header),
            cell: Arc::clone(&self.cell),
            definition: self.definition,
        }
    }
}

impl<T> TableViewColumn<T> {
    /// A size-to-content column.
    pub fn new(header: Arc<dyn View>, cell: impl Fn(&T) -> Arc<dyn View> + Send + Sync + 'static) -> Self {
        Self {
            header,
            cell: Arc::new(cell),
            definition: TrackDefinition::size_to_content(),
        }
    }

    pub fn with_definition(mut self, definition: ColumnDefinition) -> Self {
        self.definition = definition;
        self
    }
}

struct TableState<T> {
    items: Vec<T>,
    columns: Vec<TableViewColumn<T>>,
    grid: Arc<GridView>,
    forward: SubscriptionId,
}

pub struct TableView<T> {
    state: RwLock<TableState<T>>,
    /// Serializes rebuilds so the state lock is only taken for reads while
    /// cell factories run.
    edit: Mutex<()>,
    gutter: u16,
    updated: UpdateNotifier,
}

pub const DEFAULT_TABLE_GUTTER: u16 = 1;

impl<T: Send + Sync + 'static> Default for TableView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> TableView<T> {
    pub fn new() -> Self {
        Self::with_gutter(DEFAULT_TABLE_GUTTER)
    }

    pub fn with_gutter(gutter: u16) -> Self {
        let updated = UpdateNotifier::new();
        let grid = Arc::new(GridView::new().with_gutter(gutter));
        let forward = forward(grid.updated(), &updated);
        Self {
            state: RwLock::new(TableState {
                items: Vec::new(),
                columns: Vec::new(),
                grid,
                forward,
            }),
            edit: Mutex::new(()),
            gutter,
            updated,
        }
    }

    pub fn gutter(&self) -> u16 {
        self.gutter
    }

    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.state.read().items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn column_count(&self) -> usize {
        self.state.read().columns.len()
    }

    /// The grid currently backing the table.
    pub fn grid(&self) -> Arc<GridView> {
        Arc::clone(&self.state.read().grid)
    }

    pub fn set_items(&self, items: impl IntoIterator<Item = T>) -> Result<(), LayoutError> {
        {
            let _edit = self.edit.lock();
            let items: Vec<T> = items.into_iter().collect();
            let columns = self.state.read().columns.clone();
            let grid = build_grid(&columns, &items, self.gutter)?;
            let mut state = self.state.write();
            state.items = items;
            self.install(&mut state, grid);
        }
        self.updated.notify();
        Ok(())
    }

    pub fn add_column(&self, column: TableViewColumn<T>) -> Result<(), LayoutError> {
        {
            let _edit = self.edit.lock();
            let (columns, grid) = {
                let state = self.state.read();
                let mut columns = state.columns.clone();
                columns.push(column);
                let grid = build_grid(&columns, &state.items, self.gutter)?;
                (columns, grid)
            };
            let mut state = self.state.write();
            state.columns = columns;
            self.install(&mut state, grid);
        }
        self.updated.notify();
        Ok(())
    }

    fn install(&self, state: &mut TableState<T>, grid: GridView) {
        let grid = Arc::new(grid);
        let forward = forward(grid.updated(), &self.updated);
        let old = std::mem::replace(&mut state.grid, grid);
        old.updated().unsubscribe(state.forward);
        state.forward = forward;
        debug!(
            target: "view.grid",
            columns = state.columns.len(),
            items = state.items.len(),
            "table_rebuilt"
        );
    }
}

/// Header row plus one size-to-content row per item. Cell factories run here,
/// outside the table's write lock.
fn build_grid<T>(columns: &[TableViewColumn<T>], items: &[T], gutter: u16) -> Result<GridView, LayoutError> {
    let grid = GridView::new().with_gutter(gutter);
    if columns.is_empty() {
        return Ok(grid);
    }
    grid.set_columns(columns.iter().map(|c| c.definition))?;
    grid.set_rows((0..=items.len()).map(|_| TrackDefinition::size_to_content()))?;
    for (col, column) in columns.iter().enumerate() {
        grid.set_child(Arc::clone(&column.header), col, 0)?;
        for (row, item) in items.iter().enumerate() {
            grid.set_child((column.cell)(item), col, row + 1)?;
        }
    }
    Ok(grid)
}

impl<T: Send + Sync + 'static> View for TableView<T> {
    fn measure(&self, renderer: &Renderer, max: Size) -> Size {
        self.grid().measure(renderer, max)
    }

    fn render(&self, renderer: &mut Renderer, region: Region) -> Result<()> {
        self.grid().render(renderer, region)
    }

    fn updated(&self) -> &UpdateNotifier {
        &self.updated
    }
}

impl<T> Drop for TableView<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.grid.updated().unsubscribe(state.forward);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentView;
    use core_render::RendererOptions;
    use core_terminal::{OutputMode, TestTerminal};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Person {
        name: &'static str,
        age: u32,
    }

    fn people_table() -> TableView<Person> {
        let table = TableView::new();
        table
            .add_column(TableViewColumn::new(Arc::new(ContentView::from_text("Name")), |p: &Person| {
                Arc::new(ContentView::from_text(p.name)) as Arc<dyn View>
            }))
            .unwrap();
        table
            .add_column(TableViewColumn::new(Arc::new(ContentView::from_text("Age")), |p: &Person| {
                Arc::new(ContentView::from_text(p.age.to_string())) as Arc<dyn View>
            }))
            .unwrap();
        table
    }

    fn renderer() -> Renderer {
        Renderer::new(
            TestTerminal::new(30, 6),
            RendererOptions {
                mode: OutputMode::Ansi,
                ..Default::default()
            },
        )
    }

    #[test]
    fn header_row_plus_one_row_per_item() {
        let table = people_table();
        table
            .set_items([Person { name: "Ada", age: 36 }, Person { name: "Grace", age: 85 }])
            .unwrap();
        assert_eq!(table.grid().rows().len(), 3);
        // "Grace" + gutter + "Age"
        assert_eq!(table.measure(&renderer(), Size::new(30, 6)), Size::new(9, 3));
    }

    #[test]
    fn rebuild_notifies_and_moves_forwarding_to_new_grid() {
        let table = people_table();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        table.updated().subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let old = table.grid();
        table.set_items([Person { name: "Ada", age: 36 }]).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(old.updated().listener_count(), 0);
        assert!(!Arc::ptr_eq(&old, &table.grid()));
    }

    #[test]
    fn table_without_columns_measures_empty() {
        let table: TableView<Person> = TableView::new();
        table.set_items([Person { name: "Ada", age: 36 }]).unwrap();
        assert_eq!(table.measure(&renderer(), Size::new(30, 6)), Size::ZERO);
    }

    #[test]
    fn cell_factories_can_read_the_table() {
        let table: Arc<TableView<u32>> = Arc::new(TableView::new());
        let weak = Arc::downgrade(&table);
        table
            .add_column(TableViewColumn::new(Arc::new(ContentView::from_text("n")), move |n: &u32| {
                let total = weak.upgrade().map_or(0, |t| t.items().len());
                Arc::new(ContentView::from_text(format!("{n}/{total}"))) as Arc<dyn View>
            }))
            .unwrap();
        table.set_items([1, 2]).unwrap();
        table
            .add_column(TableViewColumn::new(Arc::new(ContentView::from_text("c")), |_: &u32| {
                Arc::new(ContentView::from_text("x")) as Arc<dyn View>
            }))
            .unwrap();
        assert_eq!(table.item_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.grid().rows().len(), 3);
    }
}
