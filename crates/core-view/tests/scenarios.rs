//! End-to-end view scenarios against an in-memory terminal.

use core_render::{OutputMode, Region, Renderer, RendererOptions, Size};
use core_span::Span;
use core_terminal::{TerminalEvent, TestTerminal};
use core_view::{
    ContentView, GridView, LayoutError, QueueContext, ScreenView, StackLayoutView, TrackDefinition, View,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn ansi(term: &TestTerminal) -> Renderer {
    Renderer::new(
        term.clone(),
        RendererOptions {
            mode: OutputMode::Ansi,
            ..Default::default()
        },
    )
}

fn text(t: &str) -> Arc<dyn View> {
    Arc::new(ContentView::from_text(t))
}

#[test]
fn content_view_measures_its_text() {
    let r = ansi(&TestTerminal::new(10, 1));
    assert_eq!(ContentView::from_text("Four").measure(&r, Size::new(10, 1)), Size::new(4, 1));
}

#[test]
fn content_view_renders_at_region_origin() {
    let term = TestTerminal::new(10, 1);
    let mut r = ansi(&term);
    ContentView::from_text("Four")
        .render(&mut r, Region::new(0, 0, 4, 1))
        .unwrap();
    assert_eq!(term.events(), vec![TerminalEvent::ContentWritten("\x1b[1;1HFour".into())]);
}

#[test]
fn star_grid_wraps_each_cell_in_its_half() {
    let term = TestTerminal::new(10, 4);
    let mut r = ansi(&term);
    let grid = GridView::new();
    grid.set_columns([TrackDefinition::star(1), TrackDefinition::star(1)]).unwrap();
    grid.set_rows([TrackDefinition::star(1), TrackDefinition::star(1)]).unwrap();
    grid.set_child(text("The quick"), 0, 0).unwrap();
    grid.set_child(text("brown fox"), 1, 0).unwrap();
    grid.set_child(text("jumped"), 0, 1).unwrap();
    grid.set_child(text("over"), 1, 1).unwrap();

    grid.render(&mut r, Region::new(0, 0, 10, 4)).unwrap();
    assert_eq!(
        term.screen_lines(),
        vec!["The  brown", "quickfox", "jumpeover", ""]
    );
}

#[test]
fn grid_tracks_are_frozen_after_first_child() {
    let grid = GridView::new();
    grid.set_columns([TrackDefinition::fixed(3), TrackDefinition::star(1)]).unwrap();
    grid.set_child(text("x"), 1, 0).unwrap();
    assert_eq!(grid.set_columns([TrackDefinition::star(1)]), Err(LayoutError::TracksLocked));
    assert_eq!(grid.set_rows([TrackDefinition::star(1)]), Err(LayoutError::TracksLocked));
    assert_eq!(grid.columns().len(), 2);
}

#[test]
fn grid_rejects_cells_outside_its_tracks() {
    let grid = GridView::new();
    grid.set_columns([TrackDefinition::fixed(3)]).unwrap();
    assert_eq!(
        grid.set_child(text("x"), 1, 0),
        Err(LayoutError::CellOutOfRange {
            column: 1,
            row: 0,
            columns: 1,
            rows: 1
        })
    );
}

#[test]
fn vertical_stack_measures_sum_of_heights() {
    let r = ansi(&TestTerminal::new(10, 10));
    let stack = StackLayoutView::vertical();
    stack.add(text("123456789"));
    stack.add(text("abcdefghi"));
    assert_eq!(stack.measure(&r, Size::new(10, 10)), Size::new(9, 2));
}

#[test]
fn double_update_before_scheduled_task_renders_once() {
    let term = TestTerminal::new(10, 1);
    let ctx = Arc::new(QueueContext::new());
    let screen = ScreenView::new(ansi(&term), ctx.clone());
    let content = Arc::new(ContentView::from_text("first"));
    screen.set_child(Some(content.clone()));

    content.set_span(Span::content("second"));
    content.set_span(Span::content("third"));
    ctx.run_pending();

    assert_eq!(screen.render_count(), 1);
    assert_eq!(term.screen_lines(), vec!["third"]);
}
