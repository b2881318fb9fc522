//! Demo view trees.

use anyhow::Result;
use core_config::Config;
use core_render::{OutputMode, Region, Renderer};
use core_span::{Span, SpanFormatter, StyleSpan, span_template};
use core_view::{
    ContentView, GridView, QueueContext, ScreenView, StackLayoutView, TableView, TableViewColumn, TrackDefinition,
    View,
};
use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

fn text(t: &str) -> Arc<dyn View> {
    Arc::new(ContentView::from_text(t))
}

fn heading(t: &str) -> Arc<dyn View> {
    Arc::new(ContentView::new(Span::container([
        Span::style(StyleSpan::bold_on()),
        Span::content(t),
        Span::style(StyleSpan::bold_off()),
    ])))
}

pub fn grid(config: &Config) -> Result<Arc<dyn View>> {
    let grid = GridView::new().with_gutter(config.grid_gutter());
    grid.set_columns([TrackDefinition::fixed(12), TrackDefinition::star(1), TrackDefinition::star(2)])?;
    grid.set_rows([TrackDefinition::size_to_content(), TrackDefinition::star(1)])?;
    grid.set_child(heading("fixed"), 0, 0)?;
    grid.set_child(heading("star 1"), 1, 0)?;
    grid.set_child(heading("star 2"), 2, 0)?;
    grid.set_child(text("Twelve columns wide whatever the terminal size."), 0, 1)?;
    grid.set_child(
        Arc::new(ContentView::new(Span::container([
            Span::foreground("green"),
            Span::content("One third of the space left after the fixed column."),
            Span::foreground("reset"),
        ]))),
        1,
        1,
    )?;
    grid.set_child(
        text("Two thirds of the remaining space. Long text wraps at word boundaries and is cut off at the bottom of its cell."),
        2,
        1,
    )?;
    Ok(Arc::new(grid))
}

#[derive(Debug, Clone)]
struct Process {
    pid: u32,
    name: &'static str,
    cpu: f64,
}

pub fn table(config: &Config) -> Result<Arc<dyn View>> {
    let table: TableView<Process> = TableView::with_gutter(config.table_gutter());
    table.add_column(TableViewColumn::new(heading("PID"), |p: &Process| {
        text(&p.pid.to_string())
    }))?;
    table.add_column(
        TableViewColumn::new(heading("NAME"), |p: &Process| text(p.name))
            .with_definition(TrackDefinition::star(1)),
    )?;
    let formatter = SpanFormatter::new();
    table.add_column(TableViewColumn::new(heading("CPU"), move |p: &Process| {
        let span = formatter
            .parse_template(&span_template!("{:>5.1}%", p.cpu))
            .unwrap_or_else(|_| Span::content(p.cpu.to_string()));
        Arc::new(ContentView::new(span)) as Arc<dyn View>
    }))?;
    table.set_items([
        Process { pid: 1, name: "init", cpu: 0.1 },
        Process { pid: 412, name: "sshd", cpu: 0.0 },
        Process { pid: 2290, name: "termview", cpu: 3.7 },
        Process { pid: 3014, name: "cargo", cpu: 97.25 },
    ])?;
    Ok(Arc::new(table))
}

pub fn stack() -> Arc<dyn View> {
    let row = StackLayoutView::horizontal();
    row.add(heading("left "));
    row.add(text("| middle |"));
    row.add(text(" right"));

    let column = StackLayoutView::vertical();
    column.add(heading("Stacked views"));
    column.add(Arc::new(row));
    column.add(text("Each child gets its measured height; width is shared."));
    Arc::new(column)
}

/// Render `view` once at the top of the terminal (or as plain lines when
/// writing to a file).
pub fn show(renderer: &mut Renderer, view: &dyn View, overwrite: bool) -> Result<()> {
    let area = renderer.terminal_region();
    let size = view.measure(renderer, area.size());
    debug!(target: "runtime", width = size.width, height = size.height, "demo_measured");
    let region = if renderer.mode() == OutputMode::File {
        Region::from_size(size)
    } else {
        renderer.clear_screen()?;
        Region::new(0, 0, area.width, size.height)
    };
    view.render(renderer, region.with_overwrite(overwrite))?;
    if renderer.mode() != OutputMode::File {
        renderer.terminal_mut().set_cursor_position(0, size.height)?;
        renderer.terminal_mut().write("\n")?;
    }
    renderer.flush()
}

/// Drive a `ScreenView` from this thread while a producer streams spans into
/// a content cell.
pub fn live(renderer: Renderer, config: &Config, ticks: u32, interval: Duration) -> Result<()> {
    let ctx = Arc::new(QueueContext::new());
    let screen = ScreenView::with_cursor_hidden(renderer, ctx.clone(), config.hide_cursor());

    let (tx, rx) = unbounded();
    let counter = ContentView::create(rx);
    let layout = StackLayoutView::vertical();
    layout.add(heading("termview live demo"));
    layout.add(counter);
    layout.add(text("Updates arrive on a background thread and are coalesced into repaints."));
    screen.set_child(Some(Arc::new(layout)));
    screen.render();

    let producer = thread::Builder::new().name("live-producer".into()).spawn(move || {
        let started = Instant::now();
        for tick in 1..=ticks {
            let span = Span::container([
                Span::foreground(if tick % 2 == 0 { "cyan" } else { "yellow" }),
                Span::content(format!("tick {tick}/{ticks}")),
                Span::foreground("reset"),
                Span::content(format!("  elapsed {:.1}s", started.elapsed().as_secs_f64())),
            ]);
            if tx.send(span).is_err() {
                break;
            }
            thread::sleep(interval);
        }
    })?;

    while !producer.is_finished() {
        ctx.run_next(interval);
    }
    // Let the feed thread deliver the final span, then paint it.
    thread::sleep(Duration::from_millis(50));
    ctx.run_pending();
    if producer.join().is_err() {
        anyhow::bail!("live producer panicked");
    }
    info!(target: "runtime", renders = screen.render_count(), ticks, "live_demo_done");
    screen.dispose();
    Ok(())
}
