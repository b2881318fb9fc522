//! Children stacked along one axis, each at its measured extent.
//!
//! Along the stacking axis every child gets what it measures against the
//! space still left; across it, measure reports the widest (or tallest)
//! child while render hands each child the full cross extent of the region.
//! Children past the end of the available space are skipped.

use crate::layout::LayoutView;
use crate::notify::UpdateNotifier;
use crate::view::View;
use anyhow::Result;
use core_render::{Region, Renderer, Size};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Default)]
pub struct StackLayoutView {
    orientation: Orientation,
    children: LayoutView,
}

impl StackLayoutView {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            children: LayoutView::new(),
        }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn add(&self, view: Arc<dyn View>) {
        self.children.add(view);
    }

    pub fn remove(&self, view: &Arc<dyn View>) -> bool {
        self.children.remove(view)
    }

    pub fn clear(&self) {
        self.children.clear();
    }

    pub fn children(&self) -> Vec<Arc<dyn View>> {
        self.children.children()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Project a size onto (main, cross) for this orientation.
    fn split(&self, size: Size) -> (u16, u16) {
        match self.orientation {
            Orientation::Vertical => (size.height, size.width),
            Orientation::Horizontal => (size.width, size.height),
        }
    }

    fn join(&self, main: u16, cross: u16) -> Size {
        match self.orientation {
            Orientation::Vertical => Size::new(cross, main),
            Orientation::Horizontal => Size::new(main, cross),
        }
    }
}

impl View for StackLayoutView {
    fn measure(&self, renderer: &Renderer, max: Size) -> Size {
        let (max_main, max_cross) = self.split(max);
        let mut remaining = max_main;
        let mut cross = 0u16;
        for child in self.children.children() {
            if remaining == 0 {
                break;
            }
            let (main, child_cross) = self.split(child.measure(renderer, self.join(remaining, max_cross)));
            remaining -= main.min(remaining);
            cross = cross.max(child_cross);
        }
        self.join(max_main - remaining, cross.min(max_cross))
    }

    fn render(&self, renderer: &mut Renderer, region: Region) -> Result<()> {
        let (region_main, region_cross) = self.split(region.size());
        let mut offset = 0u16;
        for child in self.children.children() {
            let remaining = region_main - offset;
            if remaining == 0 {
                break;
            }
            let (main, _) = self.split(child.measure(renderer, self.join(remaining, region_cross)));
            let main = main.min(remaining);
            let target = match self.orientation {
                Orientation::Vertical => Region::new(region.left, region.top.saturating_add(offset), region.width, main),
                Orientation::Horizontal => Region::new(region.left.saturating_add(offset), region.top, main, region.height),
            }
            .with_overwrite(region.is_overwritten_on_render);
            trace!(target: "view.layout", offset, extent = main, "stack_child");
            child.render(renderer, target)?;
            offset += main;
        }
        Ok(())
    }

    fn updated(&self) -> &UpdateNotifier {
        self.children.updated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentView;
    use core_render::RendererOptions;
    use core_terminal::{OutputMode, TestTerminal};

    fn renderer() -> Renderer {
        Renderer::new(
            TestTerminal::new(20, 5),
            RendererOptions {
                mode: OutputMode::Ansi,
                ..Default::default()
            },
        )
    }

    fn stack_of(orientation: Orientation, texts: &[&str]) -> StackLayoutView {
        let stack = StackLayoutView::new(orientation);
        for t in texts {
            stack.add(Arc::new(ContentView::from_text(t)));
        }
        stack
    }

    #[test]
    fn vertical_sums_heights_and_takes_widest() {
        let stack = stack_of(Orientation::Vertical, &["Hello", "World!!!!"]);
        assert_eq!(stack.measure(&renderer(), Size::new(20, 5)), Size::new(9, 2));
    }

    #[test]
    fn horizontal_sums_widths_and_takes_tallest() {
        let stack = stack_of(Orientation::Horizontal, &["ab", "cde"]);
        assert_eq!(stack.measure(&renderer(), Size::new(20, 5)), Size::new(5, 1));
    }

    #[test]
    fn children_beyond_available_space_are_skipped() {
        let stack = stack_of(Orientation::Vertical, &["a", "b", "c"]);
        assert_eq!(stack.measure(&renderer(), Size::new(20, 2)), Size::new(1, 2));
    }

    #[test]
    fn empty_stack_measures_zero() {
        let stack = StackLayoutView::vertical();
        assert!(stack.is_empty());
        assert_eq!(stack.measure(&renderer(), Size::new(20, 5)), Size::ZERO);
    }
}
