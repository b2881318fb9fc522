//! The view contract.

use crate::notify::UpdateNotifier;
use anyhow::Result;
use core_render::{Region, Renderer, Size};

/// A retained-mode node that can be measured and rendered.
///
/// `measure` must not change observable state: measuring twice with the
/// same inputs returns the same size. `updated` raises whenever a previous
/// measure or render may be stale.
pub trait View: Send + Sync {
    fn measure(&self, renderer: &Renderer, max: Size) -> Size;

    fn render(&self, renderer: &mut Renderer, region: Region) -> Result<()>;

    fn updated(&self) -> &UpdateNotifier;
}
