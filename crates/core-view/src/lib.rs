//! core-view: retained-mode views over the span renderer.
//!
//! A view measures itself against a maximum size, renders into a region
//! and raises `updated` when its output may have changed. Containers
//! forward their children's updates; [`ScreenView`] sits at the root and
//! turns bursts of updates into coalesced repaints.
//!
//! Views are shared as `Arc<dyn View>` and are safe to mutate from any
//! thread. Rendering always happens with exclusive access to the
//! [`Renderer`](core_render::Renderer).

pub mod content;
pub mod error;
pub mod grid;
pub mod layout;
pub mod notify;
pub mod screen;
pub mod stack;
pub mod table;
pub mod view;

pub use content::{ContentValue, ContentView};
pub use error::LayoutError;
pub use grid::{ColumnDefinition, GridView, RowDefinition, SizeMode, TrackDefinition};
pub use layout::LayoutView;
pub use notify::{SubscriptionId, UpdateNotifier};
pub use screen::{InlineContext, QueueContext, RenderContext, ScreenView};
pub use stack::{Orientation, StackLayoutView};
pub use table::{TableView, TableViewColumn};
pub use view::View;
