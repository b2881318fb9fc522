//! Output-surface geometry in terminal cells.
//!
//! Coordinates are `u16` (the crossterm cell type), so negative dimensions
//! cannot be constructed. A zero-area region is valid and means "nothing to
//! do": measuring against it yields `Size::ZERO` and rendering writes nothing.
//!
//! Invariants:
//! * `Size::UNBOUNDED` is the "no limit" sentinel on either axis.
//! * `Region::new` opts into full-region overwrite; callers that must not
//!   pad (e.g. inline output next to existing text) use `with_overwrite(false)`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };
    pub const UNBOUNDED: Size = Size {
        width: u16::MAX,
        height: u16::MAX,
    };

    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Component-wise minimum.
    pub fn min(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub is_overwritten_on_render: bool,
}

impl Region {
    pub const fn new(left: u16, top: u16, width: u16, height: u16) -> Self {
        Self {
            left,
            top,
            width,
            height,
            is_overwritten_on_render: true,
        }
    }

    /// Region anchored at the origin with the given size.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.is_overwritten_on_render = overwrite;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u16 {
        self.left.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u16 {
        self.top.saturating_add(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_region_overwrites_by_default() {
        let r = Region::new(2, 3, 10, 4);
        assert!(r.is_overwritten_on_render);
        assert!(!r.with_overwrite(false).is_overwritten_on_render);
        assert_eq!(r.size(), Size::new(10, 4));
        assert_eq!((r.right(), r.bottom()), (12, 7));
    }

    #[test]
    fn zero_area_is_empty_not_invalid() {
        assert!(Region::new(0, 0, 0, 5).is_empty());
        assert!(Size::new(3, 0).is_empty());
        assert_eq!(Size::UNBOUNDED.min(Size::new(4, 1)), Size::new(4, 1));
    }
}
