use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("grid columns and rows cannot change once a child has been placed")]
    TracksLocked,
    #[error("cell ({column}, {row}) is outside a {columns}x{rows} grid")]
    CellOutOfRange {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },
    #[error("unknown size mode '{0}' (expected fixed, star or size_to_content)")]
    UnknownSizeMode(String),
}
