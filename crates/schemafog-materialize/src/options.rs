/// Options that control how a store is rebuilt.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Compare each copied table's row count against its source.
    pub verify_row_counts: bool,
    /// Enable foreign key enforcement on the store once loading finishes.
    pub enforce_foreign_keys: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            verify_row_counts: true,
            enforce_foreign_keys: true,
        }
    }
}
