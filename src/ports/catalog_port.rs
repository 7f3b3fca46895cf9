//! Raw symbol catalog port.

use crate::domain::error::PivotError;
use crate::domain::universe::CatalogEntry;

pub trait CatalogPort {
    /// Load catalog rows in source order. No filtering beyond dropping blank
    /// and comment rows happens here.
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, PivotError>;
}
