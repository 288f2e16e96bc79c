//! Dataset persistence port trait.

use crate::domain::dataset::Dataset;
use crate::domain::error::TvlError;

pub trait DatasetPort {
    /// Loads the persisted table. A missing store yields an empty dataset.
    fn load(&self) -> Result<Dataset, TvlError>;

    /// Replaces the persisted table with `dataset`. Either the whole table is
    /// written or the previous contents remain.
    fn persist(&self, dataset: &Dataset) -> Result<(), TvlError>;
}
