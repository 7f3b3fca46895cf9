//! Report generation port trait.

use crate::domain::config::AnalysisConfig;
use crate::domain::error::PivotError;
use crate::domain::ranking::Ranking;
use std::io::Write;

/// Port for rendering a finished ranking.
pub trait ReportPort {
    fn write(
        &self,
        ranking: &Ranking,
        config: &AnalysisConfig,
        out: &mut dyn Write,
    ) -> Result<(), PivotError>;
}
