use serde::Deserialize;
use utoipa::IntoParams;

use super::shared::{non_empty, parse_archive};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArchiveQuery {
    /// Archive to fetch as `YYYY/MM`. Defaults to the most recent one.
    #[param(example = "2024/01")]
    pub archive: Option<String>,
}

impl ArchiveQuery {
    pub fn selected(&self) -> Result<Option<(i32, u32)>, AppError> {
        non_empty(self.archive.clone())
            .map(|v| parse_archive(&v))
            .transpose()
    }
}
