use serde::Deserialize;
use utoipa::IntoParams;

use super::shared::{non_empty, parse_month, parse_year};
use crate::error::AppError;
use crate::history::{Aggregation, DataFormat, HistoryRequest};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RatingHistoryQuery {
    /// bullet, blitz, rapid or daily.
    pub time_class: Option<String>,
    /// 1-9999.
    pub year: Option<String>,
    /// 1-12, requires `year`.
    pub month: Option<String>,
    /// Defaults to `game`.
    pub aggregation: Option<Aggregation>,
    /// Defaults to `raw`.
    pub data_format: Option<DataFormat>,
}

impl RatingHistoryQuery {
    pub fn into_request(self) -> Result<HistoryRequest, AppError> {
        let year = non_empty(self.year).map(|v| parse_year(&v)).transpose()?;
        let month = non_empty(self.month).map(|v| parse_month(&v)).transpose()?;
        if month.is_some() && year.is_none() {
            return Err(AppError::BadRequest("month requires year to be set".into()));
        }

        Ok(HistoryRequest {
            time_class: non_empty(self.time_class),
            year,
            month,
            aggregation: self.aggregation.unwrap_or_default(),
            data_format: self.data_format.unwrap_or_default(),
        })
    }
}
