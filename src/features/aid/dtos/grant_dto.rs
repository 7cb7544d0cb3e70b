use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::aid::models::{
    Distribution, DistributionStatus, Grant, GrantStatus, GrantWithFamily,
};
use crate::shared::types::{PageLinks, PaginationInfo};
use crate::shared::validation::non_blank;

pub const MIN_BUDGET_YEAR: i32 = 2000;
pub const MAX_BUDGET_YEAR: i32 = 2100;

/// Query parameters for the grant listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct GrantListQuery {
    /// Budget year
    #[param(example = 2025)]
    pub tahun: Option<i32>,

    /// Grant status; `all` or empty disables the filter
    #[param(example = "aktif")]
    pub status: Option<String>,

    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    pub tahun: Option<i32>,
    pub status: Option<GrantStatus>,
}

impl GrantFilter {
    pub fn from_query(query: &GrantListQuery) -> Result<Self, AppError> {
        let status = match non_blank(query.status.as_deref()) {
            None => None,
            Some(value) if value.eq_ignore_ascii_case("all") => None,
            Some(value) => Some(value.parse::<GrantStatus>().map_err(AppError::Validation)?),
        };

        Ok(Self {
            tahun: query.tahun,
            status,
        })
    }
}

/// Grant row in the listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantListItemDto {
    #[serde(flatten)]
    pub grant: Grant,
    pub nama_kepala_keluarga: String,
    pub no_kk: String,
}

impl From<GrantWithFamily> for GrantListItemDto {
    fn from(row: GrantWithFamily) -> Self {
        Self {
            grant: row.grant,
            nama_kepala_keluarga: row.nama_kepala_keluarga,
            no_kk: row.no_kk,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantPageDto {
    pub items: Vec<GrantListItemDto>,
    pub pagination: PaginationInfo,
    pub links: PageLinks,
}

/// Grant with its twelve monthly distributions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantDetailDto {
    #[serde(flatten)]
    pub grant: Grant,
    pub penyaluran: Vec<Distribution>,
}

/// Request body for assigning a grant
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGrantDto {
    pub keluarga_id: Uuid,

    #[validate(range(
        min = 2000,
        max = 2100,
        message = "Budget year must be between 2000 and 2100"
    ))]
    pub tahun_anggaran: i32,

    #[validate(custom(function = "validate_positive_amount"))]
    pub nominal_per_bulan: Decimal,

    /// Defaults to today
    pub tanggal_penetapan: Option<NaiveDate>,

    #[validate(length(max = 1000, message = "Note must not exceed 1000 characters"))]
    pub keterangan: Option<String>,
}

fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message(Cow::Borrowed("Monthly amount must be greater than zero")));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGrantStatusDto {
    pub status: GrantStatus,
}

/// Request body for recording one month's distribution
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordDistributionDto {
    pub status: DistributionStatus,

    /// Delivery time; defaults to now when marking `tersalurkan`
    pub tanggal_penyaluran: Option<DateTime<Utc>>,

    #[validate(length(max = 1000, message = "Note must not exceed 1000 characters"))]
    pub keterangan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> CreateGrantDto {
        CreateGrantDto {
            keluarga_id: Uuid::new_v4(),
            tahun_anggaran: 2025,
            nominal_per_bulan: Decimal::from(300_000),
            tanggal_penetapan: None,
            keterangan: None,
        }
    }

    #[test]
    fn test_valid_grant_passes() {
        assert!(grant().validate().is_ok());
    }

    #[test]
    fn test_grant_rejects_zero_amount() {
        let mut dto = grant();
        dto.nominal_per_bulan = Decimal::ZERO;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_grant_rejects_year_out_of_range() {
        let mut dto = grant();
        dto.tahun_anggaran = 1999;
        assert!(dto.validate().is_err());
        dto.tahun_anggaran = 2101;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_parses_status() {
        let query = GrantListQuery {
            tahun: Some(2025),
            status: Some("aktif".to_string()),
            page: None,
        };
        let filter = GrantFilter::from_query(&query).unwrap();
        assert_eq!(filter.status, Some(GrantStatus::Aktif));
        assert_eq!(filter.tahun, Some(2025));

        let query = GrantListQuery {
            status: Some("unknown".to_string()),
            ..Default::default()
        };
        assert!(GrantFilter::from_query(&query).is_err());
    }
}
