use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::families::models::{
    EconomicStatus, Family, FamilyWithCount, Member, VerificationStatus,
};
use crate::shared::types::{PageLinks, PaginationInfo};
use crate::shared::validation::{
    non_blank, NATIONAL_ID_REGEX, POSTAL_CODE_REGEX, RT_RW_REGEX,
};

/// Status filter value meaning "no filter"
pub const ALL_STATUSES: &str = "all";

/// Query parameters for the family listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FamilyListQuery {
    /// Case-insensitive substring matched against No. KK or head of household name
    #[param(example = "Budi")]
    pub search: Option<String>,

    /// Economic status filter; `all` or empty disables it
    #[param(example = "miskin")]
    pub status: Option<String>,

    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
}

/// Parsed listing filters; search AND status, with search OR-ed over both fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyFilter {
    pub search: Option<String>,
    pub status: Option<EconomicStatus>,
}

impl FamilyFilter {
    pub fn from_query(search: Option<&str>, status: Option<&str>) -> Result<Self, AppError> {
        let search = non_blank(search).map(str::to_string);

        let status = match non_blank(status) {
            None => None,
            Some(value) if value.eq_ignore_ascii_case(ALL_STATUSES) => None,
            Some(value) => Some(value.parse::<EconomicStatus>().map_err(AppError::Validation)?),
        };

        Ok(Self { search, status })
    }

    /// Status as echoed back to the client (`all` when unfiltered)
    pub fn status_label(&self) -> String {
        self.status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| ALL_STATUSES.to_string())
    }
}

/// Family row in the listing with its live member count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyListItemDto {
    #[serde(flatten)]
    pub family: Family,
    pub anggota_count: i64,
}

impl From<FamilyWithCount> for FamilyListItemDto {
    fn from(row: FamilyWithCount) -> Self {
        Self {
            family: row.family,
            anggota_count: row.anggota_count,
        }
    }
}

/// Active filters echoed back so the client can rebuild shareable URLs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyFiltersDto {
    pub search: Option<String>,
    pub status: String,
}

/// One page of the family listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyPageDto {
    pub items: Vec<FamilyListItemDto>,
    pub pagination: PaginationInfo,
    pub filters: FamilyFiltersDto,
    pub links: PageLinks,
}

/// Family with its ordered member list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyDetailDto {
    #[serde(flatten)]
    pub family: Family,
    pub anggota: Vec<Member>,
}

fn default_true() -> bool {
    true
}

/// Request body for creating or replacing a family record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_coordinate_pair"))]
pub struct FamilyPayloadDto {
    #[validate(regex(path = *NATIONAL_ID_REGEX, message = "No. KK must be exactly 16 digits"))]
    pub no_kk: String,

    #[validate(length(min = 1, max = 255, message = "Head of household name must be 1-255 characters"))]
    pub nama_kepala_keluarga: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Address must not exceed 1000 characters"))]
    pub alamat: String,

    #[validate(regex(path = *RT_RW_REGEX, message = "RT must be 1-3 digits"))]
    pub rt: Option<String>,

    #[validate(regex(path = *RT_RW_REGEX, message = "RW must be 1-3 digits"))]
    pub rw: Option<String>,

    #[validate(length(max = 100))]
    pub kelurahan: Option<String>,

    #[validate(length(max = 100))]
    pub kecamatan: Option<String>,

    #[validate(length(max = 100))]
    pub kota: Option<String>,

    #[validate(length(max = 100))]
    pub provinsi: Option<String>,

    #[validate(regex(path = *POSTAL_CODE_REGEX, message = "Postal code must be 5 digits"))]
    pub kode_pos: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    pub status_ekonomi: EconomicStatus,

    #[validate(custom(function = "validate_non_negative"))]
    pub penghasilan_bulanan: Decimal,

    #[validate(range(min = 0, max = 100, message = "Member count must be between 0 and 100"))]
    pub jumlah_anggota: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_public: bool,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative")
            .with_message(Cow::Borrowed("Monthly income must not be negative")));
    }
    Ok(())
}

fn validate_coordinate_pair(dto: &FamilyPayloadDto) -> Result<(), ValidationError> {
    if dto.latitude.is_some() != dto.longitude.is_some() {
        return Err(ValidationError::new("coordinate_pair")
            .with_message(Cow::Borrowed("Latitude and longitude must be given together")));
    }
    Ok(())
}

/// Request body for recording a verification decision
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VerifyFamilyDto {
    /// `terverifikasi` or `ditolak`
    pub status_verifikasi: VerificationStatus,

    #[validate(length(max = 1000, message = "Note must not exceed 1000 characters"))]
    pub catatan: Option<String>,
}

/// Request body for toggling public map visibility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyVisibilityDto {
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload() -> FamilyPayloadDto {
        FamilyPayloadDto {
            no_kk: "3201010101010001".to_string(),
            nama_kepala_keluarga: "Budi".to_string(),
            alamat: "Jl. Merdeka No. 1".to_string(),
            rt: Some("001".to_string()),
            rw: Some("002".to_string()),
            kelurahan: Some("Cibinong".to_string()),
            kecamatan: Some("Cibinong".to_string()),
            kota: Some("Bogor".to_string()),
            provinsi: Some("Jawa Barat".to_string()),
            kode_pos: Some("16911".to_string()),
            latitude: Some(-6.48),
            longitude: Some(106.85),
            status_ekonomi: EconomicStatus::Miskin,
            penghasilan_bulanan: Decimal::from_str("1500000.00").unwrap(),
            jumlah_anggota: 4,
            is_active: true,
            is_public: false,
        }
    }

    #[test]
    fn test_filter_treats_all_and_blank_as_unfiltered() {
        for status in [None, Some(""), Some("all"), Some("ALL"), Some("  ")] {
            let filter = FamilyFilter::from_query(None, status).unwrap();
            assert_eq!(filter.status, None);
            assert_eq!(filter.status_label(), "all");
        }
    }

    #[test]
    fn test_filter_parses_status_and_trims_search() {
        let filter = FamilyFilter::from_query(Some("  Budi "), Some("sangat_miskin")).unwrap();
        assert_eq!(filter.search.as_deref(), Some("Budi"));
        assert_eq!(filter.status, Some(EconomicStatus::SangatMiskin));
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        let err = FamilyFilter::from_query(None, Some("kaya")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_payload_rejects_short_no_kk() {
        let mut dto = payload();
        dto.no_kk = "32010101".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_payload_rejects_negative_income() {
        let mut dto = payload();
        dto.penghasilan_bulanan = Decimal::from(-1);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_payload_rejects_half_coordinate() {
        let mut dto = payload();
        dto.longitude = None;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_payload_rejects_latitude_out_of_range() {
        let mut dto = payload();
        dto.latitude = Some(91.0);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_list_item_flattens_family_fields() {
        let dto = payload();
        let family = Family {
            id: uuid::Uuid::nil(),
            no_kk: dto.no_kk,
            nama_kepala_keluarga: dto.nama_kepala_keluarga,
            alamat: dto.alamat,
            rt: dto.rt,
            rw: dto.rw,
            kelurahan: dto.kelurahan,
            kecamatan: dto.kecamatan,
            kota: dto.kota,
            provinsi: dto.provinsi,
            kode_pos: dto.kode_pos,
            latitude: dto.latitude,
            longitude: dto.longitude,
            status_ekonomi: dto.status_ekonomi,
            penghasilan_bulanan: dto.penghasilan_bulanan,
            jumlah_anggota: dto.jumlah_anggota,
            status_verifikasi: VerificationStatus::BelumVerifikasi,
            diverifikasi_oleh: None,
            diverifikasi_pada: None,
            catatan_verifikasi: None,
            is_active: true,
            is_public: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let value = serde_json::to_value(FamilyListItemDto {
            family,
            anggota_count: 3,
        })
        .unwrap();

        assert_eq!(value["no_kk"], "3201010101010001");
        assert_eq!(value["status_ekonomi"], "miskin");
        assert_eq!(value["anggota_count"], 3);
    }
}
