use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::families::models::Gender;
use crate::shared::validation::NATIONAL_ID_REGEX;

/// Request body for creating or replacing a household member
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MemberPayloadDto {
    #[validate(regex(path = *NATIONAL_ID_REGEX, message = "NIK must be exactly 16 digits"))]
    pub nik: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub nama: String,

    pub jenis_kelamin: Gender,

    #[validate(length(max = 100))]
    pub tempat_lahir: Option<String>,

    #[validate(custom(function = "validate_not_in_future"))]
    pub tanggal_lahir: Option<NaiveDate>,

    #[validate(length(max = 50))]
    pub status_perkawinan: Option<String>,

    #[validate(length(max = 50))]
    pub pendidikan: Option<String>,

    #[validate(length(max = 100))]
    pub pekerjaan: Option<String>,

    /// Relationship to the head of household, e.g. "Kepala Keluarga", "Istri", "Anak"
    #[validate(length(min = 1, max = 50, message = "Relationship must be 1-50 characters"))]
    pub hubungan_keluarga: String,
}

fn validate_not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        return Err(ValidationError::new("not_in_future")
            .with_message(Cow::Borrowed("Birth date must not be in the future")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MemberPayloadDto {
        MemberPayloadDto {
            nik: "3201010101900001".to_string(),
            nama: "Siti".to_string(),
            jenis_kelamin: Gender::Perempuan,
            tempat_lahir: Some("Bogor".to_string()),
            tanggal_lahir: NaiveDate::from_ymd_opt(1990, 1, 1),
            status_perkawinan: Some("Kawin".to_string()),
            pendidikan: Some("SMA".to_string()),
            pekerjaan: Some("Pedagang".to_string()),
            hubungan_keluarga: "Istri".to_string(),
        }
    }

    #[test]
    fn test_valid_member_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_member_rejects_future_birth_date() {
        let mut dto = payload();
        dto.tanggal_lahir = Some(Utc::now().date_naive() + chrono::Days::new(1));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_member_rejects_bad_nik() {
        let mut dto = payload();
        dto.nik = "12345".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_gender_uses_single_letter_codes() {
        let json = serde_json::to_string(&Gender::LakiLaki).unwrap();
        assert_eq!(json, "\"L\"");
        let parsed: Gender = serde_json::from_str("\"P\"").unwrap();
        assert_eq!(parsed, Gender::Perempuan);
    }
}
