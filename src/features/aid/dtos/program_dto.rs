use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::aid::models::ProgramStatus;

/// Request body for creating or replacing a year's program settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_windows"))]
pub struct ProgramPayloadDto {
    pub tanggal_mulai_pendaftaran: NaiveDate,
    pub tanggal_selesai_pendaftaran: NaiveDate,
    pub tanggal_mulai_penyaluran: NaiveDate,
    pub tanggal_selesai_penyaluran: NaiveDate,

    #[validate(range(min = 0, message = "Quota must not be negative"))]
    pub kuota: i32,

    #[validate(length(max = 5000, message = "Criteria must not exceed 5000 characters"))]
    pub kriteria: Option<String>,
}

fn validate_windows(dto: &ProgramPayloadDto) -> Result<(), ValidationError> {
    if dto.tanggal_mulai_pendaftaran > dto.tanggal_selesai_pendaftaran {
        return Err(ValidationError::new("registration_window").with_message(Cow::Borrowed(
            "Registration must not start after it ends",
        )));
    }
    if dto.tanggal_mulai_penyaluran > dto.tanggal_selesai_penyaluran {
        return Err(ValidationError::new("distribution_window").with_message(Cow::Borrowed(
            "Distribution must not start after it ends",
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProgramStatusDto {
    pub status: ProgramStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn payload() -> ProgramPayloadDto {
        ProgramPayloadDto {
            tanggal_mulai_pendaftaran: date(1, 1),
            tanggal_selesai_pendaftaran: date(2, 28),
            tanggal_mulai_penyaluran: date(3, 1),
            tanggal_selesai_penyaluran: date(12, 31),
            kuota: 500,
            kriteria: Some("Keluarga miskin terverifikasi".to_string()),
        }
    }

    #[test]
    fn test_valid_program_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_single_day_window_is_allowed() {
        let mut dto = payload();
        dto.tanggal_selesai_pendaftaran = dto.tanggal_mulai_pendaftaran;
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_inverted_windows_are_rejected() {
        let mut dto = payload();
        dto.tanggal_selesai_pendaftaran = date(1, 1);
        dto.tanggal_mulai_pendaftaran = date(1, 2);
        assert!(dto.validate().is_err());

        let mut dto = payload();
        dto.tanggal_selesai_penyaluran = date(2, 1);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_negative_quota_is_rejected() {
        let mut dto = payload();
        dto.kuota = -1;
        assert!(dto.validate().is_err());
    }
}
