use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Delivery state of one monthly payment, matching `status_penyaluran`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_penyaluran", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DistributionStatus {
    Belum,
    Tersalurkan,
    Gagal,
}

impl DistributionStatus {
    /// Timestamp to store for this status: delivery defaults to `now`,
    /// pending clears it, failure keeps whatever was supplied.
    pub fn resolve_timestamp(
        &self,
        requested: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self {
            DistributionStatus::Belum => None,
            DistributionStatus::Tersalurkan => Some(requested.unwrap_or(now)),
            DistributionStatus::Gagal => requested,
        }
    }
}

/// Monthly distribution of a grant (penyaluran_bantuan)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Distribution {
    pub id: Uuid,
    pub bantuan_id: Uuid,
    /// Month 1..=12
    pub bulan: i16,
    pub status: DistributionStatus,
    pub tanggal_penyaluran: Option<DateTime<Utc>>,
    pub keterangan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DISTRIBUTION_COLUMNS: &str =
    "id, bantuan_id, bulan, status, tanggal_penyaluran, keterangan, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_delivered_without_timestamp_uses_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(
            DistributionStatus::Tersalurkan.resolve_timestamp(None, now),
            Some(now)
        );
    }

    #[test]
    fn test_delivered_keeps_supplied_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let given = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(
            DistributionStatus::Tersalurkan.resolve_timestamp(Some(given), now),
            Some(given)
        );
    }

    #[test]
    fn test_pending_clears_timestamp() {
        let now = Utc::now();
        assert_eq!(DistributionStatus::Belum.resolve_timestamp(Some(now), now), None);
    }
}
