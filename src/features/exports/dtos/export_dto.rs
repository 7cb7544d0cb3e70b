use serde::Deserialize;
use utoipa::IntoParams;

/// Filters for the family export; same meaning as the family listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Case-insensitive substring matched against No. KK or head of household name
    pub search: Option<String>,

    /// Economic status; `all` or empty exports every status
    pub status: Option<String>,
}
