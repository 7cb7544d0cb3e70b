use serde::Deserialize;
use utoipa::IntoParams;

use crate::shared::types::PageQuery;

/// Query parameters for browsing the activity log
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ActivityLogQuery {
    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,

    /// Only entries for this table, e.g. `keluarga`
    #[param(example = "keluarga")]
    pub table_name: Option<String>,

    /// Only entries with this action, e.g. `verify`
    #[param(example = "verify")]
    pub action: Option<String>,
}

impl ActivityLogQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
        }
    }
}
