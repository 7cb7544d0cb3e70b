use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::core::error::{AppError, Result};
use crate::features::exports::formatter::{self, ExportCategory, ExportTable, Record};
use crate::features::families::dtos::FamilyFilter;
use crate::features::families::models::Family;
use crate::features::families::FamilyService;

/// Service producing CSV exports
pub struct ExportService {
    family_service: Arc<FamilyService>,
}

impl ExportService {
    pub fn new(family_service: Arc<FamilyService>) -> Self {
        Self { family_service }
    }

    /// Export every family matching the listing filters
    pub async fn export_families(
        &self,
        category: &ExportCategory,
        filter: &FamilyFilter,
    ) -> Result<ExportTable> {
        let families = self.family_service.list_all(filter).await?;
        let records = families
            .iter()
            .map(family_record)
            .collect::<Result<Vec<_>>>()?;

        let table = formatter::format_records(&records, category, Utc::now());

        tracing::info!(
            "Family export built: category={}, rows={}",
            category.tag(),
            table.rows.len()
        );

        Ok(table)
    }

    /// Format caller-supplied records
    pub fn export_records(&self, category: &ExportCategory, records: &[Record]) -> ExportTable {
        formatter::format_records(records, category, Utc::now())
    }
}

fn family_record(family: &Family) -> Result<Record> {
    match serde_json::to_value(family) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(
            "Family did not serialize to an object".to_string(),
        )),
        Err(e) => {
            tracing::error!("Failed to serialize family {}: {:?}", family.id, e);
            Err(AppError::Internal("Failed to build export".to_string()))
        }
    }
}
