use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::activity_logs::{
    handlers as activity_logs_handlers, models as activity_logs_models,
};
use crate::features::aid::{dtos as aid_dtos, handlers as aid_handlers, models as aid_models};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::exports::handlers as exports_handlers;
use crate::features::families::{
    dtos as families_dtos, handlers as families_handlers, models as families_models,
};
use crate::features::map::{dtos as map_dtos, geometry, handlers as map_handlers};
use crate::shared::types::{ApiResponse, Meta, PageLinks, PaginationInfo};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Families
        families_handlers::list_families,
        families_handlers::get_family,
        families_handlers::create_family,
        families_handlers::update_family,
        families_handlers::delete_family,
        families_handlers::verify_family,
        families_handlers::set_family_visibility,
        // Members
        families_handlers::list_members,
        families_handlers::create_member,
        families_handlers::update_member,
        families_handlers::delete_member,
        // Map (public reads, admin writes)
        map_handlers::list_public_points,
        map_handlers::get_public_stats,
        map_handlers::get_family_geometry,
        map_handlers::save_geometry,
        map_handlers::delete_geometry,
        // Aid
        aid_handlers::list_grants,
        aid_handlers::get_grant,
        aid_handlers::create_grant,
        aid_handlers::update_grant_status,
        aid_handlers::record_distribution,
        aid_handlers::list_programs,
        aid_handlers::get_program,
        aid_handlers::upsert_program,
        aid_handlers::update_program_status,
        // Exports
        exports_handlers::export_families,
        exports_handlers::export_records,
        // Dashboard
        dashboard_handlers::get_summary,
        // Activity logs
        activity_logs_handlers::list_activity_logs,
    ),
    components(
        schemas(
            // Shared
            Meta,
            PaginationInfo,
            PageLinks,
            // Families
            families_models::EconomicStatus,
            families_models::VerificationStatus,
            families_models::Gender,
            families_models::Family,
            families_models::Member,
            families_dtos::FamilyListItemDto,
            families_dtos::FamilyFiltersDto,
            families_dtos::FamilyPageDto,
            families_dtos::FamilyDetailDto,
            families_dtos::FamilyPayloadDto,
            families_dtos::VerifyFamilyDto,
            families_dtos::FamilyVisibilityDto,
            families_dtos::MemberPayloadDto,
            ApiResponse<families_dtos::FamilyPageDto>,
            ApiResponse<families_dtos::FamilyDetailDto>,
            ApiResponse<families_models::Family>,
            ApiResponse<families_models::Member>,
            ApiResponse<Vec<families_models::Member>>,
            // Map
            geometry::GeometryKind,
            geometry::LatLng,
            map_dtos::LocationDto,
            map_dtos::PublicPointDto,
            map_dtos::MapDataResponse,
            map_dtos::CityCountDto,
            map_dtos::PublicStatsDto,
            map_dtos::AreaDto,
            map_dtos::LineDto,
            map_dtos::FamilyGeometryDto,
            map_dtos::SaveGeometryDto,
            map_dtos::GeometryRecordDto,
            ApiResponse<map_dtos::PublicStatsDto>,
            ApiResponse<map_dtos::FamilyGeometryDto>,
            ApiResponse<map_dtos::GeometryRecordDto>,
            // Aid
            aid_models::GrantStatus,
            aid_models::DistributionStatus,
            aid_models::ProgramStatus,
            aid_models::Grant,
            aid_models::Distribution,
            aid_models::Program,
            aid_dtos::GrantListItemDto,
            aid_dtos::GrantPageDto,
            aid_dtos::GrantDetailDto,
            aid_dtos::CreateGrantDto,
            aid_dtos::UpdateGrantStatusDto,
            aid_dtos::RecordDistributionDto,
            aid_dtos::ProgramPayloadDto,
            aid_dtos::UpdateProgramStatusDto,
            ApiResponse<aid_dtos::GrantPageDto>,
            ApiResponse<aid_dtos::GrantDetailDto>,
            ApiResponse<aid_models::Grant>,
            ApiResponse<aid_models::Distribution>,
            ApiResponse<aid_models::Program>,
            ApiResponse<Vec<aid_models::Program>>,
            // Dashboard
            dashboard_dtos::EconomicStatusCountDto,
            dashboard_dtos::VerificationCountDto,
            dashboard_dtos::GrantStatusCountDto,
            dashboard_dtos::GrantYearSummaryDto,
            dashboard_dtos::DashboardSummaryDto,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
            // Activity logs
            activity_logs_models::ActivityLog,
            ApiResponse<Vec<activity_logs_models::ActivityLog>>,
        )
    ),
    tags(
        (name = "families", description = "Family (Kartu Keluarga) records"),
        (name = "members", description = "Household members of a family"),
        (name = "map", description = "Public map data and admin geometry editing"),
        (name = "aid", description = "Aid grants, monthly distributions and yearly programs"),
        (name = "exports", description = "CSV exports"),
        (name = "dashboard", description = "Admin dashboard counters"),
        (name = "activity-logs", description = "Audit trail of admin writes"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Bantuan Keluarga API",
        version = "0.1.0",
        description = "Admin and map API for family aid records",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP Basic security scheme used by admin endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_admin_and_public_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/families"));
        assert!(paths.contains_key("/api/map-data"));
        assert!(paths.contains_key("/api/aid-grants"));
        assert!(paths.contains_key("/api/exports/{category}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("basic_auth"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".to_string(),
            version: "9.9.9".to_string(),
            description: "staging build".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Staging");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
