use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CityInfo API",
        version = "1.0.0",
        description = "Cities and their points of interest, with token authentication and file transfer."
    ),
    paths(
        crate::routes::authenticate,
        crate::routes::list_cities,
        crate::routes::get_city,
        crate::routes::download_file,
        crate::routes::upload_file,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::AuthenticationRequest,
        crate::dto::CityWithoutPointsOfInterestDto,
        crate::dto::CityDto,
        crate::dto::PointOfInterestDto,
        crate::dto::UploadForm,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "authentication", description = "Token issuing"),
        (name = "cities", description = "Cities and points of interest"),
        (name = "files", description = "File download and upload"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token obtained from POST /api/authentication/authenticate.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
