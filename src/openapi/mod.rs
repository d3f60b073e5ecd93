use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Solentine API",
        version = "1.0.0",
        description = r#"
# Solentine Sales Tracking API

REST API backing the Solentine sales tracking application: sales records tied
to zones, brands, clients and commercial agents.

## Authentication

Obtain a token via `POST /auth/login` and pass it on every `/api/v1` request:

```
Authorization: Bearer <your-jwt-token>
```

## Pagination

`GET /api/v1/sales` supports `page` (default 1) and `limit` (default 100) and
answers with `{ "sales": [...], "totalSales": n, "totalPages": n }`.

## Rate Limiting

Requests are rate-limited per client; check the `X-RateLimit-*` response
headers. Authentication endpoints use a stricter window.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5005", description = "Local development")
    ),
    tags(
        (name = "Sales", description = "Sale record endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    ),
    paths(
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::create_sale,
    ),
    components(
        schemas(
            crate::handlers::sales::SaleResponse,
            crate::handlers::sales::SalesPageResponse,
            crate::handlers::sales::SaleRequest,
            crate::auth::SignupRequest,
            crate::auth::LoginCredentials,
            crate::auth::LoginResponse,
            crate::errors::ErrorResponse,
            crate::errors::FieldError,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
