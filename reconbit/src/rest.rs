use crate::error::AppError;
use crate::info;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

// Wraps `axum::Json` so body rejections come back in the same shape as every other error.
#[derive(FromRequest)]
#[from_request(via(crate::axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::JsonRejection(rej) => rej.body_text(),
            other                        => other.to_string(),
        };
        (status, AppJson(ErrorResponse { message, code: status.as_u16() })).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(info(license(name = "MIT")), components(schemas(ErrorResponse)))]
pub struct ApiDoc;

/// Merges the routes into one router serving the OpenAPI document under `/apidoc/openapi.json`
/// and Swagger UI under `/swagger-ui`.
pub fn build_router<S>(state: S, routes: OpenApiRouter<S>, cors: Option<CorsLayer>) -> Router<()>
where
    S: Clone + Send + Sync + 'static,
{
    let router: OpenApiRouter<S> = OpenApiRouter::with_openapi(ApiDoc::openapi()).merge(routes);
    let (r, openapi) = router.split_for_parts();

    let merged = r
        .merge(SwaggerUi::new("/swagger-ui").url("/apidoc/openapi.json", openapi))
        .with_state(state);
    if let Some(cors_layer) = cors {
        merged.layer(cors_layer)
    } else {
        merged
    }
}

/// Serves until `shutdown` flips, finishing in-flight requests first.
pub async fn serve<S>(
    state: S,
    socket_addr: SocketAddr,
    routes: OpenApiRouter<S>,
    cors: Option<CorsLayer>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), AppError>
where
    S: Clone + Send + Sync + 'static,
{
    let router: Router<()> = build_router(state, routes, cors);
    let tcp = TcpListener::bind(socket_addr).await?;
    info!("Listening on {}", socket_addr);

    let mut shutdown = shutdown;
    axum::serve(tcp, router)
        .with_graceful_shutdown(async move {
            if shutdown.changed().await.is_ok() {
                info!("Shutting down server...");
            }
        })
        .await?;
    Ok(())
}
