//! Domain lifecycle endpoints.

use actix_web::{HttpResponse, delete, get, post, web};
use mail_orchestrator_app::AppState;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDomainResponse {
    pub domain: String,
    /// Cleanup jobs queued for the domain
    pub job_ids: Vec<String>,
}

#[get("/domains")]
pub async fn list_domains(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let domains = state.lifecycle_service.get_domains(&user.id).await?;
    Ok(HttpResponse::Ok().json(domains))
}

#[post("/domains")]
pub async fn add_domain(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<AddDomainRequest>,
) -> ApiResult<HttpResponse> {
    let domain = state
        .lifecycle_service
        .add_domain(&user.id, &body.domain)
        .await?;
    tracing::info!(user = %user.id, domain = %domain.domain, "domain added");
    Ok(HttpResponse::Created().json(domain))
}

#[delete("/domains")]
pub async fn delete_all_domains(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let result = state.lifecycle_service.delete_all_domains(&user.id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[delete("/domains/{domain}")]
pub async fn delete_domain(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let domain = path.into_inner();
    let job_ids = state
        .lifecycle_service
        .delete_domain(&user.id, &domain)
        .await?;
    Ok(HttpResponse::Ok().json(DeleteDomainResponse { domain, job_ids }))
}

#[post("/domains/{domain}/check-dns")]
pub async fn check_dns(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let result = state
        .lifecycle_service
        .check_dns(&user.id, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[post("/domains/{domain}/aliases/{alias}")]
pub async fn add_alias(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (domain, alias) = path.into_inner();
    let alias = state
        .lifecycle_service
        .add_alias(&user.id, &domain, &alias)
        .await?;
    Ok(HttpResponse::Created().json(alias))
}

#[delete("/domains/{domain}/aliases/{alias}")]
pub async fn delete_alias(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (domain, alias) = path.into_inner();
    state
        .lifecycle_service
        .delete_alias(&user.id, &domain, &alias)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
