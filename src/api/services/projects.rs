//! 项目 CRUD 端点

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{info, trace};

use crate::errors::PortfolioError;
use crate::services::ProjectService;
use crate::storage::ProjectDraft;

use super::error_code::ErrorCode;
use super::helpers::{error_with_code, json_result};

fn project_error(err: &PortfolioError) -> HttpResponse {
    let code = match err {
        PortfolioError::NotFound(_) => ErrorCode::ProjectNotFound,
        _ => ErrorCode::ProjectDatabaseError,
    };
    error_with_code(err, code)
}

/// GET /projects
pub async fn list_projects(service: web::Data<Arc<ProjectService>>) -> impl Responder {
    trace!("API: list projects");
    json_result(StatusCode::OK, service.list().await)
}

/// GET /projects/{id}
pub async fn get_project(
    path: web::Path<i64>,
    service: web::Data<Arc<ProjectService>>,
) -> impl Responder {
    let id = path.into_inner();
    trace!("API: get project {}", id);
    match service.get(id).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => project_error(&e),
    }
}

/// POST /projects
pub async fn create_project(
    body: web::Json<ProjectDraft>,
    service: web::Data<Arc<ProjectService>>,
) -> impl Responder {
    match service.create(body.into_inner()).await {
        Ok(project) => {
            info!("API: project {} created", project.id);
            HttpResponse::Created().json(project)
        }
        Err(e) => project_error(&e),
    }
}

/// PUT /projects/{id}
pub async fn update_project(
    path: web::Path<i64>,
    body: web::Json<ProjectDraft>,
    service: web::Data<Arc<ProjectService>>,
) -> impl Responder {
    let id = path.into_inner();
    match service.update(id, body.into_inner()).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => project_error(&e),
    }
}

/// DELETE /projects/{id}
pub async fn delete_project(
    path: web::Path<i64>,
    service: web::Data<Arc<ProjectService>>,
) -> impl Responder {
    let id = path.into_inner();
    match service.delete(id).await {
        Ok(()) => {
            info!("API: project {} deleted", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => project_error(&e),
    }
}

/// 项目路由 `/projects`
pub fn projects_routes() -> actix_web::Scope {
    web::scope("/projects")
        .route("", web::get().to(list_projects))
        .route("", web::post().to(create_project))
        .route("/{id}", web::get().to(get_project))
        .route("/{id}", web::put().to(update_project))
        .route("/{id}", web::delete().to(delete_project))
}
