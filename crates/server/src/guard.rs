use crate::error::ApiError;
use crate::identity::Identity;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use models::role::Surface;

/// Access guards, one per surface. Denial is terminal: the handler never
/// runs and the body carries only the generic denial message.
pub async fn student_surface(req: Request, next: Next) -> Result<Response, ApiError> {
    check(Surface::Student, req, next).await
}

pub async fn instructor_surface(req: Request, next: Next) -> Result<Response, ApiError> {
    check(Surface::Instructor, req, next).await
}

pub async fn admin_surface(req: Request, next: Next) -> Result<Response, ApiError> {
    check(Surface::Admin, req, next).await
}

async fn check(surface: Surface, req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = Identity::from_headers(req.headers());

    // Unresolvable role is unauthenticated, never a privileged default.
    let Some(role) = identity.role else {
        info!("{surface} surface: access denied, no resolvable role");
        return Err(ApiError::unauthenticated());
    };

    if !surface.allows(role) {
        info!("{surface} surface: access denied for role '{role}'");
        return Err(ApiError::forbidden(surface.allowed_roles()));
    }

    if surface == Surface::Admin {
        info!(
            "[AUDIT] admin {} performing {} on {}",
            identity.email.as_deref().unwrap_or("<unknown>"),
            req.method(),
            req.uri().path()
        );
    }

    Ok(next.run(req).await)
}
