//! 写操作认证中间件
//!
//! GET/HEAD/OPTIONS 直接放行；其余方法在配置了管理员密码时要求
//! HTTP Basic 凭据，使用常量时间比较。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{
        Method,
        header::{AUTHORIZATION, HeaderValue, WWW_AUTHENTICATE},
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, trace};

use crate::api::services::error_from_portfolio;
use crate::errors::PortfolioError;
use crate::config::ApiConfig;

/// 管理员凭据
struct Credentials {
    username: String,
    password: String,
}

/// Write guard middleware
#[derive(Clone, Default)]
pub struct WriteGuard {
    credentials: Option<Arc<Credentials>>,
}

impl WriteGuard {
    /// 不做认证
    pub fn disabled() -> Self {
        Self { credentials: None }
    }

    /// 要求 Basic 认证
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Arc::new(Credentials {
                username: username.into(),
                password: password.into(),
            })),
        }
    }

    /// 密码为空时关闭认证
    pub fn from_config(config: &ApiConfig) -> Self {
        if config.admin_password.is_empty() {
            Self::disabled()
        } else {
            Self::basic(&config.admin_username, &config.admin_password)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for WriteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = WriteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WriteGuardMiddleware {
            service: Rc::new(service),
            credentials: self.credentials.clone(),
        }))
    }
}

pub struct WriteGuardMiddleware<S> {
    service: Rc<S>,
    credentials: Option<Arc<Credentials>>,
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// 解析 `Authorization: Basic ...`，返回 (用户名, 密码)
fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn credentials_match(expected: &Credentials, user: &str, pass: &str) -> bool {
    let user_ok = expected.username.as_bytes().ct_eq(user.as_bytes());
    let pass_ok = expected.password.as_bytes().ct_eq(pass.as_bytes());
    bool::from(user_ok & pass_ok)
}

impl<S> WriteGuardMiddleware<S> {
    fn is_authorized(&self, req: &ServiceRequest) -> bool {
        let Some(expected) = self.credentials.as_deref() else {
            return true;
        };
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_basic_auth)
            .is_some_and(|(user, pass)| credentials_match(expected, &user, &pass))
    }

    fn handle_unauthorized<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!(
            "Write request rejected: {} {} (invalid or missing credentials)",
            req.method(),
            req.path()
        );
        let err = PortfolioError::unauthorized("invalid or missing credentials");
        let mut response = error_from_portfolio(&err);
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"portfolio\""),
        );
        req.into_response(response.map_into_right_body())
    }
}

impl<S, B> Service<ServiceRequest> for WriteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_read_only(req.method()) && !self.is_authorized(&req) {
            return Box::pin(async move { Ok(Self::handle_unauthorized(req)) });
        }

        trace!("Write guard passed: {} {}", req.method(), req.path());
        let srv = self.service.clone();
        Box::pin(async move {
            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};
    use serde_json::Value;

    #[test]
    fn test_parse_basic_auth() {
        let header = format!("Basic {}", STANDARD.encode("dev:s3cret:with-colon"));
        assert_eq!(
            parse_basic_auth(&header),
            Some(("dev".to_string(), "s3cret:with-colon".to_string()))
        );
        assert_eq!(parse_basic_auth("Bearer abc"), None);
        assert_eq!(parse_basic_auth("Basic !!!"), None);
    }

    #[test]
    fn test_credentials_match() {
        let expected = Credentials {
            username: "dev".to_string(),
            password: "pw".to_string(),
        };
        assert!(credentials_match(&expected, "dev", "pw"));
        assert!(!credentials_match(&expected, "dev", "pw2"));
        assert!(!credentials_match(&expected, "admin", "pw"));
    }

    #[test]
    fn test_from_config() {
        let mut config = ApiConfig::default();
        assert!(!WriteGuard::from_config(&config).is_enabled());
        config.admin_password = "secret".to_string();
        assert!(WriteGuard::from_config(&config).is_enabled());
    }

    #[test]
    fn test_read_only_methods() {
        assert!(is_read_only(&Method::GET));
        assert!(is_read_only(&Method::OPTIONS));
        assert!(!is_read_only(&Method::POST));
        assert!(!is_read_only(&Method::DELETE));
    }

    #[actix_rt::test]
    async fn test_rejected_write_uses_error_envelope() {
        let app = actix_test::init_service(
            App::new()
                .wrap(WriteGuard::basic("dev", "pw"))
                .route("/", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"portfolio\""
        );
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["code"], 1001);
        assert_eq!(body["message"], "invalid or missing credentials");

        let auth = format!("Basic {}", STANDARD.encode("dev:pw"));
        let req = actix_test::TestRequest::post()
            .uri("/")
            .insert_header((AUTHORIZATION, auth))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }
}
