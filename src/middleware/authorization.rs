use crate::helpers::JsonResponse;
use crate::middleware::authentication::{AuthFailure, NO_TOKEN_MESSAGE};
use crate::models::AdminUser;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Lets a request through only when the authentication manager attached an admin.
pub struct AdminOnly;

impl<S, B> Transform<S, ServiceRequest> for AdminOnly
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminOnlyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminOnlyMiddleware {
            service: Rc::new(RefCell::new(service)),
        }))
    }
}

pub struct AdminOnlyMiddleware<S> {
    service: Rc<RefCell<S>>,
}

impl<S, B> Service<ServiceRequest> for AdminOnlyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Ok(mut service) = self.service.try_borrow_mut() {
            service.poll_ready(ctx)
        } else {
            Poll::Pending
        }
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authenticated = req.extensions().get::<Arc<AdminUser>>().is_some();
        if !authenticated {
            let msg = req
                .extensions()
                .get::<AuthFailure>()
                .map(|failure| failure.0.clone())
                .unwrap_or_else(|| NO_TOKEN_MESSAGE.to_string());
            tracing::debug!("Admin route refused: {}", msg);
            return async move { Err(JsonResponse::<()>::build().unauthorized(msg)) }.boxed_local();
        }

        let service = self.service.clone();
        async move {
            let fut = service.borrow_mut().call(req);
            fut.await
        }
        .boxed_local()
    }
}
