use crate::helpers::JsonResponse;
use crate::middleware::authentication::method;

use std::cell::RefCell;
use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};

/// Resolves the bearer token (if any) into an admin on every request.
///
/// Anonymous requests pass through untouched; rejected tokens leave an
/// [`AuthFailure`](super::AuthFailure) for admin-only scopes to report.
#[derive(Default)]
pub struct AdminAuthentication;

impl<S, B> Transform<S, ServiceRequest> for AdminAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthenticationMiddleware {
            service: Rc::new(RefCell::new(service)),
        }))
    }
}

pub struct AdminAuthenticationMiddleware<S> {
    service: Rc<RefCell<S>>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        match self.service.try_borrow_mut() {
            Ok(mut service) => service.poll_ready(ctx),
            Err(_) => Poll::Pending,
        }
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        async move {
            if let Err(msg) = method::try_jwt(&mut req).await {
                tracing::error!("Authentication could not run: {}", msg);
                return Err(JsonResponse::internal_server_error(msg));
            }

            let fut = service.borrow_mut().call(req);
            fut.await
        }
        .boxed_local()
    }
}
