//! Bearer-token identity extraction for protected endpoints.
//!
//! Handlers that mutate the catalogue take an [`Identity`] parameter; the
//! extractor validates the `Authorization: Bearer` header against the token
//! codec and confirms the token subject still names a registered user. Read
//! endpoints simply omit the parameter.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User};

use super::state::HttpState;

/// The authenticated caller of a protected endpoint.
#[derive(Debug, Clone)]
pub struct Identity {
    user: User,
}

impl Identity {
    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.user
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing authorization header"))?;
    let raw = header_value
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    raw.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

async fn authenticate(req: HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not configured"))?;
    let token = bearer_token(&req)?;
    let claims = state.tokens.verify(&token)?;
    let user = state
        .accounts
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| Error::unauthorized("token subject is not a registered user"))?;
    Ok(Identity { user })
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(req).await.map_err(actix_web::Error::from) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_token_strips_the_scheme_prefix() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_unauthorised() {
        let req = TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_err());
    }

    #[test]
    fn non_bearer_schemes_are_rejected() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(bearer_token(&req).is_err());
    }

    #[test]
    fn empty_bearer_tokens_are_rejected() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer   "))
            .to_http_request();
        assert!(bearer_token(&req).is_err());
    }
}
