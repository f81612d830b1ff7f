//! Who is asking. Resolution has three outcomes: not known yet, a user, or
//! nobody.

use crate::models::User;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Pending,
    Resolved(Option<Arc<User>>),
}

impl Identity {
    pub fn resolved(user: Arc<User>) -> Self {
        Self::Resolved(Some(user))
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        match self {
            Self::Resolved(Some(user)) => Some(user),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// By the time a handler runs the authentication middleware has settled,
/// so an extracted identity is never `Pending`.
impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<Arc<User>>().cloned();
        ready(Ok(Identity::Resolved(user)))
    }
}
