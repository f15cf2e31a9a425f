use crate::{
    data::schema::Schema,
    error::{JsonBodySnafu, RosterError, ValidationSnafu},
};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use snafu::ResultExt;

/// JSON body that has been deserialised *and* checked against its [`Schema`].
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Schema,
    S: Send + Sync,
{
    type Rejection = RosterError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .context(JsonBodySnafu)?;

        if let Err(errors) = value.validate() {
            return ValidationSnafu { errors }.fail();
        }

        Ok(Self(value))
    }
}
