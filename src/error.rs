use crate::data::{Envelope, schema::ValidationErrors};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
};
use snafu::Snafu;
use std::{io, num::ParseIntError};
use uuid::Uuid;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to load .env file"))]
    LoadDotenv { source: dotenvy::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unknown store backend {:?}, expected `postgres` or `memory`", found))]
    UnknownStoreBackend { found: String },
    #[snafu(display("Invalid CORS origin {:?}", origin))]
    InvalidOrigin {
        source: InvalidHeaderValue,
        origin: String,
    },
    #[snafu(display("Unable to set tracing subscriber"))]
    SetTracingSubscriber {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener { source: io::Error, address: String },
    #[snafu(display("Error serving app"))]
    Serve { source: io::Error },
    #[snafu(display("Inserted student with internal key {} could not be found again", key))]
    MissingInsertedStudent { key: Uuid },
    #[snafu(display("Unable to read JSON request body"))]
    JsonBody { source: JsonRejection },
    #[snafu(display("Request body failed validation"))]
    Validation { errors: ValidationErrors },
}

impl RosterError {
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const BI: StatusCode = StatusCode::UNPROCESSABLE_ENTITY; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::MakeQuery { .. } => ISE,
            Self::MigrateError { .. } => ISE,
            Self::LoadDotenv { .. } | Self::BadEnvVar { .. } => ISE,
            Self::ParseNumber { .. } | Self::UnknownStoreBackend { .. } => ISE,
            Self::InvalidOrigin { .. } => ISE,
            Self::SetTracingSubscriber { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
            Self::MissingInsertedStudent { .. } => ISE,
            Self::JsonBody { source } => match source {
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => BI,
                other => other.status(),
            },
            Self::Validation { .. } => BI,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        match self {
            Self::Validation { errors } => {
                info!(?errors, "Rejected request body");
                (status_code, Json(errors)).into_response()
            }
            Self::JsonBody { source } => {
                info!(%source, "Rejected request body");
                (status_code, Json(ValidationErrors::from_rejection(&source))).into_response()
            }
            other => {
                error!(?other, "Error!");
                (
                    status_code,
                    Json(Envelope::failure("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
