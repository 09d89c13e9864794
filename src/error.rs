use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Invalid CORS origin {:?}", origin))]
    InvalidCorsOrigin {
        source: axum::http::header::InvalidHeaderValue,
        origin: String,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
    #[snafu(display("Invalid student payload: {}", source.body_text()))]
    BadPayload { source: JsonRejection },
    #[snafu(display("Invalid student path: {}", source.body_text()))]
    BadPath { source: PathRejection },
    #[snafu(display("Missing required field `{}`", field))]
    MissingField { field: &'static str },
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: String,
}

impl RosterError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } | Self::InvalidCorsOrigin { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            Self::BadPayload { source } => source.status(),
            Self::BadPath { source } => source.status(),
            Self::MissingField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(%self, %status_code, "Rejected request");
        }

        (
            status_code,
            Json(ErrorEnvelope {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
