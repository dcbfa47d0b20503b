use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::{num::ParseIntError, path::PathBuf};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("No data provided"))]
    NoDataProvided,
    #[snafu(display("Request body is not valid JSON: {}", source))]
    InvalidJson { source: serde_json::Error },
    #[snafu(display("Request body must be a JSON object"))]
    NotAnObject,
    #[snafu(display("Invalid fields for {}. Required: {}", operation, required))]
    InvalidFields {
        operation: &'static str,
        required: &'static str,
    },
    #[snafu(display("Invalid value for `{}`: {}", field, reason))]
    InvalidFieldValue {
        field: &'static str,
        reason: &'static str,
    },
    #[snafu(display("Student not found"))]
    MissingStudent { id: u32 },
    #[snafu(display("No student ids left after {}", max))]
    IdsExhausted { max: u32 },
    #[snafu(display("Students with this last name not found"))]
    NoStudentsWithLastName { last_name: String },
    #[snafu(display("Student not found"))]
    BadStudentId { source: PathRejection },
    #[snafu(display("Unable to read students from {}", path.display()))]
    ReadStorage {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to write students to {}", path.display()))]
    WriteStorage {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error with CSVs"))]
    Csv { source: csv::Error },
    #[snafu(display("Error flushing CSV writer"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse request body limit"))]
    ParseBodyLimit { source: ParseIntError },
}

impl RosterError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::NoDataProvided
            | Self::InvalidJson { .. }
            | Self::NotAnObject
            | Self::InvalidFields { .. }
            | Self::InvalidFieldValue { .. } => BI,
            Self::MissingStudent { .. }
            | Self::NoStudentsWithLastName { .. }
            | Self::BadStudentId { .. } => NF,
            Self::IdsExhausted { .. }
            | Self::ReadStorage { .. }
            | Self::WriteStorage { .. }
            | Self::Csv { .. }
            | Self::CsvFlush { .. }
            | Self::BadEnvVar { .. }
            | Self::ParseBodyLimit { .. } => ISE,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, %status_code, "Rejected request");
        }

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
