use crate::error::{BadEnvVarSnafu, ParseBodyLimitSnafu, RosterResult};
use dotenvy::var;
use snafu::ResultExt;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_IP: &str = "127.0.0.1:5000";
pub const DEFAULT_STUDENTS_CSV: &str = "students.csv";
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    students_csv: PathBuf,
    body_limit: usize,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(var)
    }

    ///unset variables fall back to their defaults, anything else that goes wrong is an error
    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let get_env_var = |name| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
            Err(source) => Err(source).context(BadEnvVarSnafu { name }),
        };

        let server_ip =
            get_env_var("ROSTER_SERVER_IP")?.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let students_csv = get_env_var("ROSTER_STUDENTS_CSV")?
            .map_or_else(|| PathBuf::from(DEFAULT_STUDENTS_CSV), PathBuf::from);
        let body_limit = match get_env_var("ROSTER_BODY_LIMIT")? {
            Some(limit) => limit.trim().parse().context(ParseBodyLimitSnafu)?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            server_ip,
            students_csv,
            body_limit,
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn students_csv(&self) -> &Path {
        &self.students_csv
    }

    pub const fn body_limit(&self) -> usize {
        self.body_limit
    }
}
