use serde::Serialize;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad kind of failure a command hit. Attached to an error as context so that `main` can
/// pick an exit code without inspecting messages.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or config file is missing or bad.
    Config,
    /// User input was rejected before anything was sent.
    Validation,
    /// The backend rejected or failed a write.
    Request,
    /// The snapshot could not be fetched.
    Unavailable,
}

impl ErrorType {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorType::Config => 2,
            ErrorType::Validation => 3,
            ErrorType::Request => 4,
            ErrorType::Unavailable => 5,
        }
    }

    /// Finds the `ErrorType` attached to `e`, if any.
    pub fn of(e: &Error) -> Option<Self> {
        e.downcast_ref::<ErrorType>().copied()
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "Configuration error",
            ErrorType::Validation => "Invalid input",
            ErrorType::Request => "The backend request failed",
            ErrorType::Unavailable => "The dashboard is unavailable",
        };
        f.write_str(s)
    }
}

/// Tags a result's error with an `ErrorType` on its way out of a command.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Result<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.context(error_type))
    }
}
