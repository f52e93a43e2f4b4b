use ranch_client::ApiError;
use ranch_forms::message::{self, missing_fields_message};
use ranch_forms::StepRejected;
use ranch_storage::StorageError;

/// Where the user goes after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Stay on the current step and show the message.
    Stay,
    /// Back to the login screen.
    Login,
    /// Back to the step owning this staging key.
    Step(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] StepRejected),

    #[error("staged step '{key}' is missing")]
    MissingStep { key: String },

    #[error("staged step '{key}' is unreadable: {message}")]
    CorruptPayload { key: String, message: String },

    #[error("no stored credential")]
    NotLoggedIn,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("flow '{flow}' has no step '{key}'")]
    UnknownStep { flow: String, key: String },

    #[error("step '{key}' submits the flow and is never staged")]
    NotStaged { key: String },

    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FlowError {
    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Validation(rejected) => rejected.to_string(),
            FlowError::MissingStep { .. } | FlowError::CorruptPayload { .. } => {
                message::STAGED_STEP_MISSING.to_string()
            }
            FlowError::NotLoggedIn => message::NOT_LOGGED_IN.to_string(),
            FlowError::MissingFields(fields) => missing_fields_message(fields),
            FlowError::Api(e) => e.user_message(),
            FlowError::Storage(e) => format!("Could not access local storage: {e}"),
            FlowError::UnknownStep { .. } | FlowError::NotStaged { .. } | FlowError::Input(_) => {
                self.to_string()
            }
        }
    }

    pub fn route(&self) -> Route {
        match self {
            FlowError::MissingStep { key } | FlowError::CorruptPayload { key, .. } => {
                Route::Step(key.clone())
            }
            FlowError::NotLoggedIn | FlowError::Api(ApiError::AuthExpired) => Route::Login,
            _ => Route::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        assert_eq!(FlowError::NotLoggedIn.route(), Route::Login);
        assert_eq!(FlowError::Api(ApiError::AuthExpired).route(), Route::Login);
        assert_eq!(
            FlowError::MissingStep { key: "livestockOwnerStep1".into() }.route(),
            Route::Step("livestockOwnerStep1".into())
        );
        assert_eq!(FlowError::Api(ApiError::Timeout).route(), Route::Stay);
        assert_eq!(FlowError::MissingFields(vec!["lga".into()]).route(), Route::Stay);
    }

    #[test]
    fn messages() {
        assert_eq!(
            FlowError::MissingFields(vec!["lga".into(), "nin".into()]).user_message(),
            "Missing required fields: lga, nin"
        );
        assert_eq!(
            FlowError::Api(ApiError::Network("refused".into())).user_message(),
            "Could not connect to the server. Please check your internet connection and try again."
        );
        assert_eq!(
            FlowError::Api(ApiError::AuthExpired).user_message(),
            "Your session has expired. Please login again."
        );
    }
}
