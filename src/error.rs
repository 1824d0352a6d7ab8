use reqwest::StatusCode;
use thiserror::Error;

/// Всё, что может пойти не так между посетителем и API кинотеатра.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Не выполнено предусловие на клиенте, ничего не отправлено.
    #[error("{0}")]
    Validation(String),

    /// Запрос не завершился (соединение, таймаут, оборванное тело).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Сервер ответил неуспешным статусом.
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    /// Ждали успех, а тело не JSON (или не тот JSON).
    #[error("server returned an unexpected response (status {status}, content type {content_type})")]
    UnexpectedResponse { status: StatusCode, content_type: String },

    #[error("login required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("could not read payment proof: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Сообщение из тела ответа сервера, `None` для общих ошибок.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, status } if *message != generic_status_message(*status) => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Текст, который можно показать посетителю.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Could not reach the cinema server. Please try again.".to_string(),
            ClientError::Unauthenticated => "Please log in to continue.".to_string(),
            ClientError::UnexpectedResponse { status, .. } => {
                format!("The server returned an unexpected response (status {}).", status.as_u16())
            }
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Server { status, .. } | ClientError::UnexpectedResponse { status, .. } => Some(*status),
            ClientError::Network(e) => e.status(),
            _ => None,
        }
    }
}

// Первая ошибка по алфавиту полей, чтобы сообщение было стабильным.
impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let message = fields
            .into_iter()
            .find_map(|(field, errs)| {
                errs.first().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .unwrap_or_else(|| "Invalid input".to_string());
        ClientError::Validation(message)
    }
}

pub(crate) fn generic_status_message(status: StatusCode) -> String {
    format!("Request failed with status {}", status.as_u16())
}

pub type ClientResult<T> = Result<T, ClientError>;
