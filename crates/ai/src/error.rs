//! AI generation error types.

use thiserror::Error;
use vtt_core::ai::{AiProviderType, Modality};
use vtt_core::errors::FieldError;
use vtt_core::Error as CoreError;

/// AI generation errors.
#[derive(Debug, Error)]
pub enum AiError {
    /// Invalid input or request.
    #[error("{0}")]
    InvalidInput(String),

    /// One or more request fields failed validation.
    #[error("{}", join_messages(.0))]
    Validation(Vec<FieldError>),

    /// No prompt template with the requested name (and draft scope).
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// No provider implementation is registered for the modality.
    #[error("No {modality} provider is configured for {provider}")]
    ProviderNotConfigured {
        provider: AiProviderType,
        modality: Modality,
    },

    /// No provider was named and none is configured as the modality default.
    #[error("No default {0} provider is configured")]
    NoDefaultProvider(Modality),

    /// The resolved provider cannot serve this operation.
    #[error("{0}")]
    UnsupportedProvider(String),

    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider failure, message kept verbatim.
    #[error("{0}")]
    Provider(String),

    /// Core error from vtt-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AiError {
    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// True for failures caused by the caller's request rather than a provider.
    pub fn is_client_error(&self) -> bool {
        match self {
            AiError::InvalidInput(_)
            | AiError::Validation(_)
            | AiError::TemplateNotFound(_)
            | AiError::UnsupportedProvider(_) => true,
            AiError::Core(e) => matches!(e, CoreError::Validation(_)),
            _ => false,
        }
    }

    /// Flattens the error into `(field, message)` pairs.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            AiError::Validation(errors) => errors.clone(),
            AiError::TemplateNotFound(_) => vec![FieldError::new("template", self.to_string())],
            AiError::Core(e) => e.field_errors(),
            other => vec![FieldError::new("", other.to_string())],
        }
    }

    /// Error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            AiError::InvalidInput(_) => "INVALID_INPUT",
            AiError::Validation(_) => "VALIDATION_FAILED",
            AiError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            AiError::ProviderNotConfigured { .. } | AiError::NoDefaultProvider(_) => {
                "PROVIDER_NOT_CONFIGURED"
            }
            AiError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AiError::MissingApiKey(_) => "MISSING_API_KEY",
            AiError::Provider(_) => "PROVIDER_ERROR",
            AiError::Core(_) => "CORE_ERROR",
            AiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_verbatim() {
        let err = AiError::provider("OpenAI API error 500: boom");
        assert_eq!(err.to_string(), "OpenAI API error 500: boom");
        assert_eq!(err.code(), "PROVIDER_ERROR");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_validation_lists_every_field() {
        let err = AiError::Validation(vec![
            FieldError::new("maxTokens", "Max tokens must be greater than zero"),
            FieldError::new("temperature", "Temperature must be between 0 and 2"),
        ]);
        let fields: Vec<_> = err.field_errors().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["maxTokens", "temperature"]);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_template_not_found_message() {
        let err = AiError::TemplateNotFound("tavern".into());
        assert_eq!(err.to_string(), "Template 'tavern' not found");
        assert_eq!(err.field_errors()[0].field, "template");
    }
}
