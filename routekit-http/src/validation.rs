//! Response validation.

use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field name that failed validation.
    pub field: String,
    /// Error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Individual failures in the order they were reported.
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection.
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Single-error collection.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationError::new(field, message)])
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get errors for a specific field.
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

/// Types that can check their own invariants.
pub trait Validate {
    /// Validate the value and return errors if any.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Validates a route's mapped response before it reaches callers.
#[async_trait]
pub trait Validator<T>: Send + Sync {
    /// Validate a value.
    async fn validate(&self, value: &T) -> Result<(), ValidationErrors>;
}

/// Validator backed by a closure.
pub struct FnValidator<F> {
    check: F,
}

impl<F> FnValidator<F> {
    /// Wrap a closure.
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<T, F> Validator<T> for FnValidator<F>
where
    T: Sync,
    F: Fn(&T) -> Result<(), ValidationErrors> + Send + Sync,
{
    async fn validate(&self, value: &T) -> Result<(), ValidationErrors> {
        (self.check)(value)
    }
}

/// Validator delegating to [`Validate`].
pub struct SchemaValidator<T> {
    _marker: PhantomData<fn(&T)>,
}

impl<T> SchemaValidator<T> {
    /// Create a validator for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SchemaValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Validator<T> for SchemaValidator<T>
where
    T: Validate + Sync,
{
    async fn validate(&self, value: &T) -> Result<(), ValidationErrors> {
        value.validate().map_err(ValidationErrors::from)
    }
}
