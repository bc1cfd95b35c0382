pub mod admin;
pub mod error;
pub mod faculty;
pub mod password;

pub use admin::{AdminService, NewSubAdmin};
pub use error::ServiceError;
pub use faculty::{FacultyService, NewFaculty};

pub(crate) fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }
    if name.len() > 100 {
        return Err(ServiceError::Validation(
            "Name must be less than 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < 8 {
        return Err(ServiceError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}
