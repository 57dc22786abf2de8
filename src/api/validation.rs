use chrono::NaiveDate;

use super::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::validation("Username cannot be empty."));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long.",
        ));
    }
    Ok(password)
}

pub fn validate_habit_name(name: &str) -> Result<&str, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Habit name is required."));
    }
    Ok(name)
}

/// Dates are stored and compared as strings, so reject anything that is not a
/// real "YYYY-MM-DD" calendar date before it reaches the unique index.
pub fn validate_date(date: &str) -> Result<&str, ApiError> {
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(ApiError::validation(format!(
            "Invalid date: '{date}'. Expected YYYY-MM-DD"
        )));
    }
    Ok(date)
}

pub fn validate_id(id: i32, what: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {what}: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}
