use crate::error::{Error, Result};

pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 || username.len() > 32 {
        return Err(Error::ValidationError(
            "Username must be between 3 and 32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::ValidationError(
            "Username must contain only letters, digits and underscores".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::ValidationError("Email is missing '@'".to_string()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(Error::ValidationError("Email address is malformed".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    // bcrypt truncates input beyond 72 bytes
    if password.len() > 72 {
        return Err(Error::ValidationError("Password is too long".to_string()));
    }
    Ok(())
}

pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(Error::ValidationError("Symbol cannot be empty".to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/' || c == '-')
    {
        return Err(Error::ValidationError(
            "Symbol must contain only uppercase letters, digits, '/' or '-'".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::ValidationError(
            "Collection name cannot be empty".to_string(),
        ));
    }
    if name.len() > 64 {
        return Err(Error::ValidationError(
            "Collection name is too long".to_string(),
        ));
    }
    Ok(())
}
