pub const TOKEN_NOT_FOUND: &str = "token not found";
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const NOT_AUTHORIZED: &str = "not authorized";

pub fn already_exists(entity: &str) -> String {
    format!("{} already exists", entity)
}

pub fn not_found(entity: &str) -> String {
    format!("{} not found", entity)
}

pub fn created(entity: &str) -> String {
    format!("{} created successfully", entity)
}

pub fn updated(entity: &str) -> String {
    format!("{} updated successfully", entity)
}

pub fn deleted(entity: &str) -> String {
    format!("{} deleted successfully", entity)
}
