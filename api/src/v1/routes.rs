//! Paths relative to the API base URL.

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const GOOGLE: &str = "/auth/google";
pub const TODOS: &str = "/todos/";

pub fn todo(id: &str) -> String {
    format!("/todos/{}", id)
}
