//! Cross-cutting helpers shared by the binaries and the HTTP crate.

pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(serde_json::to_value(&h).unwrap()["status"], "ok");
    }
}
