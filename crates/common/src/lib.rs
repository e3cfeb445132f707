pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::healthy();
        assert_eq!(h.status, "healthy");
        let body = serde_json::to_value(&h).unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
