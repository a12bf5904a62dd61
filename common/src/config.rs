use std::time::Duration;

/// Variable con la URL base del coordinator que usan worker y cliente.
/// - En Docker: COORDINATOR_URL=http://coordinator:8080
/// - Local: default http://127.0.0.1:8080
pub const COORDINATOR_URL_ENV: &str = "COORDINATOR_URL";

/// Variable con la dirección donde escucha el coordinator.
pub const COORDINATOR_ADDR_ENV: &str = "COORDINATOR_ADDR";

pub const DEFAULT_COORDINATOR_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";

/// Ventana que tiene un worker para terminar una tarea antes de que se
/// pueda reasignar.
pub const DEFAULT_LEASE: Duration = Duration::from_secs(10);

/// Espera del worker cuando el coordinator responde WAIT.
pub const DEFAULT_WAIT_BACKOFF: Duration = Duration::from_secs(1);

/// Acepta `host:puerto` o una URL completa y devuelve una URL base sin
/// barra final.
pub fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_adds_scheme_and_strips_slash() {
        assert_eq!(normalize_base_url("127.0.0.1:9000"), "http://127.0.0.1:9000");
        assert_eq!(normalize_base_url("http://coordinator:8080/"), "http://coordinator:8080");
        assert_eq!(normalize_base_url(" https://x "), "https://x");
    }

    #[test]
    fn backoff_is_a_fraction_of_the_lease() {
        assert!(DEFAULT_WAIT_BACKOFF * 5 <= DEFAULT_LEASE);
    }
}
