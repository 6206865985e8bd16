use std::time::Duration;

use crate::config::GatewayConfig;

/// One prefix-to-backend mapping, fixed at startup.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    pub name: String,
    pub prefix: String,
    pub target: String,
    pub rewrite: String,
    pub timeout: Duration,
}

impl ServiceRoute {
    /// Strips the matched prefix and substitutes the rewrite, keeping
    /// backends path-prefix-agnostic. `/api/auth/signin` → `/signin`.
    pub fn rewrite_path(&self, path: &str) -> String {
        let rest = &path[self.prefix.len()..];
        let rewritten = format!("{}{}", self.rewrite, rest);
        if rewritten.is_empty() {
            "/".to_string()
        } else {
            rewritten
        }
    }
}

/// Immutable route table, sorted longest-prefix-first so first match wins
/// deterministically.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<ServiceRoute>,
}

impl RouteTable {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let timeout = Duration::from_millis(config.proxy_timeout_ms);
        let mut routes: Vec<ServiceRoute> = config
            .backends
            .iter()
            .map(|b| ServiceRoute {
                name: b.name.clone(),
                prefix: b.prefix.clone(),
                target: b.target.trim_end_matches('/').to_string(),
                rewrite: b.rewrite.clone(),
                timeout,
            })
            .collect();
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    /// Longest registered prefix that is a path prefix of `path`.
    pub fn match_path(&self, path: &str) -> Option<&ServiceRoute> {
        self.routes.iter().find(|r| {
            path.strip_prefix(r.prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn routes(&self) -> &[ServiceRoute] {
        &self.routes
    }

    pub fn prefixes(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.prefix.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn table_of(entries: &[(&str, &str, &str)]) -> RouteTable {
        let config = GatewayConfig {
            port: 0,
            backends: entries
                .iter()
                .map(|(name, prefix, rewrite)| BackendConfig {
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                    target: format!("http://{name}.local"),
                    rewrite: rewrite.to_string(),
                })
                .collect(),
            proxy_timeout_ms: 10_000,
            probe_timeout_ms: 2_000,
        };
        RouteTable::from_config(&config)
    }

    #[test]
    fn matches_registered_prefix() {
        let table = table_of(&[("auth", "/api/auth", ""), ("users", "/api/users", "")]);
        let route = table.match_path("/api/auth/signin").expect("match");
        assert_eq!(route.name, "auth");
    }

    #[test]
    fn longest_prefix_wins() {
        let table = table_of(&[("api", "/api", ""), ("auth", "/api/auth", "")]);
        let route = table.match_path("/api/auth/signin").expect("match");
        assert_eq!(route.name, "auth");
        let route = table.match_path("/api/other").expect("match");
        assert_eq!(route.name, "api");
    }

    #[test]
    fn prefix_must_end_on_a_segment_boundary() {
        let table = table_of(&[("auth", "/api/auth", "")]);
        assert!(table.match_path("/api/authority/x").is_none());
        assert!(table.match_path("/api/auth").is_some());
    }

    #[test]
    fn unregistered_path_has_no_match() {
        let table = table_of(&[("auth", "/api/auth", "")]);
        assert!(table.match_path("/api/unknown/thing").is_none());
        assert!(table.match_path("/").is_none());
    }

    #[test]
    fn rewrite_strips_prefix() {
        let table = table_of(&[("auth", "/api/auth", "")]);
        let route = table.match_path("/api/auth/signin").unwrap();
        assert_eq!(route.rewrite_path("/api/auth/signin"), "/signin");
        assert_eq!(route.rewrite_path("/api/auth"), "/");
    }

    #[test]
    fn rewrite_substitutes_replacement_prefix() {
        let table = table_of(&[("legacy", "/api/v1/legacy", "/v2")]);
        let route = table.match_path("/api/v1/legacy/items").unwrap();
        assert_eq!(route.rewrite_path("/api/v1/legacy/items"), "/v2/items");
    }
}
