/// Settings for the listening service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP address to bind (default: `0.0.0.0:8080`)
    pub listen_addr: String,
    /// Name of the pingora service (default: `toolbox`)
    pub service_name: String,
    /// Keep-alive timeout for idle connections in seconds (default: 60)
    pub keepalive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            service_name: "toolbox".to_string(),
            keepalive_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn keepalive_secs(mut self, secs: u64) -> Self {
        self.keepalive_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8080() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.keepalive_secs, 60);
    }

    #[test]
    fn builder_overrides() {
        let config = ServerConfig::new()
            .listen_addr("127.0.0.1:9000")
            .service_name("ids")
            .keepalive_secs(5);
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.service_name, "ids");
        assert_eq!(config.keepalive_secs, 5);
    }
}
