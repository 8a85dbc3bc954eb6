use std::path::PathBuf;
use std::time::Duration;

/// Tenant the identity service authenticates against unless overridden
pub const DEFAULT_TENANT: &str = "mamram";

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub listing: ListingConfig,
    pub tenant: String,
    /// Directory under which `packages/<run-id>` scratch space is created
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    /// Skip TLS certificate validation (self-signed appliance certificates)
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts granted to a call that failed at the transport level
    pub transport_retries: u32,
    pub transport_backoff: Duration,
    /// Listings performed while waiting for a new package to become visible
    pub package_lookup_attempts: u32,
    pub package_lookup_backoff: Duration,
    pub package_lookup_max_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub content_limit: u32,
    pub package_limit: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            accept_invalid_certs: false,
            user_agent: format!("vra-migrate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            transport_retries: 1,
            transport_backoff: Duration::from_secs(1),
            package_lookup_attempts: 5,
            package_lookup_backoff: Duration::from_millis(500),
            package_lookup_max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// No sleeping between attempts; used by tests and dry tooling
    pub fn immediate() -> Self {
        Self {
            transport_backoff: Duration::ZERO,
            package_lookup_backoff: Duration::ZERO,
            package_lookup_max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay before package lookup number `attempt + 1` (exponential, capped)
    pub fn lookup_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.package_lookup_backoff
            .saturating_mul(factor)
            .min(self.package_lookup_max_backoff)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            content_limit: 1000,
            package_limit: 9999,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            listing: ListingConfig::default(),
            tenant: DEFAULT_TENANT.to_string(),
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl MigrationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.http.timeout.is_zero() {
            return Err("request timeout must be greater than 0".to_string());
        }

        if self.retry.package_lookup_attempts == 0 {
            return Err("package_lookup_attempts must be greater than 0".to_string());
        }

        if self.listing.content_limit == 0 || self.listing.package_limit == 0 {
            return Err("listing limits must be greater than 0".to_string());
        }

        if self.tenant.trim().is_empty() {
            return Err("tenant must not be empty".to_string());
        }

        Ok(())
    }
}
