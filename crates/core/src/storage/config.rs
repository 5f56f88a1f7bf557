//! Storage configuration types.

use std::path::PathBuf;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// Local filesystem (development only).
    LocalFs {
        /// Root directory files are written under.
        root: PathBuf,
        /// Public URL prefix the root is served at.
        public_prefix: String,
    },
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region (`auto` for R2-style providers).
        region: String,
        /// Public base URL for stored objects, when it differs from
        /// `{endpoint}/{bucket}`.
        public_url_base: Option<String>,
    },
}

impl StorageProvider {
    /// Create a local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            public_url_base: None,
        }
    }

    /// Get the provider name for logs and database storage.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }

    /// Returns true for providers reached over the network.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::S3 { .. })
    }
}

/// Media store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Timeout applied to each storage operation, in seconds.
    pub op_timeout_secs: u64,
}

impl StorageConfig {
    /// Default max file size: 50MB (videos included).
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
    /// Default per-operation timeout: 30 seconds.
    pub const DEFAULT_OP_TIMEOUT: u64 = 30;
    /// Default public prefix for the local filesystem variant.
    pub const DEFAULT_PUBLIC_PREFIX: &'static str = "/static/uploads";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            op_timeout_secs: Self::DEFAULT_OP_TIMEOUT,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set the per-operation timeout.
    #[must_use]
    pub fn with_op_timeout(mut self, secs: u64) -> Self {
        self.op_timeout_secs = secs;
        self
    }

    /// Set the public URL base for the S3 variant.
    #[must_use]
    pub fn with_public_url_base(mut self, base: impl Into<String>) -> Self {
        if let StorageProvider::S3 {
            public_url_base, ..
        } = &mut self.provider
        {
            *public_url_base = Some(base.into());
        }
        self
    }
}
