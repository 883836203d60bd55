use thiserror::Error;

/// Validation errors for domain values and classifier scales.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("region code must be exactly two ASCII digits: '{value}'")]
    InvalidRegionCode { value: String },

    #[error("invalid month '{value}', expected one of jan..dec")]
    InvalidMonth { value: String },

    #[error("invalid commodity '{value}'")]
    InvalidCommodity { value: String },

    #[error("threshold scale must contain at least one band")]
    EmptyScale,
    #[error("threshold scale must start at 0, got {value}")]
    ScaleMustStartAtZero { value: String },
    #[error("threshold scale bands must strictly increase at index {index}")]
    NonAscendingThreshold { index: usize },
}

/// Provider-layer acquisition errors, classified for the retry loop.
///
/// The retryable/terminal split is the key correctness property of the
/// fetcher: a malformed request must surface immediately instead of being
/// silently retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure, timeout, or 5xx; eligible for linear-backoff retry.
    #[error("transient provider error: {message}")]
    Transient { message: String },

    /// HTTP 429; eligible for exponential-backoff retry.
    #[error("rate limited by provider after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    /// Non-retryable client or application error (4xx other than 429, or a
    /// malformed response shape). Surfaced to the caller immediately.
    #[error("terminal provider error: {message}")]
    Terminal { message: String },
}

impl FetchError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::RateLimited { .. })
    }
}

/// Cache medium read/write failure.
///
/// Always swallowed by the cache store (degrading to a miss); carried as a
/// typed error only across the `CacheMedium` seam.
#[derive(Debug, Error)]
pub enum CacheIoError {
    #[error("cache io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Static local-file fallback errors.
#[derive(Debug, Error)]
pub enum LocalFileError {
    #[error("failed to read fallback file: {0}")]
    Io(#[from] std::io::Error),

    #[error("fallback file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fallback file has no data for year {year}")]
    YearMissing { year: u16 },
}

/// Terminal failure of an entire source chain.
///
/// Only produced for metrics where fabricating a placeholder would be
/// misleading; the price ladder reports exhaustion as an empty result
/// instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("all sources exhausted for {query}: {attempts}")]
    Exhausted {
        query: String,
        /// Human-readable summary of each failed rung, in attempt order.
        attempts: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(FetchError::transient("timeout").retryable());
        assert!(FetchError::RateLimited { attempts: 2 }.retryable());
        assert!(!FetchError::terminal("400 bad request").retryable());
    }
}
