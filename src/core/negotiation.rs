//! Response encoding selection.
//!
//! Priority: explicit `_format` parameter, then the `Accept` header, then
//! the configured default. Nothing here fails: an unrecognised value falls
//! back to the default.

use tracing::warn;

use crate::core::encoding::EncodingFormat;

/// Stateless encoding selector
#[derive(Debug, Clone, Copy)]
pub struct ContentNegotiator {
    default: EncodingFormat,
}

impl ContentNegotiator {
    pub fn new(default: EncodingFormat) -> Self {
        Self { default }
    }

    pub fn default_encoding(&self) -> EncodingFormat {
        self.default
    }

    /// Select the response encoding
    pub fn negotiate(&self, format_param: Option<&str>, accept: Option<&str>) -> EncodingFormat {
        if let Some(format) = format_param.and_then(EncodingFormat::from_content_type) {
            return format;
        }

        if let Some(format) = accept.and_then(Self::from_accept) {
            return format;
        }

        if let Some(raw) = format_param.or(accept) {
            warn!(
                value = raw,
                fallback = %self.default,
                "No recognised encoding requested, using default"
            );
        }

        self.default
    }

    /// Best recognised media range in an `Accept` header
    ///
    /// Entries are ranked by `q` (default 1.0); ties keep header order.
    /// Ranges with `q=0` are never selected.
    fn from_accept(accept: &str) -> Option<EncodingFormat> {
        let mut candidates: Vec<(f32, EncodingFormat)> = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let format = EncodingFormat::from_content_type(parts.next()?)?;
                let quality = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((quality, format))
            })
            .filter(|(q, _)| *q > 0.0)
            .collect();

        // stable sort keeps header order for equal weights
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, format)| *format)
    }
}

/// Resolve the `_pretty` parameter against a configured default
pub fn pretty_print(param: Option<&str>, default: bool) -> bool {
    match param.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}
