use url::{Origin, Url};

use crate::passkey::config::PasskeyOptions;
use crate::passkey::types::{PasskeyOriginInfo, PasskeyRequestContext};

/// Decides whether the origin reported in client data is acceptable.
pub trait OriginValidator: Send + Sync {
    fn is_valid_origin(&self, origin: &PasskeyOriginInfo, request: &PasskeyRequestContext) -> bool;
}

/// Allow-list based validator driven by [`PasskeyOptions`].
///
/// Origins are compared as URL origins, so `https://example.com` and
/// `https://example.com:443/` match while differing schemes, hosts or ports
/// do not.
#[derive(Clone, Debug, Default)]
pub struct DefaultOriginValidator {
    allowed_origins: Vec<String>,
    allow_current_origin: bool,
    allow_cross_origin_iframes: bool,
}

impl DefaultOriginValidator {
    pub fn new(options: &PasskeyOptions) -> Self {
        Self {
            allowed_origins: options.allowed_origins.clone(),
            allow_current_origin: options.allow_current_origin,
            allow_cross_origin_iframes: options.allow_cross_origin_iframes,
        }
    }
}

impl OriginValidator for DefaultOriginValidator {
    fn is_valid_origin(&self, origin: &PasskeyOriginInfo, request: &PasskeyRequestContext) -> bool {
        if origin.origin.is_empty() {
            return false;
        }

        if origin.cross_origin && !self.allow_cross_origin_iframes {
            tracing::debug!("Cross-origin request from {} is not allowed", origin.origin);
            return false;
        }

        let Some(claimed) = parse_origin(&origin.origin) else {
            tracing::debug!("Origin {} is not a valid absolute URL", origin.origin);
            return false;
        };

        if self
            .allowed_origins
            .iter()
            .filter_map(|allowed| parse_origin(allowed))
            .any(|allowed| allowed == claimed)
        {
            return true;
        }

        if self.allow_current_origin {
            if let Some(current) = request.origin.as_deref().and_then(parse_origin) {
                return current == claimed;
            }
        }

        false
    }
}

/// Tuple origin of `value`; opaque origins never compare equal so are dropped.
fn parse_origin(value: &str) -> Option<Origin> {
    let origin = Url::parse(value).ok()?.origin();
    origin.is_tuple().then_some(origin)
}
