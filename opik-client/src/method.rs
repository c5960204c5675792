//! HTTP methods used by Opik endpoints.

use strum::{Display, EnumString};

/// HTTP method of an endpoint or request descriptor.
///
/// ## Examples
///
/// ```rust
/// use opik_client::HttpMethod;
///
/// let method: HttpMethod = "PATCH".parse().unwrap();
/// assert_eq!(method, HttpMethod::Patch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_are_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!("get ".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn converts_to_reqwest_method() {
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
    }
}
