//! HTML method override.
//!
//! Browsers only submit forms with GET or POST. A POST carrying
//! `?_method=PUT` (or `DELETE`, `PATCH`) in its query string is rewritten
//! to that method before routing. Any other method is left alone.

use axum::extract::Request;
use axum::http::Method;

/// Query parameter naming the intended method.
pub const METHOD_PARAM: &str = "_method";

/// Rewrites the method of an overridden POST request.
#[must_use]
pub fn override_method(mut request: Request) -> Request {
    if request.method() == Method::POST
        && let Some(method) = request.uri().query().and_then(requested_method)
    {
        tracing::trace!(%method, path = %request.uri().path(), "Method override");
        *request.method_mut() = method;
    }
    request
}

fn requested_method(query: &str) -> Option<Method> {
    let (_, value) = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == METHOD_PARAM)?;

    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        "PATCH" => Some(Method::PATCH),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use test_case::test_case;

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test_case("/contact?_method=PUT", Method::PUT; "put")]
    #[test_case("/contact?_method=delete", Method::DELETE; "lowercase delete")]
    #[test_case("/contact?page=2&_method=Patch", Method::PATCH; "mixed case after other params")]
    #[test_case("/contact?_method=GET", Method::POST; "get is not an override")]
    #[test_case("/contact?_method=", Method::POST; "empty value")]
    #[test_case("/contact?method=PUT", Method::POST; "wrong parameter name")]
    #[test_case("/contact", Method::POST; "no query")]
    fn test_post_override(uri: &str, expected: Method) {
        let rewritten = override_method(request(Method::POST, uri));
        assert_eq!(rewritten.method(), expected);
        assert_eq!(rewritten.uri(), uri);
    }

    #[test]
    fn test_only_post_is_rewritten() {
        let rewritten = override_method(request(Method::GET, "/contact?_method=DELETE"));
        assert_eq!(rewritten.method(), Method::GET);
    }
}
