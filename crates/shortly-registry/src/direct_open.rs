//! Share links and the direct-open flow.
//!
//! There is no server behind a share link. The link points back at the
//! presentation layer with the slug in a `go` query parameter, and the
//! presentation layer resolves it locally.

use shortly_core::error::Result;
use shortly_core::{RegistryError, Slug};
use url::Url;

/// Query parameter that carries the slug in a share URL.
pub const GO_PARAM: &str = "go";

/// Builds the share URL for `slug`: `base_url` with its query replaced by
/// `go=<slug>`.
pub fn share_url(base_url: &str, slug: &Slug) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RegistryError::InvalidUrl(format!("base url '{base_url}': {e}")))?;
    url.query_pairs_mut()
        .clear()
        .append_pair(GO_PARAM, slug.as_str());
    Ok(url.into())
}

/// Extracts the requested slug from a direct-open URL, if it carries one.
///
/// Returns `None` if `request_url` is not an absolute URL or has no
/// non-empty `go` parameter.
pub fn requested_slug(request_url: &str) -> Option<Slug> {
    let url = Url::parse(request_url).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == GO_PARAM)
        .and_then(|(_, value)| Slug::new(value.into_owned()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    #[test]
    fn share_url_appends_go_param() {
        assert_eq!(
            share_url("https://links.example/app/", &slug("abc123")).unwrap(),
            "https://links.example/app/?go=abc123"
        );
    }

    #[test]
    fn share_url_replaces_existing_query() {
        assert_eq!(
            share_url("https://links.example/?go=old&x=1", &slug("new")).unwrap(),
            "https://links.example/?go=new"
        );
    }

    #[test]
    fn share_url_rejects_relative_base() {
        let err = share_url("links/app", &slug("abc")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidUrl(_)));
    }

    #[test]
    fn reserved_characters_survive_round_trip() {
        let odd = slug("a b&c=d/é");
        let url = share_url("https://links.example/", &odd).unwrap();

        assert_eq!(requested_slug(&url), Some(odd));
    }

    #[test]
    fn requested_slug_needs_a_non_empty_go_param() {
        assert_eq!(
            requested_slug("https://links.example/?go=abc"),
            Some(slug("abc"))
        );
        assert_eq!(requested_slug("https://links.example/?go="), None);
        assert_eq!(requested_slug("https://links.example/?other=abc"), None);
        assert_eq!(requested_slug("abc"), None);
    }
}
