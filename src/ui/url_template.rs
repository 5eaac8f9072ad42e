use std::{fmt::Display, sync::LazyLock};

use regex::{NoExpand, Regex};
use url::{ParseError, Url};

use super::UiError;

static APP_NAME_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*\$appName\s*\}\}").expect("app name placeholder pattern"));
static APP_NAMESPACE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*\$appNamespace\s*\}\}").expect("app namespace placeholder pattern"));

const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// A templated UI address. Scheme and host are never empty; the path is empty when the
/// template names no path at all and `/` when it names the root explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposureUrl {
    url: Url,
    path: String,
}

impl ExposureUrl {
    fn from_parsed(url: Url, raw: &str) -> Result<Self, UiError> {
        if url.host_str().map_or(true, str::is_empty) {
            return Err(UiError::InvalidUrlTemplate {
                url: raw.to_owned(),
                source: None,
            });
        }
        let path = if url.path() == "/" && !names_root(raw) { String::new() } else { url.path().to_owned() };
        Ok(Self { url, path })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host without the port, as used for ingress rules.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the UI is mounted below a prefix rather than at the root of the host.
    pub fn is_sub_path(&self) -> bool {
        !self.path.is_empty() && self.path != "/"
    }
}

impl Display for ExposureUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let serialized = self.url.as_str();
        if self.path.is_empty() && self.url.query().is_none() && self.url.fragment().is_none() {
            write!(f, "{}", serialized.strip_suffix('/').unwrap_or(serialized))
        } else {
            write!(f, "{serialized}")
        }
    }
}

fn names_root(raw: &str) -> bool {
    let after_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let before_query = after_scheme.split(['?', '#']).next().unwrap_or_default();
    before_query.contains('/')
}

/// Expands the app name and namespace placeholders in `template` and parses the result.
///
/// Name placeholders are replaced first and the namespace placeholders are then replaced in
/// that output. A result without a scheme is parsed again with `http://` in front of it.
pub fn build_exposure_url(template: &str, app_name: &str, app_namespace: &str) -> Result<ExposureUrl, UiError> {
    let with_name = APP_NAME_PLACEHOLDER.replace_all(template, NoExpand(app_name));
    let expanded = APP_NAMESPACE_PLACEHOLDER.replace_all(&with_name, NoExpand(app_namespace)).into_owned();

    match Url::parse(&expanded) {
        Ok(url) if !url.cannot_be_a_base() => ExposureUrl::from_parsed(url, &expanded),
        // "host:port" and bare hosts carry no scheme even when the url parser finds one
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            let with_scheme = format!("{DEFAULT_SCHEME_PREFIX}{expanded}");
            match Url::parse(&with_scheme) {
                Ok(url) => ExposureUrl::from_parsed(url, &with_scheme),
                Err(source) => Err(UiError::InvalidUrlTemplate {
                    url: with_scheme,
                    source: Some(source),
                }),
            }
        },
        Err(source) => Err(UiError::InvalidUrlTemplate { url: expanded, source: Some(source) }),
    }
}
