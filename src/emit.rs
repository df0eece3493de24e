use serde::Serialize;

use crate::asset::Asset;
use crate::core::{Group, Position, Settings, Version};

/// Translation lookup attached to an emitted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translations {
    pub domain: String,
    pub path: Option<String>,
}

/// A single asset ready for the output layer, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub handle: String,
    pub group: Group,
    /// Final URL including the version query; `None` for aliases.
    pub src: Option<String>,
    /// Localized data, printed before everything else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
}

impl Emission {
    pub(crate) fn new(
        asset: &Asset,
        group: Group,
        args: Option<&str>,
        settings: &Settings,
    ) -> Self {
        let src = asset
            .src
            .as_deref()
            .map(|src| asset_url(src, &asset.ver, args, settings));

        let text = |key: &str| {
            asset
                .get_data(key)
                .and_then(|value| value.as_str())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            handle: asset.handle.clone(),
            group,
            src,
            data: text("data"),
            before: asset.inline(Position::Before).to_vec(),
            after: asset.inline(Position::After).to_vec(),
            conditional: text("conditional"),
            translations: asset.textdomain.as_ref().map(|domain| Translations {
                domain: domain.clone(),
                path: asset.translations_path.clone(),
            }),
        }
    }
}

/// Whether `src` already carries a scheme or is protocol-relative.
fn is_absolute(src: &str) -> bool {
    if src.starts_with("//") {
        return true;
    }

    match src.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Build the final URL of an asset: prefix relative sources with the base
/// URL and append the version (and handle args) as a `ver` query.
pub fn asset_url(src: &str, ver: &Version, args: Option<&str>, settings: &Settings) -> String {
    let mut url = match &settings.base_url {
        Some(base) if !is_absolute(src) => {
            format!("{}/{}", base.trim_end_matches('/'), src.trim_start_matches('/'))
        }
        _ => src.to_string(),
    };

    // An empty explicit version counts as unset.
    let ver = match ver {
        Version::Explicit(ver) if !ver.is_empty() => Some(ver.as_str()),
        Version::Explicit(_) | Version::Auto => settings.default_version.as_deref(),
        Version::None => None,
    };

    let query = match (ver.filter(|v| !v.is_empty()), args) {
        (Some(ver), Some(args)) => Some(format!("{ver}&{args}")),
        (Some(ver), None) => Some(ver.to_string()),
        (None, Some(args)) => Some(args.to_string()),
        (None, None) => None,
    };

    if let Some(query) = query {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str("ver=");
        url.push_str(&query);
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_versions() {
        let settings = Settings::new().default_version("6.0");

        assert_eq!(
            asset_url("/a.js", &Version::explicit("1.2"), None, &settings),
            "/a.js?ver=1.2"
        );
        assert_eq!(asset_url("/a.js", &Version::Auto, None, &settings), "/a.js?ver=6.0");
        assert_eq!(
            asset_url("/a.js", &Version::explicit(""), None, &settings),
            "/a.js?ver=6.0"
        );
        assert_eq!(
            asset_url("/a.js", &Version::explicit(""), None, &Settings::new()),
            "/a.js"
        );
        assert_eq!(asset_url("/a.js", &Version::None, None, &settings), "/a.js");
        assert_eq!(
            asset_url("/a.js?x=1", &Version::Auto, Some("lang=en"), &settings),
            "/a.js?x=1&ver=6.0&lang=en"
        );
        assert_eq!(
            asset_url("/a.js", &Version::Auto, None, &Settings::new()),
            "/a.js"
        );
    }

    #[test]
    fn test_base_url() {
        let settings = Settings::new().base_url("https://example.org/");

        assert_eq!(
            asset_url("/wp-includes/js/a.js", &Version::None, None, &settings),
            "https://example.org/wp-includes/js/a.js"
        );
        assert_eq!(
            asset_url("https://cdn.test/a.js", &Version::None, None, &settings),
            "https://cdn.test/a.js"
        );
        assert_eq!(
            asset_url("//cdn.test/a.js", &Version::None, None, &settings),
            "//cdn.test/a.js"
        );
    }

    #[test]
    fn test_emission_fields() {
        let mut asset = Asset::new("a", Some("/a.js".into()), vec![], Version::None);
        asset.add_data("conditional", json!("lt IE 9"));
        asset.add_data("data", json!("var a = {};"));
        asset.add_data("before", json!("x();"));
        asset.textdomain = Some("default".into());

        let emission = Emission::new(&asset, Group::Footer, None, &Settings::new());
        assert_eq!(emission.src.as_deref(), Some("/a.js"));
        assert_eq!(emission.conditional.as_deref(), Some("lt IE 9"));
        assert_eq!(emission.data.as_deref(), Some("var a = {};"));
        assert_eq!(emission.before, ["x();"]);
        assert_eq!(
            emission.translations,
            Some(Translations {
                domain: "default".into(),
                path: None
            })
        );
    }
}
