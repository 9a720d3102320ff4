use url::Url;

use crate::error::Result;
use crate::metadata::ToolMetadata;

pub const DEFAULT_ISSUE_URL: &str = "https://github.com/toolsubmit/registry/issues/new";
pub const DEFAULT_ISSUE_TEMPLATE: &str = "tool-submission.yml";

/// Build the pre-filled issue-form link for `meta`.
///
/// One query parameter per populated field; empty and absent fields are left
/// out entirely. Parameter names match the issue form's field ids.
pub fn build_issue_url(base: &str, template: &str, meta: &ToolMetadata) -> Result<String> {
    let title = format!("[Tool]: {}", meta.name);
    let theme = meta.theme.map(|t| t.as_str());

    let fields: [(&str, Option<&str>); 13] = [
        ("template", Some(template)),
        ("title", Some(title.as_str())),
        ("name", Some(meta.name.as_str())),
        ("tagline", Some(meta.tagline.as_str())),
        ("description", Some(meta.description.as_str())),
        ("github_url", Some(meta.github_url.as_str())),
        ("website_url", meta.website_url.as_deref()),
        ("author_name", Some(meta.author_name.as_str())),
        ("author_github", Some(meta.author_handle.as_str())),
        ("tags", Some(meta.tags.as_str())),
        ("language", meta.language.as_deref()),
        ("license", meta.license.as_deref()),
        ("theme", theme),
    ];

    let params = fields
        .into_iter()
        .filter_map(|(k, v)| v.map(str::trim).filter(|v| !v.is_empty()).map(|v| (k, v)));

    let url = Url::parse_with_params(base, params)?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn sample() -> ToolMetadata {
        ToolMetadata {
            name: "Foo".into(),
            tagline: "Short & sweet".into(),
            description: "Does X. Does Y.".into(),
            github_url: "https://github.com/acme/foo".into(),
            author_name: "Ada Lovelace".into(),
            author_handle: "acme".into(),
            tags: "cli, git, rust".into(),
            ..Default::default()
        }
    }

    fn params(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn populated_fields_become_parameters_in_order() {
        let url = build_issue_url(DEFAULT_ISSUE_URL, DEFAULT_ISSUE_TEMPLATE, &sample()).unwrap();
        assert!(url.starts_with("https://github.com/toolsubmit/registry/issues/new?template="));
        let keys: Vec<String> = params(&url).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "template",
                "title",
                "name",
                "tagline",
                "description",
                "github_url",
                "author_name",
                "author_github",
                "tags"
            ]
        );
    }

    #[test]
    fn absent_optionals_are_omitted_not_empty() {
        let mut m = sample();
        m.website_url = Some("  ".into());
        m.author_handle = String::new();
        let url = build_issue_url(DEFAULT_ISSUE_URL, DEFAULT_ISSUE_TEMPLATE, &m).unwrap();
        assert!(!url.contains("website_url"));
        assert!(!url.contains("author_github"));
        assert!(!url.contains("language"));
        assert!(!url.contains("theme"));
    }

    #[test]
    fn optional_fields_appear_when_set() {
        let mut m = sample();
        m.website_url = Some("https://foo.dev".into());
        m.language = Some("C++".into());
        m.license = Some("MIT".into());
        m.theme = Some(Theme::Ocean);
        let url = build_issue_url(DEFAULT_ISSUE_URL, DEFAULT_ISSUE_TEMPLATE, &m).unwrap();
        let p = params(&url);
        assert!(p.contains(&("website_url".into(), "https://foo.dev".into())));
        assert!(p.contains(&("language".into(), "C++".into())));
        assert!(p.contains(&("license".into(), "MIT".into())));
        assert!(p.contains(&("theme".into(), "ocean".into())));
    }

    #[test]
    fn values_are_percent_encoded() {
        let url = build_issue_url(DEFAULT_ISSUE_URL, DEFAULT_ISSUE_TEMPLATE, &sample()).unwrap();
        assert!(!url.contains("Short & sweet"));
        let p = params(&url);
        assert!(p.contains(&("tagline".into(), "Short & sweet".into())));
        assert!(p.contains(&("title".into(), "[Tool]: Foo".into())));
    }

    #[test]
    fn invalid_base_is_an_error() {
        assert!(build_issue_url("not a url", DEFAULT_ISSUE_TEMPLATE, &sample()).is_err());
    }
}
