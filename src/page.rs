use anyhow::Context as _;
use url::Url;

const PAGE_PLACEHOLDER: &str = "{i}";

/// Local file name for a page: `page_{n}.svg`.
pub fn page_file_name(page: u32) -> String {
    format!("page_{page}.svg")
}

/// Inverse of [`page_file_name`]. Only exact `page_<digits>.svg` names match.
/// Only canonical names qualify: `page_010.svg` would not round-trip through
/// [`page_file_name`], so it is rejected.
pub fn parse_page_file_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("page_")?.strip_suffix(".svg")?;
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    parse_ascii_digits(digits)
}

pub(crate) fn parse_ascii_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Remote URL template with a single `{i}` page placeholder.
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn parse(template: &str) -> anyhow::Result<Self> {
        if !template.contains(PAGE_PLACEHOLDER) {
            anyhow::bail!("url template must contain {PAGE_PLACEHOLDER}: {template}");
        }

        let template = Self {
            template: template.to_owned(),
        };
        let probe = template.url_for(1).context("parse url template")?;
        if probe.scheme() != "http" && probe.scheme() != "https" {
            anyhow::bail!("url template must be http/https: {}", template.template);
        }

        Ok(template)
    }

    pub fn url_for(&self, page: u32) -> anyhow::Result<Url> {
        let raw = self.template.replace(PAGE_PLACEHOLDER, &page.to_string());
        Url::parse(&raw).with_context(|| format!("parse page url: {raw}"))
    }
}
