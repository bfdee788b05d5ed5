//! Report-service HTML pages

use chrono::NaiveDateTime;
use regex::Regex;
use repro_errors::{Error, ReportError};
use serde::{Deserialize, Serialize};

/// Format of the build time shown on a package page
pub const BUILD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const BUILD_INFO_TITLE: &str = "Show: build info";

/// What the pipeline needs from a package's report page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePage {
    pub build_time: NaiveDateTime,
    /// Link to the `.buildinfo` text, usually site-relative
    pub build_info_href: String,
}

fn pattern(source: &str) -> Result<Regex, Error> {
    Regex::new(source).map_err(|e| Error::internal(format!("report page pattern: {e}")))
}

/// Attributes of an opening tag, with `&amp;` decoded in values
fn attributes(tag: &str, attr: &Regex) -> Vec<(String, String)> {
    attr.captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, value.replace("&amp;", "&")))
        })
        .collect()
}

fn attribute_regex() -> Result<Regex, Error> {
    pattern(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
}

/// Extract the build time and build-info link from a package page.
///
/// The build time is read from the `build-time` span: its text minus the
/// leading word, e.g. `tested 2016-06-01 10:00 UTC`.
///
/// # Errors
///
/// Returns `ReportError::MalformedReport` when the span or the link is
/// missing and `ReportError::InvalidBuildTime` when the span text does not
/// hold a timestamp.
pub fn parse_package_page(html: &str, package: &str) -> Result<PackagePage, Error> {
    let span = pattern(
        r#"(?is)<span\s[^>]*class\s*=\s*["'][^"']*\bbuild-time\b[^"']*["'][^>]*>(.*?)</span>"#,
    )?;
    let tag = pattern(r"<[^>]*>")?;
    let anchor = pattern(r"(?is)<a\s[^>]*>")?;
    let attr = attribute_regex()?;

    let mut missing = Vec::new();

    let build_time_text = span
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| tag.replace_all(m.as_str(), " ").into_owned());
    if build_time_text.is_none() {
        missing.push("build-time".to_string());
    }

    let href = anchor.find_iter(html).find_map(|m| {
        let attrs = attributes(m.as_str(), &attr);
        let titled = attrs
            .iter()
            .any(|(name, value)| name == "title" && value == BUILD_INFO_TITLE);
        if titled {
            attrs
                .into_iter()
                .find(|(name, _)| name == "href")
                .map(|(_, value)| value)
        } else {
            None
        }
    });
    if href.is_none() {
        missing.push("build info link".to_string());
    }

    let (Some(text), Some(build_info_href)) = (build_time_text, href) else {
        return Err(ReportError::MalformedReport {
            package: package.to_string(),
            missing,
        }
        .into());
    };

    let words: Vec<&str> = text.split_whitespace().skip(1).take(2).collect();
    let value = words.join(" ");
    let build_time = NaiveDateTime::parse_from_str(&value, BUILD_TIME_FORMAT).map_err(|_| {
        ReportError::InvalidBuildTime {
            package: package.to_string(),
            value: text.trim().to_string(),
        }
    })?;

    Ok(PackagePage {
        build_time,
        build_info_href,
    })
}

/// Package names listed on the index of reproducible packages
/// (`<a class="package">name</a>`), in page order.
///
/// # Errors
///
/// Returns an internal error only if the anchor pattern fails to compile.
pub fn parse_package_index(html: &str) -> Result<Vec<String>, Error> {
    let anchor = pattern(r"(?is)(<a\s[^>]*>)\s*([^<]*?)\s*</a>")?;
    let attr = attribute_regex()?;

    Ok(anchor
        .captures_iter(html)
        .filter_map(|caps| {
            let open = caps.get(1)?.as_str();
            let name = caps.get(2)?.as_str();
            let is_package = attributes(open, &attr).iter().any(|(key, value)| {
                key == "class" && value.split_whitespace().any(|class| class == "package")
            });
            (is_package && !name.is_empty()).then(|| name.to_string())
        })
        .collect())
}
