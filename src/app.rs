use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::api::TemplateSource;
use crate::error::{Error, Result};
use crate::models::{TEMPLATE_SUFFIX, TemplateEntry};

/// Name of the file the generator writes.
const OUTPUT_FILE: &str = ".gitignore";

const MAX_SUGGESTIONS: usize = 3;

/// Template names in fetch order, suffix stripped. Entries without the suffix are skipped.
pub fn template_names(entries: &[TemplateEntry]) -> impl Iterator<Item = &str> {
    entries.iter().filter_map(TemplateEntry::template_name)
}

/// Prints every available template, one per line.
pub async fn list_templates<S, W>(source: &S, out: &mut W) -> Result<()>
where
    S: TemplateSource,
    W: Write,
{
    let entries = source.fetch_directory().await.map_err(Error::Directory)?;

    writeln!(out, "Available templates:").map_err(Error::Output)?;
    for name in template_names(&entries) {
        writeln!(out, "- {name}").map_err(Error::Output)?;
    }
    Ok(())
}

/// Finds the first entry whose name equals `requested` plus the suffix, ignoring case.
///
/// The suffix on `requested` is optional.
pub fn find_template<'a>(
    entries: &'a [TemplateEntry],
    requested: &str,
) -> Result<&'a TemplateEntry> {
    let wanted = normalize(requested);

    entries
        .iter()
        .find(|entry| entry.name.to_lowercase() == wanted)
        .ok_or_else(|| Error::NotFound {
            name: requested.to_string(),
            suggestions: suggest(entries, requested),
        })
}

fn normalize(requested: &str) -> String {
    let lowered = requested.to_lowercase();
    if lowered.ends_with(TEMPLATE_SUFFIX) {
        lowered
    } else {
        format!("{lowered}{TEMPLATE_SUFFIX}")
    }
}

/// Closest template names to `requested`, best score first.
fn suggest(entries: &[TemplateEntry], requested: &str) -> Vec<String> {
    let query = requested
        .to_lowercase()
        .trim_end_matches(TEMPLATE_SUFFIX)
        .to_string();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut matches: Vec<(i64, &str)> = template_names(entries)
        .filter_map(|name| matcher.fuzzy_match(name, &query).map(|score| (score, name)))
        .collect();

    // Stable sort keeps fetch order among equal scores.
    matches.sort_by(|a, b| b.0.cmp(&a.0));
    matches
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Creates or truncates `path` and writes `content` in full.
///
/// The handle is synced before it is dropped so a failed flush surfaces as
/// [`Error::Close`] instead of vanishing. It is dropped on every path.
pub fn write_template(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(Error::Create)?;
    file.write_all(content).map_err(Error::Write)?;
    file.sync_all().map_err(Error::Close)?;
    Ok(())
}

/// Fetches the template matching `requested` and writes it to `dir/.gitignore`.
pub async fn generate<S, W>(source: &S, requested: &str, dir: &Path, out: &mut W) -> Result<()>
where
    S: TemplateSource,
    W: Write,
{
    let entries = source.fetch_directory().await.map_err(Error::Directory)?;
    let entry = find_template(&entries, requested)?;
    debug!(name = %entry.name, path = %entry.path, "matched template");

    let locator = entry.download_url.as_deref().ok_or_else(|| {
        Error::RawContent(anyhow::anyhow!("{} has no download URL", entry.name))
    })?;
    let content = source.fetch_raw(locator).await.map_err(Error::RawContent)?;

    let path = dir.join(OUTPUT_FILE);
    write_template(&path, &content)?;
    info!(path = %path.display(), bytes = content.len(), "wrote template");

    writeln!(out, "Template {requested} written to {}", path.display()).map_err(Error::Output)
}
