use serde::Deserialize;

/// File-type marker shared by every template in the repository.
pub const TEMPLATE_SUFFIX: &str = ".gitignore";

/// One item of the `github/gitignore` contents listing.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// File name, e.g. `Go.gitignore`.
    pub name: String,
    /// Location inside the repository.
    pub path: String,
    /// Locator for the raw file. `null` for sub-directories.
    pub download_url: Option<String>,
}

impl TemplateEntry {
    /// The template name with the suffix stripped, if this entry is a template.
    pub fn template_name(&self) -> Option<&str> {
        self.name.strip_suffix(TEMPLATE_SUFFIX)
    }
}
