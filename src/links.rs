// src/links.rs
// =============================================================================
// This module builds the URLs shown next to each resource.
//
//   view:     {web_base}/{owner}/{repo}/blob/{branch}/{path}
//   raw:      {raw_base}/{owner}/{repo}/{branch}/{path}
//   download: raw for binary files, view page for everything else
//
// With the defaults, web_base is https://github.com and raw_base is
// https://raw.githubusercontent.com. Both come from RepoConfig, so GitHub
// Enterprise hosts get links on their own domain.
//
// Binary assets (images, archives, office documents, audio/video) open badly
// as inline text, so their download link goes straight to the raw content.
//
// Every path segment is percent-encoded on its own and the slashes between
// segments are kept, so "My Docs/File One.pdf" becomes
// "My%20Docs/File%20One.pdf".
//
// Rust concepts:
// - &'static str: the download label is one of two string literals
// - Iterator + join: encode segments, then glue them back with '/'
// =============================================================================

use serde::Serialize;

use crate::catalog::ResourceRecord;

// Extensions treated as binary, compared case-insensitively
const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".pdf", ".zip", ".pptx", ".docx", ".xlsx", ".mov",
    ".mp4", ".mp3", ".wav", ".avi", ".mkv",
];

// Does the path end in one of BINARY_EXTENSIONS?
//
// Example:
//   is_binary("Slides/Week1.PPTX") -> true
//   is_binary("notes.md")          -> false
pub fn is_binary(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

// Percent-encodes each '/'-separated segment independently
//
// Example:
//   encode_path("My Docs/File One.pdf") -> "My%20Docs/File%20One.pdf"
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// Builds links for one repository at one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    /// Web UI origin, no trailing slash
    web_base: String,
    /// Raw content origin, no trailing slash
    raw_base: String,
    owner: String,
    repo: String,
    /// Resolved branch name (encoded when a URL is built)
    branch: String,
}

impl LinkBuilder {
    // Parameters:
    //   web_base: e.g. "https://github.com" (a trailing '/' is dropped)
    //   raw_base: e.g. "https://raw.githubusercontent.com"
    //   owner, repo: repository coordinates
    //   branch: the resolved branch
    pub fn new(web_base: &str, raw_base: &str, owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            web_base: web_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        }
    }

    // Link to the repository's landing page
    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.web_base, self.owner, self.repo)
    }

    // Web UI page for a file
    pub fn view_url(&self, path: &str) -> String {
        format!(
            "{}/blob/{}/{}",
            self.repo_url(),
            urlencoding::encode(&self.branch),
            encode_path(path)
        )
    }

    // Raw file contents
    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            self.owner,
            self.repo,
            urlencoding::encode(&self.branch),
            encode_path(path)
        )
    }

    // Raw link for binary files, view page otherwise
    pub fn download_url(&self, path: &str) -> String {
        if is_binary(path) {
            self.raw_url(path)
        } else {
            self.view_url(path)
        }
    }

    // All links for a record, plus the label for the download link
    //
    // Returns: ResourceLinks with download_label "Download" (binary) or
    //          "View Raw" (everything else)
    pub fn links_for(&self, record: &ResourceRecord) -> ResourceLinks {
        let binary = is_binary(record.path());
        ResourceLinks {
            view: self.view_url(record.path()),
            download: self.download_url(record.path()),
            download_label: if binary { "Download" } else { "View Raw" },
        }
    }
}

// Links for one resource, ready for rendering or sharing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLinks {
    /// Web UI page
    pub view: String,
    /// Raw content (binary) or the view page (text)
    pub download: String,
    /// "Download" or "View Raw"
    pub download_label: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> LinkBuilder {
        LinkBuilder::new(
            "https://github.com",
            "https://raw.githubusercontent.com/",
            "octo",
            "library",
            "main",
        )
    }

    #[test]
    fn test_is_binary() {
        assert!(is_binary("Report.PDF"));
        assert!(is_binary("photos/Cat.JpEg"));
        assert!(!is_binary("notes.md"));
        assert!(!is_binary("pdf"));
    }

    #[test]
    fn test_segments_encoded_slashes_kept() {
        assert_eq!(encode_path("My Docs/File One.pdf"), "My%20Docs/File%20One.pdf");
        assert_eq!(encode_path("café/naïve #1.txt"), "caf%C3%A9/na%C3%AFve%20%231.txt");
    }

    #[test]
    fn test_download_url_binary_goes_raw() {
        assert_eq!(
            builder().download_url("My Docs/File One.pdf"),
            "https://raw.githubusercontent.com/octo/library/main/My%20Docs/File%20One.pdf"
        );
    }

    #[test]
    fn test_download_url_text_goes_to_view_page() {
        let links = builder();
        assert_eq!(
            links.download_url("docs/notes.md"),
            "https://github.com/octo/library/blob/main/docs/notes.md"
        );
        assert_eq!(links.download_url("docs/notes.md"), links.view_url("docs/notes.md"));
    }

    #[test]
    fn test_branch_is_encoded_as_one_component() {
        let links = LinkBuilder::new(
            "https://github.com",
            "https://raw.githubusercontent.com",
            "octo",
            "library",
            "release/v1",
        );
        assert_eq!(
            links.view_url("a.txt"),
            "https://github.com/octo/library/blob/release%2Fv1/a.txt"
        );
    }

    #[test]
    fn test_links_for_record() {
        let record = ResourceRecord::from_path("Audio/intro.mp3", None).unwrap();
        let links = builder().links_for(&record);
        assert_eq!(links.download_label, "Download");
        assert!(links.download.starts_with("https://raw.githubusercontent.com/"));
        assert!(links.view.starts_with("https://github.com/octo/library/blob/main/"));

        let text = ResourceRecord::from_path("README.md", None).unwrap();
        assert_eq!(builder().links_for(&text).download_label, "View Raw");
    }
}
