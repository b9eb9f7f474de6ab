//! Admin area detection.
//!
//! # Design Decisions
//! - The admin root is the admin URL with the site URL removed, so a site
//!   mounted under a sub-path keeps working
//! - Matching compares a prefix of the same length as the admin root; it is
//!   not aware of path segment boundaries ("/wp-adminx" matches "/wp-admin")

use crate::config::SiteConfig;

/// Classifies request paths as belonging to the administrative area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPathClassifier {
    admin_root: String,
}

impl AdminPathClassifier {
    pub fn new(site_url: &str, admin_url: &str) -> Self {
        let admin_root = if site_url.is_empty() {
            admin_url.to_string()
        } else {
            admin_url.replace(site_url, "")
        };
        Self { admin_root }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(&site.site_url, &site.admin_url)
    }

    pub fn admin_root(&self) -> &str {
        &self.admin_root
    }

    /// Whether `path` starts with the admin root.
    ///
    /// Paths shorter than the root never match; an empty root matches
    /// every path.
    pub fn is_admin(&self, path: &str) -> bool {
        path.as_bytes().get(..self.admin_root.len()) == Some(self.admin_root.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_paths() {
        let classifier = AdminPathClassifier::new("https://x.test", "https://x.test/wp-admin");
        assert_eq!(classifier.admin_root(), "/wp-admin");
        assert!(classifier.is_admin("/wp-admin/edit.php"));
        assert!(classifier.is_admin("/wp-admin"));
        assert!(!classifier.is_admin("/blog/post"));
        assert!(!classifier.is_admin("/wp-adm"));
    }

    #[test]
    fn test_prefix_is_not_segment_aware() {
        let classifier = AdminPathClassifier::new("https://x.test", "https://x.test/wp-admin");
        assert!(classifier.is_admin("/wp-administrator"));
    }

    #[test]
    fn test_trailing_slash_admin_url() {
        let classifier = AdminPathClassifier::new("https://x.test", "https://x.test/wp-admin/");
        assert!(classifier.is_admin("/wp-admin/index.php"));
        assert!(!classifier.is_admin("/wp-admin"));
    }

    #[test]
    fn test_site_under_subpath() {
        let classifier =
            AdminPathClassifier::new("https://x.test/blog", "https://x.test/blog/wp-admin/");
        assert_eq!(classifier.admin_root(), "/wp-admin/");
    }

    #[test]
    fn test_empty_root_matches_everything() {
        let classifier = AdminPathClassifier::new("https://x.test", "https://x.test");
        assert!(classifier.is_admin("/anything"));
        assert!(classifier.is_admin(""));
    }

    #[test]
    fn test_multibyte_path_does_not_panic() {
        let classifier = AdminPathClassifier::new("https://x.test", "https://x.test/wp-admin");
        assert!(!classifier.is_admin("/é"));
    }
}
