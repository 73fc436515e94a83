//! Normalized absolute paths inside the remote archive.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// An absolute, normalized path in the remote archive.
///
/// Always starts with `/`, never ends with one (except the root itself),
/// contains no empty, `.` or `..` components, and is NFC-normalized so
/// that two spellings of the same name map to one cache key.
///
/// # Examples
///
/// ```
/// use duobox_core::RemotePath;
///
/// let path = RemotePath::parse(" /Archive//2024/./jan/../ ");
/// assert_eq!(path.as_str(), "/Archive/2024");
/// assert_eq!(path.parent().unwrap().as_str(), "/Archive");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath(String);

impl RemotePath {
    /// The archive root, `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalizes an arbitrary user- or service-supplied path.
    ///
    /// `..` never climbs above the root.
    pub fn parse(raw: &str) -> Self {
        let composed: String = raw.trim().nfc().collect();
        let mut parts: Vec<&str> = Vec::new();
        for component in composed.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                name => parts.push(name),
            }
        }
        if parts.is_empty() {
            Self::root()
        } else {
            Self(format!("/{}", parts.join("/")))
        }
    }

    /// Returns the normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// Returns the last component, or `None` at the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Appends a child name (which is itself normalized).
    pub fn join(&self, name: &str) -> Self {
        Self::parse(&format!("{}/{}", self.0, name))
    }

    /// Iterates over the path components, root excluded.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }
}

impl Default for RemotePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemotePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_slash_are_root() {
        assert!(RemotePath::parse("").is_root());
        assert!(RemotePath::parse("/").is_root());
        assert!(RemotePath::parse("  //  ").is_root());
        assert_eq!(RemotePath::root().as_str(), "/");
    }

    #[test]
    fn relative_input_becomes_absolute() {
        assert_eq!(RemotePath::parse("Archive/2024").as_str(), "/Archive/2024");
    }

    #[test]
    fn trailing_and_double_slashes_collapse() {
        assert_eq!(RemotePath::parse("/Archive//2024/").as_str(), "/Archive/2024");
    }

    #[test]
    fn dot_dot_never_escapes_root() {
        assert_eq!(RemotePath::parse("/../../a").as_str(), "/a");
        assert!(RemotePath::parse("/a/..").is_root());
    }

    #[test]
    fn parent_chain_ends_at_root() {
        let path = RemotePath::parse("/a/b");
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "/a");
        let grand = parent.parent().unwrap();
        assert!(grand.is_root());
        assert!(grand.parent().is_none());
    }

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(RemotePath::parse("/a/notes.txt").file_name(), Some("notes.txt"));
        assert_eq!(RemotePath::root().file_name(), None);
    }

    #[test]
    fn join_from_root_and_nested() {
        assert_eq!(RemotePath::root().join("Archive").as_str(), "/Archive");
        assert_eq!(
            RemotePath::parse("/Archive").join("2024").as_str(),
            "/Archive/2024"
        );
    }

    #[test]
    fn decomposed_names_are_composed() {
        // "é" written as 'e' + combining acute accent
        let decomposed = RemotePath::parse("/cafe\u{301}");
        let composed = RemotePath::parse("/caf\u{e9}");
        assert_eq!(decomposed, composed);
    }

    #[test]
    fn components_skip_root() {
        let path = RemotePath::parse("/x/y/z");
        assert_eq!(path.components().collect::<Vec<_>>(), vec!["x", "y", "z"]);
        assert_eq!(RemotePath::root().components().count(), 0);
    }
}
