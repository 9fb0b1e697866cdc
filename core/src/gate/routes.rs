use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteCategory {
    /// Excluded from the gate; no session lookup at all.
    Skipped,
    /// Session is refreshed but never required.
    Public,
    /// Session is refreshed and required.
    Protected,
}

impl RouteCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Public => "public",
            Self::Protected => "protected",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Self::Protected)
    }
}

impl std::fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteClassification {
    pub path: String,
    pub category: RouteCategory,
}

/// Ordered skip/public tables. Classification order is skip, public, protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    skip_prefixes: Vec<String>,
    public_paths: Vec<String>,
}

impl RouteTable {
    pub fn new(skip_prefixes: Vec<String>, public_paths: Vec<String>) -> Self {
        Self {
            skip_prefixes,
            public_paths,
        }
    }

    pub fn skip_prefixes(&self) -> &[String] {
        &self.skip_prefixes
    }

    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    /// Classify `path` after [`normalize_path`], so `//x` and `/a/../x`
    /// land in the same category as `/x`.
    pub fn classify(&self, path: &str) -> RouteClassification {
        let path = normalize_path(path);
        let category = if self.is_skipped(&path) {
            RouteCategory::Skipped
        } else if self.is_public(&path) {
            RouteCategory::Public
        } else {
            RouteCategory::Protected
        };

        RouteClassification { path, category }
    }

    fn is_skipped(&self, path: &str) -> bool {
        self.skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|entry| {
            path == entry
                || path
                    .strip_prefix(entry.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Collapse repeated `/`, drop `.` segments and resolve `..` lexically
/// (never above the root). A trailing `/` is kept.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(path.len() + 1);
    for s in &segments {
        out.push('/');
        out.push_str(s);
    }
    if out.is_empty() || path.ends_with('/') {
        out.push('/');
    }
    out
}
