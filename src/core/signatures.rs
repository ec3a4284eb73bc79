//! Route-declaration templates per web technology.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Flask,
    Express,
    Django,
}

impl Technology {
    /// Detection order. Ties go to the earliest entry.
    pub const ALL: [Technology; 3] = [Technology::Flask, Technology::Express, Technology::Django];

    pub fn name(self) -> &'static str {
        match self {
            Self::Flask => "flask",
            Self::Express => "express",
            Self::Django => "django",
        }
    }

    /// Source file extension scanned for this technology.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Flask | Self::Django => "py",
            Self::Express => "js",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One route declaration found by a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    /// Byte offset of the match start.
    pub offset: usize,
    pub methods: BTreeSet<String>,
}

/// Compiled template of one technology.
#[derive(Debug, Clone)]
pub struct Signature {
    pub technology: Technology,
    pattern: Regex,
}

/// Compiled once, in detection order.
static SIGNATURES: LazyLock<[Signature; 3]> =
    LazyLock::new(|| Technology::ALL.map(Signature::compile));

impl Signature {
    /// The shared compiled template of `technology`.
    pub fn of(technology: Technology) -> &'static Signature {
        let index = Technology::ALL
            .iter()
            .position(|t| *t == technology)
            .unwrap_or_default();
        &SIGNATURES[index]
    }

    fn compile(technology: Technology) -> Self {
        let pattern = match technology {
            // @app.route("/x") or @app.route("/x", methods=["GET", "POST"])
            Technology::Flask => Regex::new(
                r#"@app\.route\(["'](?P<path>.*?)["'](?:\s*,\s*methods\s*=\s*\[(?P<methods>[^\]]*)\])?\s*\)"#,
            ),
            // app.get("/x", ...) / router.post('/x', ...)
            Technology::Express => Regex::new(
                r#"\.(?P<method>get|post|put|patch|delete)\(["'](?P<path>.*?)["']"#,
            ),
            Technology::Django => Regex::new(r#"path\(["'](?P<path>.*?)["']"#),
        }
        .expect("route templates are static and valid");
        Self {
            technology,
            pattern,
        }
    }

    pub fn count(&self, content: &str) -> usize {
        self.pattern.find_iter(content).count()
    }

    pub fn matches(&self, content: &str) -> Vec<RouteMatch> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| self.route_from(&caps))
            .collect()
    }

    fn route_from(&self, caps: &Captures<'_>) -> Option<RouteMatch> {
        let whole = caps.get(0)?;
        let path = caps.name("path")?.as_str().to_string();
        let mut methods = BTreeSet::new();
        if let Some(token) = caps.name("method") {
            methods.insert(token.as_str().to_ascii_uppercase());
        }
        if let Some(list) = caps.name("methods") {
            methods.extend(
                list.as_str()
                    .split(',')
                    .map(|m| m.trim().trim_matches(|c| c == '"' || c == '\'').trim())
                    .filter(|m| !m.is_empty())
                    .map(|m| m.to_ascii_uppercase()),
            );
        }
        if methods.is_empty() {
            methods.insert("GET".to_string());
        }
        Some(RouteMatch {
            path,
            offset: whole.start(),
            methods,
        })
    }
}

/// All signatures in detection order.
pub fn signatures() -> &'static [Signature] {
    SIGNATURES.as_slice()
}
