use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Gradle configuration a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    Api,
    Implementation,
    TestImplementation,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Api,
        DependencyKind::Implementation,
        DependencyKind::TestImplementation,
    ];

    /// The configuration keyword as written in a build file
    pub fn keyword(&self) -> &'static str {
        match self {
            DependencyKind::Api => "api",
            DependencyKind::Implementation => "implementation",
            DependencyKind::TestImplementation => "testImplementation",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// Kind of a declaration line, if the trimmed line starts with a keyword
    /// followed by whitespace, `(` or a quote
    fn of_line(trimmed: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            trimmed
                .strip_prefix(kind.keyword())
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_whitespace() || matches!(c, '(' | '"' | '\''))
        })
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Whether a line belongs to the declaration grammar: its trimmed text starts
/// with one of the configuration keywords.
pub fn is_declaration_line(line: &str) -> bool {
    let trimmed = line.trim();
    DependencyKind::ALL
        .iter()
        .any(|kind| trimmed.starts_with(kind.keyword()))
}

/// A declared dependency edge of a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    /// Target identifier, e.g. `library-core`, `libraryCore` or `libs.okhttp`
    pub name: String,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// External library accessors from a version catalog
    pub fn is_external(&self) -> bool {
        self.name.starts_with(EXTERNAL_LIBRARY_PREFIX)
    }
}

/// Prefix of version catalog accessors; never a project module
pub const EXTERNAL_LIBRARY_PREFIX: &str = "libs.";

/// Prefix of type-safe project accessors
pub const PROJECT_ACCESSOR_PREFIX: &str = "projects.";

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A report entry that is not in `"<kind> <name>"` form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid dependency '{0}', expected '<kind> <name>'")]
pub struct ParseDependencyError(pub String);

impl FromStr for Dependency {
    type Err = ParseDependencyError;

    /// Parse the `"<kind> <name>"` display form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (keyword, name) = s
            .split_once(char::is_whitespace)
            .ok_or_else(|| ParseDependencyError(s.to_string()))?;
        let kind =
            DependencyKind::from_keyword(keyword).ok_or_else(|| ParseDependencyError(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseDependencyError(s.to_string()));
        }
        Ok(Dependency::new(name, kind))
    }
}

/// Extract the declared dependency from one build file line.
///
/// Returns `None` for lines outside the declaration grammar and for lines
/// whose target cannot be isolated.
pub fn parse_declaration(line: &str) -> Option<Dependency> {
    let trimmed = line.trim();
    let kind = DependencyKind::of_line(trimmed)?;

    let rest = trimmed[kind.keyword().len()..].trim_start();
    let rest = rest.strip_prefix('(').unwrap_or(rest).trim_start();

    let target = if let Some(path) = rest.strip_prefix("project(") {
        // project(":feature:home") -> feature:home
        path.split(')')
            .next()
            .unwrap_or_default()
            .replace(['"', '\''], "")
            .trim()
            .trim_start_matches(':')
            .to_string()
    } else {
        let token = rest.split_once('(').map_or(rest, |(_, after)| after);
        let token = cut_at(token, &[")", "{", "//", "because"]).trim();
        let token = token
            .strip_prefix(['"', '\''])
            .unwrap_or(token)
            .trim_end_matches(['"', '\'']);
        token
            .strip_prefix(PROJECT_ACCESSOR_PREFIX)
            .unwrap_or(token)
            .to_string()
    };

    if target.is_empty() || target == trimmed {
        return None;
    }
    Some(Dependency::new(target, kind))
}

fn cut_at<'a>(text: &'a str, markers: &[&str]) -> &'a str {
    markers
        .iter()
        .filter_map(|m| text.find(m))
        .min()
        .map_or(text, |end| &text[..end])
}

/// All dependency declarations of a build file, in file order
pub fn parse_declarations(contents: &str) -> Vec<Dependency> {
    contents
        .lines()
        .filter(|line| is_declaration_line(line))
        .filter_map(parse_declaration)
        .collect()
}
