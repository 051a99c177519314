/*!
 * File categorization for the structure map
 *
 * Categories come from an ordered rule table: the first rule whose matcher
 * accepts a file name decides its category. Exact-name rules sit above the
 * extension rules so a well-known file name always wins over its extension.
 */

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::types::Category;

/// Static lookup set of lowercase names or extensions
pub type NameSet = Lazy<HashSet<&'static str>>;

/// Well-known configuration file names (lowercase)
pub static CONFIG_NAMES: NameSet = Lazy::new(|| {
    HashSet::from([
        "package.json",
        "package-lock.json",
        "composer.json",
        "composer.lock",
        "gemfile",
        "gemfile.lock",
        "rakefile",
        "makefile",
        "dockerfile",
        "webpack.config.js",
        "cargo.toml",
        "cargo.lock",
        "yarn.lock",
        "pnpm-lock.yaml",
        ".gitignore",
        ".gitattributes",
        ".editorconfig",
        ".env",
    ])
});

/// Program source extensions
pub static SOURCE_EXTENSIONS: NameSet = Lazy::new(|| {
    HashSet::from([
        ".py", ".js", ".jsx", ".ts", ".tsx", ".php", ".java", ".c", ".cpp", ".h", ".hpp", ".rb",
        ".go", ".swift", ".kt", ".vue", ".html", ".css", ".scss", ".less", ".sql", ".sh", ".bat",
        ".ps1", ".pl", ".lua", ".rs",
    ])
});

/// Configuration format extensions
pub static CONFIG_EXTENSIONS: NameSet = Lazy::new(|| {
    HashSet::from([
        ".json", ".xml", ".yaml", ".yml", ".ini", ".conf", ".toml", ".env",
    ])
});

/// Document extensions
pub static DOCUMENT_EXTENSIONS: NameSet = Lazy::new(|| {
    HashSet::from([
        ".md", ".txt", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods",
        ".odp", ".csv", ".tsv",
    ])
});

/// Image extensions
pub static IMAGE_EXTENSIONS: NameSet = Lazy::new(|| {
    HashSet::from([".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".webp"])
});

/// Archive extensions
pub static ARCHIVE_EXTENSIONS: NameSet =
    Lazy::new(|| HashSet::from([".zip", ".gz", ".tar", ".rar", ".7z", ".bz2", ".tgz"]));

/// Lowercased extension of a file name including the leading dot.
///
/// Only the last dot counts and a leading dot does not start an extension:
/// `archive.tar.gz` gives `.gz`, `.gitignore` gives `None`.
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// What part of a file name a rule looks at
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Whole lowercased name is in the set
    Name(&'static NameSet),
    /// Lowercased extension is in the set
    Extension(&'static NameSet),
    /// Name has no extension and its lowercased form is in the set
    BareName(&'static NameSet),
}

impl Matcher {
    fn matches(&self, lower_name: &str, extension: Option<&str>) -> bool {
        match self {
            Matcher::Name(set) => set.contains(lower_name),
            Matcher::Extension(set) => extension.is_some_and(|ext| set.contains(ext)),
            Matcher::BareName(set) => extension.is_none() && set.contains(lower_name),
        }
    }
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub matcher: Matcher,
    pub category: Category,
}

impl Rule {
    pub const fn new(matcher: Matcher, category: Category) -> Self {
        Self { matcher, category }
    }
}

/// Default rule table, in priority order
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(Matcher::Name(&CONFIG_NAMES), Category::Configuration),
        Rule::new(Matcher::Extension(&SOURCE_EXTENSIONS), Category::Source),
        Rule::new(Matcher::Extension(&CONFIG_EXTENSIONS), Category::Configuration),
        Rule::new(Matcher::Extension(&DOCUMENT_EXTENSIONS), Category::Document),
        Rule::new(Matcher::Extension(&IMAGE_EXTENSIONS), Category::Image),
        Rule::new(Matcher::Extension(&ARCHIVE_EXTENSIONS), Category::Archive),
        // shadowed by the first rule in this table; matters once tables are reordered
        Rule::new(Matcher::BareName(&CONFIG_NAMES), Category::Configuration),
    ]
}

/// Ordered-rule file classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    fallback: Category,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    /// Build a classifier from rules in priority order; unmatched names are `Other`
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fallback: Category::Other,
        }
    }

    /// Categorize a file by its base name
    pub fn classify(&self, file_name: &str) -> Category {
        let lower_name = file_name.to_lowercase();
        let extension = file_extension(file_name);

        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&lower_name, extension.as_deref()))
            .map(|rule| rule.category)
            .unwrap_or(self.fallback)
    }
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

/// Categorize a file name with the default rule table
pub fn classify(file_name: &str) -> Category {
    DEFAULT_CLASSIFIER.classify(file_name)
}
