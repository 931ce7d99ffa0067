//! Browser target parsing and name normalisation.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Lowercased shorthand → canonical display name.
const ALIASES: &[(&str, &str)] = &[
    ("ie", "Internet Explorer"),
    ("explorer", "Internet Explorer"),
    ("internet explorer", "Internet Explorer"),
    ("edge", "Edge"),
    ("ff", "Firefox"),
    ("firefox", "Firefox"),
    ("chrome", "Chrome"),
    ("safari", "Safari"),
    ("opera", "Opera"),
    ("ios", "iOS Safari"),
    ("ios_saf", "iOS Safari"),
    ("ios safari", "iOS Safari"),
    ("op_mini", "Opera Mini"),
    ("opera mini", "Opera Mini"),
    ("android", "Android Browser"),
    ("android browser", "Android Browser"),
    ("and_chr", "Chrome for Android"),
    ("chromeandroid", "Chrome for Android"),
    ("chrome for android", "Chrome for Android"),
    ("and_ff", "Firefox for Android"),
    ("firefoxandroid", "Firefox for Android"),
    ("firefox for android", "Firefox for Android"),
    ("samsung", "Samsung Internet"),
    ("samsung internet", "Samsung Internet"),
    ("node", "Node.js"),
    ("nodejs", "Node.js"),
    ("node.js", "Node.js"),
];

static ALIAS_MAP: OnceLock<FxHashMap<&'static str, &'static str>> = OnceLock::new();
static ENTRY_RE: OnceLock<Regex> = OnceLock::new();

fn alias_map() -> &'static FxHashMap<&'static str, &'static str> {
    ALIAS_MAP.get_or_init(|| ALIASES.iter().copied().collect())
}

fn entry_re() -> &'static Regex {
    ENTRY_RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<name>\S.*?)\s+(?P<version>\d+(?:\.\d+)*)\s*$")
            .expect("browser entry pattern is valid")
    })
}

/// Maps a user-supplied browser name to its display form. Unknown names are
/// returned as given.
pub fn canonical_name(name: &str) -> String {
    let key = name.trim().to_lowercase();
    match alias_map().get(key.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => name.trim().to_string(),
    }
}

/// A dotted numeric version. Missing trailing components compare as zero.
#[derive(Clone, Debug, Default)]
pub struct Version(Vec<u32>);

impl Version {
    pub fn parse(s: &str) -> Option<Version> {
        s.split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Version)
    }

    fn component(&self, i: usize) -> u32 {
        self.0.get(i).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// A configured runtime environment, e.g. `Safari 15`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserTarget {
    /// Canonical name when the alias table knows it, otherwise as written.
    pub display_name: String,
    /// Version exactly as written.
    pub version: String,
    parsed: Version,
}

impl BrowserTarget {
    /// Parses one `"<name> <version>"` entry. Returns `None` when the entry
    /// has no separable name and numeric version.
    pub fn parse(entry: &str) -> Option<BrowserTarget> {
        let caps = entry_re().captures(entry)?;
        let version = caps["version"].to_string();
        let parsed = Version::parse(&version)?;
        Some(BrowserTarget {
            display_name: canonical_name(&caps["name"]),
            version,
            parsed,
        })
    }

    /// Key used for dataset lookup.
    pub fn family(&self) -> String {
        self.display_name.to_lowercase()
    }

    pub fn parsed_version(&self) -> &Version {
        &self.parsed
    }
}

impl fmt::Display for BrowserTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_name, self.version)
    }
}

/// Parses a comma-separated target list, dropping malformed entries.
pub fn parse_target_list(list: &str) -> Vec<BrowserTarget> {
    list.split(',').filter_map(BrowserTarget::parse).collect()
}
