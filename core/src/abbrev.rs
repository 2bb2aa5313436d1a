//! Deterministic short-alias assignment.
//!
//! Every parameter of a command gets at most one short alias. Assignment is a
//! pure function of the ordered parameter names, so regenerating a parser
//! from an unchanged signature always yields the same aliases.

/// Parameter name → short alias, scoped to one command.
///
/// The table is seeded with `help → h` before any parameter is considered.
/// For each name, candidates are tried in order:
///
/// 1. initials of the first 1, 2, … all underscore-separated segments;
/// 2. prefixes of the name with underscores removed, shortest first.
///
/// The first candidate not already taken is bound. Names starting with an
/// underscore never receive an alias.
///
/// # Examples
///
/// ```
/// use docargs_core::AbbreviationTable;
///
/// let table = AbbreviationTable::assign(["file_name", "force", "flag", "_hidden"]);
/// assert_eq!(table.get("help"), Some("h"));
/// assert_eq!(table.get("file_name"), Some("f"));
/// assert_eq!(table.get("force"), Some("fo"));
/// assert_eq!(table.get("flag"), Some("fl"));
/// assert_eq!(table.get("_hidden"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: Vec<(String, String)>,
}

impl AbbreviationTable {
    /// Name reserved for the built-in help option.
    pub const HELP: &'static str = "help";

    /// Assigns aliases for `names` in order.
    pub fn assign<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self {
            entries: vec![(Self::HELP.to_string(), "h".to_string())],
        };

        for name in names {
            let name = name.as_ref();
            if name.starts_with('_') || name.is_empty() {
                continue;
            }
            if let Some(alias) = candidates(name).find(|c| !table.is_taken(c)) {
                table.entries.push((name.to_string(), alias));
            }
        }

        table
    }

    /// Returns the alias bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, alias)| alias.as_str())
    }

    /// Returns `true` if `alias` is already bound.
    pub fn is_taken(&self, alias: &str) -> bool {
        self.entries.iter().any(|(_, a)| a == alias)
    }

    /// Iterates `(name, alias)` pairs in assignment order, `help` first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a.as_str()))
    }
}

fn candidates(name: &str) -> impl Iterator<Item = String> + '_ {
    let initials: Vec<char> = name
        .split('_')
        .filter_map(|segment| segment.chars().next())
        .collect();
    let by_initials = (1..=initials.len()).map(move |n| initials[..n].iter().collect::<String>());

    let compact: Vec<char> = name.chars().filter(|&ch| ch != '_').collect();
    let by_prefix = (1..=compact.len()).map(move |n| compact[..n].iter().collect::<String>());

    by_initials.chain(by_prefix)
}
