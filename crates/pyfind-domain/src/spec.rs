//! Structured form of a requested interpreter (`3.12`, `pypy3`, `python3.11-64`,
//! `/opt/python/bin/python3`, ...).

use std::fmt;
use std::path::{Path, PathBuf};

/// Whether names differing only by case resolve to different files.
const CASE_SENSITIVE_FS: bool = !cfg!(any(windows, target_os = "macos"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("python spec must not contain NUL bytes (got {spec:?})")]
    ContainsNul { spec: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PythonSpec {
    str_spec: String,
    implementation: Option<String>,
    major: Option<u64>,
    minor: Option<u64>,
    micro: Option<u64>,
    architecture: Option<u8>,
    path: Option<PathBuf>,
}

impl PythonSpec {
    /// Parses a raw identifier.
    ///
    /// Absolute paths are kept as paths. Anything else is matched against
    /// `<impl><version>-<arch>`; strings that do not fit are treated as a
    /// relative executable name.
    pub fn from_string_spec(raw: &str) -> Result<Self, SpecError> {
        if raw.contains('\0') {
            return Err(SpecError::ContainsNul {
                spec: raw.to_string(),
            });
        }
        let mut spec = Self {
            str_spec: raw.to_string(),
            implementation: None,
            major: None,
            minor: None,
            micro: None,
            architecture: None,
            path: None,
        };
        if Path::new(raw).is_absolute() {
            spec.path = Some(PathBuf::from(raw));
            return Ok(spec);
        }
        match Identifier::parse(raw) {
            Some(identifier) => {
                spec.implementation = identifier.implementation;
                (spec.major, spec.minor, spec.micro) = identifier.version;
                spec.architecture = identifier.architecture;
            }
            None => spec.path = Some(PathBuf::from(raw)),
        }
        Ok(spec)
    }

    pub fn str_spec(&self) -> &str {
        &self.str_spec
    }

    pub fn implementation(&self) -> Option<&str> {
        self.implementation.as_deref()
    }

    pub fn major(&self) -> Option<u64> {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn micro(&self) -> Option<u64> {
        self.micro
    }

    pub fn architecture(&self) -> Option<u8> {
        self.architecture
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_abs(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_absolute)
    }

    /// Requested version components up to the first unset one.
    pub fn version_prefix(&self) -> Vec<u64> {
        [self.major, self.minor, self.micro]
            .into_iter()
            .map_while(|part| part)
            .collect()
    }

    /// Executable names worth looking up on PATH, most specific first.
    ///
    /// The raw string comes first and is never implementation-checked. Names
    /// built from the requested implementation carry it in the file name, so
    /// they stay loose; the `python` alias can belong to any implementation
    /// and therefore requires an exact implementation match.
    pub fn candidate_names(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        let version = self.version_prefix();
        std::iter::once((self.str_spec.clone(), false)).chain(
            self.implementation_aliases()
                .into_iter()
                .flat_map(move |(alias, strict)| {
                    let version = version.clone();
                    (0..=version.len()).rev().map(move |at| {
                        let dotted = version[..at]
                            .iter()
                            .map(u64::to_string)
                            .collect::<Vec<_>>()
                            .join(".");
                        (format!("{alias}{dotted}"), strict)
                    })
                }),
        )
    }

    fn implementation_aliases(&self) -> Vec<(String, bool)> {
        let mut aliases: Vec<(String, bool)> = Vec::new();
        let mut push = |name: String, strict: bool| {
            if !aliases.iter().any(|(existing, _)| *existing == name) {
                aliases.push((name, strict));
            }
        };
        if let Some(implementation) = &self.implementation {
            push(implementation.clone(), false);
            if CASE_SENSITIVE_FS {
                push(implementation.to_lowercase(), false);
                push(implementation.to_uppercase(), false);
            }
        }
        push("python".to_string(), true);
        aliases
    }
}

impl fmt::Display for PythonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(implementation) = &self.implementation {
            fields.push(format!("implementation={implementation}"));
        }
        let version = self.version_prefix();
        if !version.is_empty() {
            let dotted = version
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(".");
            fields.push(format!("version={dotted}"));
        }
        if let Some(architecture) = self.architecture {
            fields.push(format!("architecture={architecture}"));
        }
        if let Some(path) = &self.path {
            fields.push(format!("path={}", path.display()));
        }
        write!(f, "PythonSpec({})", fields.join(", "))
    }
}

type VersionParts = (Option<u64>, Option<u64>, Option<u64>);

struct Identifier {
    implementation: Option<String>,
    version: VersionParts,
    architecture: Option<u8>,
}

impl Identifier {
    fn parse(raw: &str) -> Option<Self> {
        let (body, architecture) = match raw.rsplit_once('-') {
            Some((body, "32")) => (body, Some(32)),
            Some((body, "64")) => (body, Some(64)),
            Some(_) => return None,
            None => (raw, None),
        };
        let split = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (name, version) = body.split_at(split);
        if !version.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let version = if version.is_empty() {
            (None, None, None)
        } else {
            parse_version(version)?
        };
        let implementation = match name {
            "" => None,
            "py" | "python" => Some("CPython".to_string()),
            other => Some(other.to_string()),
        };
        Some(Self {
            implementation,
            version,
            architecture,
        })
    }
}

fn parse_version(text: &str) -> Option<VersionParts> {
    let parts = text
        .split('.')
        .filter(|piece| !piece.is_empty())
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match parts.as_slice() {
        [] => Some((None, None, None)),
        // `38` means 3.8 and `310` means 3.10: the first digit is the major.
        [packed] => {
            let digits = packed.to_string();
            let major = digits[..1].parse().ok()?;
            let minor = if *packed > 9 {
                Some(digits[1..].parse().ok()?)
            } else {
                None
            };
            Some((Some(major), minor, None))
        }
        [major, minor] => Some((Some(*major), Some(*minor), None)),
        [major, minor, micro] => Some((Some(*major), Some(*minor), Some(*micro))),
        _ => None,
    }
}
