use std::collections::HashSet;
use std::iter::Enumerate;
use std::mem;
use std::path::PathBuf;
use std::vec::IntoIter;

use pyfind_domain::{PythonInfo, PythonSpec};
use tracing::debug;

use super::paths::{get_paths, PathDump};
use super::probe::check_path;
use crate::config::DiscoveryConfig;
use crate::effects::{ExtraCandidates, PythonRuntime};
use crate::python_sys::absolute;

type Names<'a> = Box<dyn Iterator<Item = (String, bool)> + 'a>;
type Extras<'a> = Box<dyn Iterator<Item = PythonInfo> + 'a>;

/// Lazily proposes `(interpreter, impl_must_match)` pairs in priority order:
/// the current interpreter, an absolute-path spec, platform extras, then every
/// candidate name in every PATH directory.
///
/// Nothing is probed or inspected until the next pair is pulled, and an
/// executable already proposed by this iterator is never inspected again.
pub struct Proposer<'a> {
    spec: &'a PythonSpec,
    runtime: &'a dyn PythonRuntime,
    extras: &'a dyn ExtraCandidates,
    config: &'a DiscoveryConfig,
    stage: Stage<'a>,
    tested: HashSet<PathBuf>,
}

enum Stage<'a> {
    Current,
    Absolute,
    Extras(Extras<'a>),
    Scan(PathScan<'a>),
    Done,
}

/// Entry point for the proposal stream of one discovery call.
pub fn propose_interpreters<'a>(
    spec: &'a PythonSpec,
    runtime: &'a dyn PythonRuntime,
    extras: &'a dyn ExtraCandidates,
    config: &'a DiscoveryConfig,
) -> Proposer<'a> {
    Proposer {
        spec,
        runtime,
        extras,
        config,
        stage: Stage::Current,
        tested: HashSet::new(),
    }
}

impl Proposer<'_> {
    fn found(&mut self, info: PythonInfo, impl_must_match: bool) -> (PythonInfo, bool) {
        self.tested.insert(info.original_executable.clone());
        self.tested.insert(info.executable.clone());
        (info, impl_must_match)
    }

    fn absolute_candidate(&self) -> Option<PythonInfo> {
        if !self.spec.is_abs() {
            return None;
        }
        let path = self.spec.path()?;
        if !path.exists() {
            return None;
        }
        self.runtime.inspect(path, self.config)
    }
}

impl Iterator for Proposer<'_> {
    type Item = (PythonInfo, bool);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.stage, Stage::Done) {
                Stage::Current => {
                    self.stage = Stage::Absolute;
                    if let Some(info) = self.runtime.current(self.config) {
                        return Some(self.found(info, true));
                    }
                }
                Stage::Absolute => {
                    let extras = self.extras;
                    self.stage = Stage::Extras(extras.propose(self.spec, self.runtime, self.config));
                    if let Some(info) = self.absolute_candidate() {
                        return Some(self.found(info, true));
                    }
                }
                Stage::Extras(mut extras) => {
                    if let Some(info) = extras.next() {
                        self.stage = Stage::Extras(extras);
                        return Some(self.found(info, true));
                    }
                    self.stage = Stage::Scan(PathScan::new(self.spec, self.config));
                }
                Stage::Scan(mut scan) => {
                    loop {
                        let Some((exe, impl_must_match)) = scan.next() else {
                            break;
                        };
                        if !self.tested.insert(exe.clone()) {
                            continue;
                        }
                        if let Some(info) = self.runtime.inspect(&exe, self.config) {
                            self.stage = Stage::Scan(scan);
                            return Some(self.found(info, impl_must_match));
                        }
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

/// PATH directories crossed with candidate names; yields absolute paths of
/// files that exist. Directories are the outer loop.
struct PathScan<'a> {
    spec: &'a PythonSpec,
    dirs: Enumerate<IntoIter<PathBuf>>,
    current: Option<(PathBuf, Names<'a>)>,
    list_contents: bool,
}

impl<'a> PathScan<'a> {
    fn new(spec: &'a PythonSpec, config: &DiscoveryConfig) -> Self {
        Self {
            spec,
            dirs: get_paths(config).into_iter().enumerate(),
            current: None,
            list_contents: config.debug_listing(),
        }
    }
}

impl Iterator for PathScan<'_> {
    type Item = (PathBuf, bool);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((dir, names)) = &mut self.current {
                for (name, impl_must_match) in names.by_ref() {
                    if let Some(found) = check_path(&name, dir) {
                        return Some((absolute(&found), impl_must_match));
                    }
                }
            }
            let (pos, dir) = self.dirs.next()?;
            debug!("{}", PathDump::new(pos, &dir, self.list_contents));
            self.current = Some((dir, Box::new(self.spec.candidate_names())));
        }
    }
}
