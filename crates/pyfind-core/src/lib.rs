#![deny(clippy::all)]

mod core;

pub(crate) use crate::core::config;
pub(crate) use crate::core::discovery;
pub(crate) use crate::core::python::{launcher, python_sys};
pub(crate) use crate::core::runtime::{effects, process};

pub use crate::core::config::context::CommandContext;
pub use crate::core::config::{DiscoveryConfig, EnvSnapshot, GlobalOptions};
pub use crate::core::discovery::{
    check_path, get_interpreter, get_paths, propose_interpreters, select_interpreter, Discovery,
    Proposal, Proposer,
};
pub use crate::launcher::{parse_launcher_listing, PyLauncher};
pub use crate::core::python::python_cli::{
    python_candidates, python_find, python_info, PythonCandidatesRequest, PythonFindRequest,
    PythonInfoRequest,
};
pub use crate::core::python::python_sys::{inspect_python, InspectError, SystemPythonRuntime};
pub use crate::core::runtime::effects::{
    Effects, ExtraCandidates, NoExtraCandidates, PythonRuntime, SharedEffects, SystemEffects,
};
pub use crate::core::runtime::process::{ProcessError, RunOutput};
pub use crate::core::tooling::outcome::{
    format_status_message, to_json_response, CommandStatus, ExecutionOutcome,
};

pub use pyfind_domain::{PythonInfo, PythonSpec, SpecError, VersionInfo};
