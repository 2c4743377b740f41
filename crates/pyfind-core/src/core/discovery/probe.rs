use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Looks for `candidate` as a file, first as given (relative to the working
/// directory or absolute), then inside `dir`.
///
/// On Windows a missing `.exe` suffix is added before looking.
pub fn check_path(candidate: &str, dir: &Path) -> Option<PathBuf> {
    if candidate.is_empty() {
        return None;
    }
    let candidate = with_exe_suffix(candidate);
    let direct = Path::new(&*candidate);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }
    let joined = dir.join(direct);
    joined.is_file().then_some(joined)
}

fn with_exe_suffix(candidate: &str) -> Cow<'_, str> {
    let has_suffix = Path::new(candidate)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));
    if cfg!(windows) && !has_suffix {
        Cow::Owned(format!("{candidate}.exe"))
    } else {
        Cow::Borrowed(candidate)
    }
}
