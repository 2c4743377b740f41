use std::{
    io::{self, Read},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const MAX_CAPTURE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        source: io::Error,
    },
    #[error("failed to read output of {program}: {source}")]
    Capture {
        program: String,
        source: io::Error,
    },
    #[error("{program} did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

type Capture = JoinHandle<io::Result<(String, bool)>>;

/// Execute a program with a deadline and capture stdout/stderr.
///
/// Both pipes are drained on reader threads while the child is polled from
/// the calling thread. When the deadline passes the child is killed and
/// reaped. Each stream keeps at most 1 MiB.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned, cannot be waited on,
/// its output cannot be read, or it outlives `timeout`.
pub fn run_command_with_timeout(
    program: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<RunOutput, ProcessError> {
    let display = program.display().to_string();
    let mut child = spawn(program, args).map_err(|source| ProcessError::Spawn {
        program: display.clone(),
        source,
    })?;
    let stdout = child.stdout.take().map(capture);
    let stderr = child.stderr.take().map(capture);

    let deadline = Instant::now() + timeout;
    let status: ExitStatus = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::TimedOut {
                    program: display,
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::Wait {
                    program: display,
                    source,
                });
            }
        }
    };

    let stdout = collect(stdout, &display)?;
    let stderr = collect(stderr, &display)?;
    Ok(RunOutput {
        code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

fn spawn(program: &Path, args: &[&str]) -> io::Result<Child> {
    let mut attempts = 0;
    loop {
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        match result {
            // ETXTBSY: a freshly written script can still be held open for
            // writing by a concurrently forked child.
            Err(err) if err.raw_os_error() == Some(26) && cfg!(unix) && attempts < 5 => {
                attempts += 1;
                thread::sleep(POLL_INTERVAL);
            }
            other => return other,
        }
    }
}

fn capture(reader: impl Read + Send + 'static) -> Capture {
    thread::spawn(move || read_to_string_limited(reader, MAX_CAPTURE_BYTES))
}

fn collect(handle: Option<Capture>, program: &str) -> Result<String, ProcessError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let (mut text, truncated) = handle
        .join()
        .map_err(|_| io::Error::other("output reader panicked"))
        .and_then(|result| result)
        .map_err(|source| ProcessError::Capture {
            program: program.to_string(),
            source,
        })?;
    if truncated {
        text.push_str("\n[...truncated...]\n");
    }
    Ok(text)
}

/// Reads `reader` to the end, keeping only the first `limit` bytes.
fn read_to_string_limited(mut reader: impl Read, limit: usize) -> io::Result<(String, bool)> {
    let mut buffer = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        let room = limit.saturating_sub(buffer.len());
        if read > room {
            truncated = true;
        }
        buffer.extend_from_slice(&chunk[..read.min(room)]);
    }
    Ok((String::from_utf8_lossy(&buffer).into_owned(), truncated))
}
