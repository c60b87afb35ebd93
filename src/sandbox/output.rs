/// Bounded output collection
///
/// Child stdout/stderr are drained on dedicated threads with per-stream
/// byte caps, so runaway output cannot blow up memory. Past the cap the
/// reader keeps draining and discarding; a full pipe would otherwise
/// block the child and turn every noisy program into a timeout.
use std::io::Read;
use std::thread::{self, JoinHandle};

/// Byte caps for captured output.
#[derive(Debug, Clone)]
pub struct OutputLimits {
    pub stdout_limit: usize,
    pub stderr_limit: usize,
    pub combined_limit: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        OutputLimits {
            stdout_limit: 1024 * 1024,
            stderr_limit: 256 * 1024,
            combined_limit: 1024 * 1024,
        }
    }
}

/// Captured streams after the child exited.
#[derive(Debug, Clone, Default)]
pub struct CollectedOutput {
    pub stdout: String,
    pub stderr: String,
    /// True when any cap cut the captured data short.
    pub truncated: bool,
}

pub struct StreamHandle {
    handle: JoinHandle<(Vec<u8>, bool)>,
}

/// Start draining one stream up to `limit` captured bytes.
pub fn spawn_collector<R: Read + Send + 'static>(stream: R, limit: usize) -> StreamHandle {
    let handle = thread::spawn(move || collect_stream(stream, limit));
    StreamHandle { handle }
}

fn collect_stream<R: Read>(mut stream: R, limit: usize) -> (Vec<u8>, bool) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if truncated {
                    continue;
                }
                if buffer.len() + n > limit {
                    let remaining = limit - buffer.len();
                    buffer.extend_from_slice(&chunk[..remaining]);
                    truncated = true;
                } else {
                    buffer.extend_from_slice(&chunk[..n]);
                }
            }
            // Read errors end collection; whatever arrived is kept.
            Err(_) => break,
        }
    }

    (buffer, truncated)
}

/// Join both collectors and apply the combined cap, preferring stdout.
pub fn finish(
    stdout: Option<StreamHandle>,
    stderr: Option<StreamHandle>,
    limits: &OutputLimits,
) -> CollectedOutput {
    let (mut stdout_data, stdout_truncated) = join_stream(stdout);
    let (mut stderr_data, stderr_truncated) = join_stream(stderr);
    let mut truncated = stdout_truncated || stderr_truncated;

    if stdout_data.len() + stderr_data.len() > limits.combined_limit {
        truncated = true;
        if stdout_data.len() > limits.combined_limit {
            stdout_data.truncate(limits.combined_limit);
            stderr_data.clear();
        } else {
            let remaining = limits.combined_limit - stdout_data.len();
            stderr_data.truncate(remaining);
        }
    }

    CollectedOutput {
        stdout: String::from_utf8_lossy(&stdout_data).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_data).into_owned(),
        truncated,
    }
}

fn join_stream(handle: Option<StreamHandle>) -> (Vec<u8>, bool) {
    match handle {
        Some(h) => match h.handle.join() {
            Ok(result) => result,
            Err(_) => {
                log::warn!("output collector thread panicked");
                (Vec::new(), true)
            }
        },
        None => (Vec::new(), false),
    }
}
