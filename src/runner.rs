//! External command execution
//!
//! Every probe and action that shells out goes through here. Commands are
//! always an explicit program plus argument vector - values from the
//! settings file are never interpolated into a shell string. Each command
//! runs under a bounded timeout; expiry kills the child and surfaces as an
//! error. Exit codes are preserved verbatim.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from running an external command
#[derive(Debug, Error)]
pub enum CmdError {
    /// The program could not be spawned at all
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero
    #[error("{program} exited with code {code}: {stderr}")]
    NonZero {
        program: String,
        /// Exit code reported by the OS
        code: i32,
        stderr: String,
    },

    /// The program was terminated by a signal (no exit code)
    #[error("{program} was terminated by a signal: {stderr}")]
    Signaled { program: String, stderr: String },

    /// The program exceeded the per-command timeout and was killed
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
}

/// Result type for command execution
pub type Result<T> = std::result::Result<T, CmdError>;

/// A command to run: program, argument vector, environment, user
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    run_as: Option<String>,
}

impl Cmd {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            envs: Vec::new(),
            run_as: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Run the command as another user via `sudo -u <user> --`
    pub fn as_user(mut self, user: &str) -> Self {
        self.run_as = Some(user.to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The effective program + argument vector, run_as prefix included
    fn build(&self) -> (String, Vec<String>) {
        match &self.run_as {
            None => (self.program.clone(), self.args.clone()),
            Some(user) => {
                let mut args = vec![
                    "-u".to_string(),
                    user.clone(),
                    "--".to_string(),
                    self.program.clone(),
                ];
                args.extend(self.args.iter().cloned());
                ("sudo".to_string(), args)
            }
        }
    }

    /// Rendering for log lines only; never handed to a shell
    pub fn display(&self) -> String {
        let (program, args) = self.build();
        if args.is_empty() {
            program
        } else {
            format!("{} {}", program, args.join(" "))
        }
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// Stdout with surrounding whitespace removed
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runs commands with a shared per-command timeout
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    timeout: Duration,
}

impl Runner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run and capture output without checking the exit status
    ///
    /// Probes use this: a non-zero exit is an answer, not an error.
    pub fn output(&self, cmd: &Cmd) -> Result<CmdOutput> {
        let (program, args) = cmd.build();

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &cmd.envs {
            command.env(key, value);
        }

        let child = command.spawn().map_err(|source| CmdError::Spawn {
            program: program.clone(),
            source,
        })?;

        self.wait_bounded(child, &program)
    }

    /// Run and fail on non-zero exit
    ///
    /// Actions use this; the external exit code survives verbatim in the
    /// error.
    pub fn run(&self, cmd: &Cmd) -> Result<CmdOutput> {
        let output = self.output(cmd)?;

        if output.success {
            log::debug!("ok: {}", cmd.display());
            return Ok(output);
        }

        let program = cmd.program().to_string();
        let stderr = output.stderr.trim().to_string();
        match output.code {
            Some(code) => Err(CmdError::NonZero {
                program,
                code,
                stderr,
            }),
            None => Err(CmdError::Signaled { program, stderr }),
        }
    }

    /// Run quietly, reporting only success/failure
    pub fn succeeds(&self, cmd: &Cmd) -> bool {
        self.output(cmd).map(|o| o.success).unwrap_or(false)
    }

    /// Poll the child until exit or deadline; kill on expiry
    fn wait_bounded(&self, mut child: Child, program: &str) -> Result<CmdOutput> {
        // Drain both pipes on threads so a chatty child can't fill the
        // pipe buffer and deadlock against our polling loop.
        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(CmdError::Timeout {
                            program: program.to_string(),
                            seconds: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                Err(source) => {
                    return Err(CmdError::Spawn {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(CmdOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Check if a command exists on $PATH
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
