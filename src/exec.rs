use std::process::{Command, Output, Stdio};

use log::debug;

use crate::error::{AppError, AppResult};

/// A single external program invocation
///
/// Environment is passed explicitly per invocation; nothing here touches the
/// environment of the current process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, looked up on `PATH`
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
    /// Variables set for the child only
    pub envs: Vec<(String, String)>,
    /// Variables removed from the child's inherited environment
    pub removed_envs: Vec<String>,
    /// Hand the terminal's stdin to the child (passphrase prompts)
    pub inherit_stdin: bool,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.push((key.to_string(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: &str) -> Self {
        self.removed_envs.push(key.to_string());
        self
    }

    pub fn inherit_stdin(mut self) -> Self {
        self.inherit_stdin = true;
        self
    }
}

/// Runs external programs and returns their captured stdout
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> AppResult<String>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> AppResult<String> {
        // only keys are logged; values may be secrets
        let env_keys: Vec<&str> = spec.envs.iter().map(|(key, _)| key.as_str()).collect();
        debug!("running {} {:?} (env: {:?})", spec.program, spec.args, env_keys);

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        for key in &spec.removed_envs {
            command.env_remove(key);
        }
        command.envs(spec.envs.iter().map(|(key, value)| (key, value)));
        if spec.inherit_stdin {
            command.stdin(Stdio::inherit());
        }

        let output: Output = command.output().map_err(|source| AppError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(AppError::Command {
                program: spec.program.clone(),
                stderr: failure_message(&output),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Trimmed stderr, or the exit status when the program printed nothing
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    }
}

/// Runner that replays canned replies and records what it was asked to run
#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{CommandRunner, CommandSpec};
    use crate::error::{AppError, AppResult};

    #[derive(Default)]
    pub struct ScriptedRunner {
        replies: RefCell<VecDeque<AppResult<String>>>,
        pub calls: RefCell<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: RefCell::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                calls: RefCell::default(),
            }
        }

        pub fn failing(program: &str, stderr: &str) -> Self {
            let runner = Self::default();
            runner.replies.borrow_mut().push_back(Err(AppError::Command {
                program: program.to_string(),
                stderr: stderr.to_string(),
            }));
            runner
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, spec: &CommandSpec) -> AppResult<String> {
            self.calls.borrow_mut().push(spec.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected command: {}", spec.program))
        }
    }
}
