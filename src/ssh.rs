use std::{
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use log::{debug, info};

use crate::{
    cli::SshArgs,
    config::Settings,
    error::{AppError, AppResult},
    exec::{CommandRunner, CommandSpec},
    menu,
};

const AUTH_SOCK: &str = "SSH_AUTH_SOCK";
const AGENT_PID: &str = "SSH_AGENT_PID";

/// Entry name prefixes in the SSH directory that are never identities
const SKIPPED_PREFIXES: [&str; 3] = ["known_hosts", "authorized_keys", "agent"];
/// Exact entry names that are never identities
const SKIPPED_NAMES: [&str; 1] = ["config"];

/// Connection details of a freshly started agent, handed to child processes
/// instead of being written into this process's environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEnv {
    pub auth_sock: String,
    pub agent_pid: Option<String>,
}

impl AgentEnv {
    /// Pairs to set on a child that should talk to this agent
    pub fn vars(&self) -> Vec<(&'static str, &str)> {
        let mut vars = vec![(AUTH_SOCK, self.auth_sock.as_str())];
        if let Some(pid) = &self.agent_pid {
            vars.push((AGENT_PID, pid.as_str()));
        }
        vars
    }

    /// Shell lines a caller can `eval` to reuse the agent
    pub fn exports(&self) -> String {
        self.vars()
            .into_iter()
            .map(|(key, value)| format!("export {key}={value};\n"))
            .collect()
    }
}

/// Parses the Bourne shell output of `ssh-agent -s`
///
/// Expected lines look like `SSH_AUTH_SOCK=/tmp/ssh-X/agent.1; export SSH_AUTH_SOCK;`.
pub fn parse_agent_output(output: &str) -> AppResult<AgentEnv> {
    let mut auth_sock = None;
    let mut agent_pid = None;

    for line in output.lines() {
        let Some(assignment) = line.split(';').next() else {
            continue;
        };
        let Some((key, value)) = assignment.trim().split_once('=') else {
            continue;
        };
        match key {
            AUTH_SOCK => auth_sock = Some(value.to_string()),
            AGENT_PID => agent_pid = Some(value.to_string()),
            _ => {}
        }
    }

    let auth_sock = auth_sock
        .filter(|sock| !sock.is_empty())
        .ok_or_else(|| AppError::Command {
            program: "ssh-agent".to_string(),
            stderr: format!("output did not contain {AUTH_SOCK}"),
        })?;

    Ok(AgentEnv {
        auth_sock,
        agent_pid,
    })
}

fn is_identity_candidate(name: &str) -> bool {
    !name.starts_with('.')
        && !name.ends_with(".pub")
        && !SKIPPED_NAMES.contains(&name)
        && !SKIPPED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Lists identity file names in `dir`, sorted
pub fn list_identities(dir: &Path) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_identity_candidate(&name) {
            names.push(name);
        }
    }
    names.sort();
    debug!("found {} identities in {}", names.len(), dir.display());
    Ok(names)
}

/// Matches the requested identity exactly against the listed ones
pub fn find_identity<'a>(identities: &'a [String], requested: Option<&str>) -> Option<&'a str> {
    let requested = requested?.trim();
    identities
        .iter()
        .map(String::as_str)
        .find(|name| *name == requested)
}

/// Starts a new agent and returns how to reach it
pub fn start_agent(runner: &impl CommandRunner) -> AppResult<AgentEnv> {
    let stdout = runner.run(&CommandSpec::new("ssh-agent").arg("-s"))?;
    let agent = parse_agent_output(&stdout)?;
    info!("ssh-agent listening on {}", agent.auth_sock);
    Ok(agent)
}

/// Builds the `ssh-add` call aimed at `agent`
pub fn add_identity_command(agent: &AgentEnv, identity: &Path) -> CommandSpec {
    let mut spec = CommandSpec::new("ssh-add")
        .arg(identity.to_string_lossy())
        .inherit_stdin();
    for (key, value) in agent.vars() {
        spec = spec.env(key, value);
    }
    spec
}

/// Adds `identity` to the agent
pub fn add_identity(runner: &impl CommandRunner, agent: &AgentEnv, identity: &Path) -> AppResult<()> {
    runner.run(&add_identity_command(agent, identity))?;
    Ok(())
}

/// Runs `credkit ssh`: pick an identity, start an agent, add the identity
pub fn select_and_add(runner: &impl CommandRunner, settings: &Settings, args: &SshArgs) -> AppResult<()> {
    let dir: PathBuf = match &args.dir {
        Some(dir) => dir.clone(),
        None => settings.ssh_dir()?,
    };

    let identities = list_identities(&dir)?;
    if identities.is_empty() {
        return Err(AppError::Validation(format!(
            "no identities found in {}",
            dir.display()
        )));
    }

    let identity = match find_identity(&identities, args.identity.as_deref()) {
        Some(name) => name.to_string(),
        None => {
            if let Some(requested) = &args.identity {
                eprintln!("{} {}", "no identity named".yellow(), requested);
            }
            match menu::select_identity(&identities) {
                Ok(name) => name,
                Err(AppError::Canceled) => {
                    eprintln!("{}", "Exiting...".yellow());
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    };

    let agent = start_agent(runner)?;
    add_identity(runner, &agent, &dir.join(&identity))?;

    if args.print_env {
        print!("{}", agent.exports());
        eprintln!("{} {}", "Identity added:".green(), identity);
    } else {
        println!("{} {}", "Identity added:".green(), identity);
    }
    Ok(())
}
