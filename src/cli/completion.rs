// src/cli/completion.rs
use crate::cli::args::Cli;
use clap::CommandFactory;
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use std::io;
use tracing::{debug, instrument};

/// Generates a shell completion script to stdout. `shell` is one of
/// "bash", "zsh" or "fish" (case-insensitive).
#[instrument(level = "debug")]
pub fn generate_completion(shell: &str) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell.to_lowercase().as_str() {
        "bash" => {
            debug!("generating bash completion");
            generate(Bash, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
        "zsh" => {
            debug!("generating zsh completion");
            generate(Zsh, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
        "fish" => {
            debug!("generating fish completion");
            generate(Fish, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported shell: {} (supported: bash, zsh, fish)", shell),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bash_when_generate_completion_then_succeeds() {
        assert!(generate_completion("bash").is_ok());
    }

    #[test]
    fn given_unknown_shell_when_generate_completion_then_error() {
        let result = generate_completion("powershell");
        assert!(result.is_err());
    }
}
