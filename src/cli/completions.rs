//! Shell completion scripts

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, IsTerminal, Write};

use crate::cli::Cli;

const BIN_NAME: &str = "azprov";

/// Writes the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

/// Where to put the script for each shell.
pub fn install_hint(shell: Shell) -> Option<String> {
    let hint = match shell {
        Shell::Bash => format!(
            "azprov completions bash > ~/.local/share/bash-completion/completions/{BIN_NAME}"
        ),
        Shell::Zsh => format!(
            "azprov completions zsh > ~/.zsh/completions/_{BIN_NAME}  (the directory must be on $fpath)"
        ),
        Shell::Fish => format!(
            "azprov completions fish > ~/.config/fish/completions/{BIN_NAME}.fish"
        ),
        Shell::PowerShell => {
            "Invoke-Expression (& azprov completions powershell | Out-String)  # in $PROFILE"
                .to_string()
        }
        Shell::Elvish => "eval (azprov completions elvish | slurp)  # in ~/.elvish/rc.elv".to_string(),
        _ => return None,
    };
    Some(hint)
}

/// Prints the script on stdout. When stdout is a terminal an install hint
/// goes to stderr as well.
pub fn print_completions(shell: Shell) {
    write_completions(shell, &mut io::stdout());
    if io::stdout().is_terminal() {
        if let Some(hint) = install_hint(shell) {
            eprintln!("# To install: {}", hint);
        }
    }
}
