//! Zsh run-control template (`~<user>/.zshrc`)
//!
//! Assembles framework bootstrap, history settings, aliases and
//! keybindings, ending with a conditional source of the operator's local
//! override file so per-machine tweaks survive re-provisioning.

use super::managed_banner;
use crate::config::{Settings, ShellFramework};

pub fn zshrc(settings: &Settings) -> String {
    let shell = &settings.shell;
    let mut out = managed_banner("#");
    out.push('\n');

    match shell.framework {
        ShellFramework::Prezto => {
            out.push_str(
                "if [[ -s \"${ZDOTDIR:-$HOME}/.zprezto/init.zsh\" ]]; then\n\
                 \x20 source \"${ZDOTDIR:-$HOME}/.zprezto/init.zsh\"\n\
                 fi\n",
            );
        }
        ShellFramework::Antigen => {
            out.push_str(
                "source \"$HOME/.antigen/antigen.zsh\"\n\
                 antigen use oh-my-zsh\n\
                 antigen bundle git\n\
                 antigen bundle zsh-users/zsh-syntax-highlighting\n\
                 antigen bundle zsh-users/zsh-autosuggestions\n\
                 antigen theme romkatv/powerlevel10k\n\
                 antigen apply\n",
            );
        }
    }

    out.push_str(&format!(
        "\n\
         HISTFILE=\"$HOME/.zsh_history\"\n\
         HISTSIZE={size}\n\
         SAVEHIST={size}\n\
         setopt INC_APPEND_HISTORY SHARE_HISTORY HIST_IGNORE_DUPS\n",
        size = shell.history_size,
    ));

    out.push_str(
        "\n\
         alias ll='ls -lah'\n\
         alias la='ls -A'\n\
         alias gs='git status'\n\
         alias gd='git diff'\n\
         alias ..='cd ..'\n",
    );

    out.push_str(
        "\n\
         bindkey -e\n\
         bindkey '^[[A' history-search-backward\n\
         bindkey '^[[B' history-search-forward\n",
    );

    out.push_str("\n[[ -f \"$HOME/.zshrc.local\" ]] && source \"$HOME/.zshrc.local\"\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prezto_bootstrap() {
        let rc = zshrc(&Settings::default());
        assert!(rc.contains(".zprezto/init.zsh"));
        assert!(!rc.contains("antigen"));
    }

    #[test]
    fn test_antigen_bootstrap() {
        let mut settings = Settings::default();
        settings.shell.framework = ShellFramework::Antigen;

        let rc = zshrc(&settings);
        assert!(rc.contains("source \"$HOME/.antigen/antigen.zsh\""));
        assert!(rc.contains("antigen apply"));
        assert!(!rc.contains(".zprezto"));
    }

    #[test]
    fn test_history_size() {
        let mut settings = Settings::default();
        settings.shell.history_size = 12_345;

        let rc = zshrc(&settings);
        assert!(rc.contains("HISTSIZE=12345\n"));
        assert!(rc.contains("SAVEHIST=12345\n"));
    }

    #[test]
    fn test_local_override_is_last_line() {
        let rc = zshrc(&Settings::default());
        assert_eq!(
            rc.lines().last().unwrap(),
            "[[ -f \"$HOME/.zshrc.local\" ]] && source \"$HOME/.zshrc.local\""
        );
    }
}
