use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    installer completions bash > ~/.bash_completion.d/installer\n\n\
                  Generate zsh completions:\n    installer completions zsh > ~/.zfunc/_installer\n\n\
                  Generate fish completions:\n    installer completions fish > ~/.config/fish/completions/installer.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
