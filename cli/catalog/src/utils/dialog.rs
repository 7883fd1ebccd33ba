use std::fmt::Display;
use std::io::IsTerminal;

use inquire::ui::{Attributes, RenderConfig, StyleSheet, Styled};

#[derive(Clone)]
pub struct Select<T> {
    pub options: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

struct Choice(usize, String);
impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.1.fmt(f)
    }
}

impl<T: Display> Dialog<'_, Select<T>> {
    /// Let the user pick one of the options.
    ///
    /// The prompt blocks, so it runs on tokio's blocking pool.
    pub async fn prompt(self) -> inquire::error::InquireResult<T> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);
        let mut options = self.typed.options;

        let choices = options
            .iter()
            .map(ToString::to_string)
            .enumerate()
            .map(|(id, value)| Choice(id, value))
            .collect();

        let joined = tokio::task::spawn_blocking(move || {
            let mut render_config = RenderConfig::default_colored();
            render_config.answered_prompt_prefix = Styled::new(">");
            render_config.highlighted_option_prefix = Styled::new(">");
            render_config.prompt = StyleSheet::new().with_attr(Attributes::BOLD);

            let mut dialog = inquire::Select::new(&message, choices).with_render_config(render_config);

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await;

        let Choice(id, _) = match joined {
            Ok(answer) => answer?,
            Err(err) => return Err(inquire::InquireError::Custom(Box::new(err))),
        };

        Ok(options.remove(id))
    }
}

impl Dialog<'_, ()> {
    /// Whether stdin and stderr are attached to a terminal.
    pub fn can_prompt() -> bool {
        std::io::stderr().is_terminal() && std::io::stdin().is_terminal()
    }
}
