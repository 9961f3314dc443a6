use teloxide::utils::command::BotCommands;

/// Entries shown in Telegram's command menu.
///
/// Parsing of incoming commands is done by the engine's dispatcher; this
/// enum only feeds `setMyCommands`.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase")]
pub enum MenuCommand {
    #[command(description = "get a message whenever a new chapter is out")]
    Start,
    #[command(description = "stop chapter notifications")]
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_start_and_stop() {
        let names: Vec<String> = MenuCommand::bot_commands()
            .into_iter()
            .map(|c| c.command.trim_start_matches('/').to_string())
            .collect();
        assert_eq!(names, vec!["start", "stop"]);
    }
}
