use shortly_core::Msg;

pub const HELP: &str = "\
Commands:
  url <text>      set the URL to shorten
  token <value>   hand over a verification token
  expire          drop the current verification token
  submit          shorten the URL
  login           sign in
  logout          sign out and clear everything
  history         reload your history
  show            print the current screen
  help            print this help
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Msg(Msg),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "url" => Command::Msg(Msg::InputChanged(rest.to_string())),
        "token" => Command::Msg(Msg::TokenAcquired(rest.to_string())),
        "expire" => Command::Msg(Msg::TokenExpired),
        "submit" => Command::Msg(Msg::SubmitClicked),
        "login" => Command::Msg(Msg::LoginClicked),
        "logout" => Command::Msg(Msg::LogoutClicked),
        "history" => Command::Msg(Msg::HistoryRequested),
        "" | "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_rest_of_line() {
        assert_eq!(
            parse_command("url   https://example.com/a b  "),
            Ok(Command::Msg(Msg::InputChanged(
                "https://example.com/a b".to_string()
            )))
        );
        assert_eq!(
            parse_command("url"),
            Ok(Command::Msg(Msg::InputChanged(String::new())))
        );
    }

    #[test]
    fn words_are_case_insensitive() {
        assert_eq!(parse_command("SUBMIT"), Ok(Command::Msg(Msg::SubmitClicked)));
        assert_eq!(parse_command(" Login "), Ok(Command::Msg(Msg::LoginClicked)));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn token_value_is_passed_verbatim() {
        assert_eq!(
            parse_command("token 03AFcWeA-x_y"),
            Ok(Command::Msg(Msg::TokenAcquired("03AFcWeA-x_y".to_string())))
        );
    }

    #[test]
    fn blank_line_redraws() {
        assert_eq!(parse_command("   "), Ok(Command::Show));
    }

    #[test]
    fn unknown_word_is_reported() {
        assert_eq!(
            parse_command("shorten it"),
            Err("unknown command `shorten`; type `help`".to_string())
        );
    }
}
