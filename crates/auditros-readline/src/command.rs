use std::path::PathBuf;

/// Slash commands with their usage line, in `/help` order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/section", "/section [name]      switch audit module (lists modules without a name)"),
    ("/mode", "/mode [name]         set generation mode: fast, search, thinking, complex, image, video"),
    ("/new", "/new                 start a new session in the active module"),
    ("/sessions", "/sessions            list stored sessions"),
    ("/open", "/open <id>           reopen a stored session"),
    ("/delete", "/delete <id>         delete a stored session"),
    ("/upload", "/upload <path>       attach an evidence file"),
    ("/docs", "/docs                list attached evidence"),
    ("/remove", "/remove <id>         detach an evidence file"),
    ("/image", "/image <prompt>      generate an image"),
    ("/video", "/video <prompt>      render a video"),
    ("/speak", "/speak <text>        synthesize speech"),
    ("/login", "/login <email> <name> sign in"),
    ("/logout", "/logout              sign out"),
    ("/whoami", "/whoami              show the signed-in user"),
    ("/key", "/key <api key>       rotate the API key"),
    ("/help", "/help                show this help"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Section(Option<String>),
    Mode(Option<String>),
    New,
    Sessions,
    Open(String),
    Delete(String),
    Upload(PathBuf),
    Docs,
    Remove(String),
    Image(String),
    Video(String),
    Speak(String),
    Login { email: String, name: String },
    Logout,
    WhoAmI,
    Key(String),
    Help,
    Quit,
}

/// Parses one input line. `Err` carries the usage text to show.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line == "quit" || line == "exit" {
        return Ok(Command::Quit);
    }
    if !line.starts_with('/') {
        return Ok(Command::Send(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let optional = || (!rest.is_empty()).then(|| rest.to_string());
    let required = || {
        if rest.is_empty() {
            Err(usage(name))
        } else {
            Ok(rest.to_string())
        }
    };

    match name {
        "/section" => Ok(Command::Section(optional())),
        "/mode" => Ok(Command::Mode(optional())),
        "/new" => Ok(Command::New),
        "/sessions" => Ok(Command::Sessions),
        "/open" => required().map(Command::Open),
        "/delete" => required().map(Command::Delete),
        "/upload" => required().map(|path| Command::Upload(PathBuf::from(path))),
        "/docs" => Ok(Command::Docs),
        "/remove" => required().map(Command::Remove),
        "/image" => required().map(Command::Image),
        "/video" => required().map(Command::Video),
        "/speak" => required().map(Command::Speak),
        "/login" => match rest.split_once(char::is_whitespace) {
            Some((email, name)) if email.contains('@') && !name.trim().is_empty() => {
                Ok(Command::Login {
                    email: email.to_string(),
                    name: name.trim().to_string(),
                })
            }
            _ => Err(usage(name)),
        },
        "/logout" => Ok(Command::Logout),
        "/whoami" => Ok(Command::WhoAmI),
        "/key" => required().map(Command::Key),
        "/help" => Ok(Command::Help),
        other => Err(format!("Unknown command {other}. Type /help for the list.")),
    }
}

fn usage(name: &str) -> String {
    COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, usage)| format!("Usage: {usage}"))
        .unwrap_or_else(|| format!("Unknown command {name}"))
}
