use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Display,
    Add,
    Remove,
    Edit,
    Unknown,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Display => "display",
            Command::Add => "add",
            Command::Remove => "remove",
            Command::Edit => "edit",
            Command::Unknown => "unknown",
        }
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "display" => Command::Display,
            "add" => Command::Add,
            "remove" => Command::Remove,
            "edit" => Command::Edit,
            _ => Command::Unknown,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
