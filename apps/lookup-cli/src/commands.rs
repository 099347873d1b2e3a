/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ShowVisits,
    ShowHistory,
    /// 1-based position in the medical records tab.
    View(usize),
    Download(usize),
    Print(usize),
    Clear,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_lowercase().as_str(), rest) {
            ("search", query) => Command::Search(query.to_string()),
            ("visits", "") => Command::ShowVisits,
            ("history", "") | ("records", "") => Command::ShowHistory,
            ("view", n) => Self::position(n, Command::View),
            ("download", n) => Self::position(n, Command::Download),
            ("print", n) => Self::position(n, Command::Print),
            ("clear", "") => Command::Clear,
            ("help", "") | ("?", "") => Command::Help,
            ("quit", "") | ("exit", "") => Command::Quit,
            _ => Command::Search(line.to_string()),
        }
    }

    fn position(raw: &str, build: fn(usize) -> Command) -> Command {
        match raw.parse::<usize>() {
            Ok(n) if n > 0 => build(n),
            _ => Command::Invalid(format!("expected a record number, got '{}'", raw)),
        }
    }
}

pub const HELP: &str = "\
Type a UID (CLN1-...), phone number or name to search.
  search <query>   search even if the query looks like a command
  visits           show visit history
  history          show medical records
  view <n>         show medical record n
  download <n>     save medical record n as a text file
  print <n>        write a print view for medical record n
  clear            clear the current patient
  quit             exit";
