use std::path::PathBuf;

use tracing::debug;

/// netrc machine name the stored credentials are keyed by
pub const NETRC_MACHINE: &str = "linkedin";

/// A username/password pair supplied by the environment. Never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Looks up credentials from `LINKEDIN_USERNAME` / `LINKEDIN_PASSWORD`,
    /// falling back to a `machine linkedin` entry in `$NETRC` or `~/.netrc`.
    ///
    /// Returns `None` when no credentials are configured; public pages can
    /// still be extracted without them.
    #[must_use]
    pub fn lookup() -> Option<Self> {
        if let (Ok(username), Ok(password)) = (
            std::env::var("LINKEDIN_USERNAME"),
            std::env::var("LINKEDIN_PASSWORD"),
        ) {
            debug!("Using credentials from environment");
            return Some(Self { username, password });
        }

        let path = netrc_path()?;
        let contents = std::fs::read_to_string(&path).ok()?;
        let found = from_netrc(&contents, NETRC_MACHINE);
        if found.is_some() {
            debug!("Using credentials from {path:?}");
        }
        found
    }
}

fn netrc_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("NETRC") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".netrc"))
}

/// Minimal netrc token walk: only `machine` / `login` / `password` tokens
/// are honored, and only within the requested machine's entry.
fn from_netrc(contents: &str, machine: &str) -> Option<Credentials> {
    let mut username = None;
    let mut password = None;
    let mut in_machine = false;

    let mut tokens = contents.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "machine" => in_machine = tokens.next() == Some(machine),
            "default" => in_machine = false,
            "login" if in_machine => username = tokens.next().map(str::to_string),
            "password" if in_machine => password = tokens.next().map(str::to_string),
            _ => {}
        }
    }

    Some(Credentials {
        username: username?,
        password: password?,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_matching_machine_entry() {
        let netrc = "machine linkedin login user@example.com password s3cret\n";

        let credentials = from_netrc(netrc, NETRC_MACHINE).unwrap();
        assert_eq!(credentials.username, "user@example.com");
        assert_eq!(credentials.password, "s3cret");
    }

    #[test]
    fn skips_other_machines() {
        let netrc = "\
            machine example.org login alice password wrong\n\
            machine linkedin\n    login bob@example.com\n    password right\n\
            machine github.com login carol password other\n";

        let credentials = from_netrc(netrc, NETRC_MACHINE).unwrap();
        assert_eq!(credentials.username, "bob@example.com");
        assert_eq!(credentials.password, "right");
    }

    #[test]
    fn missing_machine_yields_none() {
        let netrc = "machine example.org login alice password wrong\n";
        assert!(from_netrc(netrc, NETRC_MACHINE).is_none());
    }

    #[test]
    fn incomplete_entry_yields_none() {
        let netrc = "machine linkedin login user@example.com\n";
        assert!(from_netrc(netrc, NETRC_MACHINE).is_none());
    }
}
