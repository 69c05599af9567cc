//! Reading secrets and codes from the user.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::{Error, Result};

/// Environment variable that supplies the password non-interactively.
pub const PASSWORD_ENV_VAR: &str = "OMNICODE_PASSWORD";

/// Password from `OMNICODE_PASSWORD`, a no-echo TTY prompt, or the first
/// line of piped stdin.
pub fn password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(password);
    }

    if io::stdin().is_terminal() {
        eprint!("Password: ");
        io::stderr().flush()?;
        return Ok(rpassword::read_password()?);
    }

    line().and_then(|l| {
        if l.is_empty() {
            Err(Error::Custom(format!(
                "No password provided. Set {PASSWORD_ENV_VAR} or run interactively."
            )))
        } else {
            Ok(l)
        }
    })
}

/// One line from stdin, prompting first when attached to a terminal.
pub fn ask(label: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        eprint!("{label}: ");
        io::stderr().flush()?;
    }
    line()
}

fn line() -> Result<String> {
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
