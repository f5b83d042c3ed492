//! Interactive credential entry seam.

use std::io::{self, BufRead, Write};

use secrecy::SecretString;

use crate::Result;

/// Source of a username/secret pair for strategies that need one.
///
/// This is the only place the crate touches user interaction; embedders
/// supply their own implementation to integrate with whatever UI hosts
/// them, and tests supply a canned one.
pub trait CredentialPrompt: Send + Sync {
    /// Obtain a username and secret for the named session and environment.
    fn obtain(&self, name: &str, environment: &str) -> Result<(String, SecretString)>;
}

/// Prompts on the controlling terminal, reading the secret without echo.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolePrompt;

impl CredentialPrompt for ConsolePrompt {
    fn obtain(&self, name: &str, environment: &str) -> Result<(String, SecretString)> {
        let mut stdout = io::stdout();
        write!(stdout, "Enter the username for {name} {environment}: ")?;
        stdout.flush()?;

        let mut username = String::new();
        io::stdin().lock().read_line(&mut username)?;

        let secret =
            rpassword::prompt_password(format!("Enter the password for {name} {environment}: "))?;

        Ok((username.trim().to_string(), SecretString::from(secret)))
    }
}
