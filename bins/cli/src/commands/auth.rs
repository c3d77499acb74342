//! Sign-in and sign-up command handler.

use crate::error::CliError;
use crate::format::{CliOutput, OutputMode, format_ndjson_summary, json_document, log_info};
use crate::runtime::ClientRuntime;
use codescope_app::{AuthInput, sign_in, sign_up};
use codescope_domain::IdentitySession;
use serde_json::json;
use std::io::{self, BufRead};

/// Where the password comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource<'a> {
    /// `--password` or `CODESCOPE_PASSWORD`.
    Value(&'a str),
    /// First line of stdin.
    Stdin,
    /// Not given; sign-in rejects it before calling the provider.
    Missing,
}

impl PasswordSource<'_> {
    fn resolve(self, stdin: impl BufRead) -> io::Result<String> {
        match self {
            Self::Value(value) => Ok(value.to_owned()),
            Self::Missing => Ok(String::new()),
            Self::Stdin => read_password_line(stdin),
        }
    }
}

fn read_password_line(mut reader: impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Auth command parameters.
#[derive(Debug)]
pub struct AuthCommandInput<'a> {
    pub email: &'a str,
    pub password: PasswordSource<'a>,
    /// Create the account instead of signing in.
    pub sign_up: bool,
    /// Print the ID token (otherwise it is never written).
    pub show_token: bool,
}

/// Authenticate against the identity provider.
pub async fn run_auth(
    mode: OutputMode,
    runtime: &ClientRuntime,
    input: AuthCommandInput<'_>,
) -> Result<CliOutput, CliError> {
    let deps = runtime.auth_deps()?;
    let password = input.password.resolve(io::stdin().lock())?;
    let auth_input = AuthInput {
        email: input.email.into(),
        password: password.into(),
    };
    let session = if input.sign_up {
        sign_up(&runtime.ctx, &deps, auth_input).await?
    } else {
        sign_in(&runtime.ctx, &deps, auth_input).await?
    };

    let mut stderr = String::new();
    let action = if input.sign_up { "signed up" } else { "signed in" };
    log_info(&mut stderr, action, mode.no_progress);

    let token = input.show_token.then(|| session.id_token.expose());
    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "auth", Some(session_json(&session, token)))
    } else if mode.is_json() {
        let mut payload = session_json(&session, token);
        payload["status"] = json!("ok");
        json_document(&payload)?
    } else {
        let mut out = format!("status: ok\nuid: {}\nemail: {}\n", session.uid, session.email);
        if let Some(token) = token {
            out.push_str("idToken: ");
            out.push_str(token);
            out.push('\n');
        }
        out
    };

    Ok(CliOutput::ok(stdout, stderr))
}

fn session_json(session: &IdentitySession, token: Option<&str>) -> serde_json::Value {
    json!({
        "uid": session.uid,
        "email": session.email,
        "idToken": token,
    })
}
