//! Interactive session.
//!
//! Reads one command per line from stdin, parsed with the same subcommand
//! table as the one-shot CLI. State persists between lines, and no error
//! ends the session.

use std::io::{self, Write};

use clap::Parser;
use grayshop_storefront::app::{Action, App};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, Command, View, dispatch_all, print, run_command};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// What to do with one input line.
#[derive(Debug)]
enum Input {
    Blank,
    Quit,
    Command(Command),
    /// Help text or a parse error, to be printed as-is.
    Message(String),
}

fn parse(line: &str) -> Input {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Input::Blank,
        ["exit" | "quit"] => Input::Quit,
        _ => match ShellLine::try_parse_from(words) {
            Ok(ShellLine {
                command: Command::Shell,
            }) => Input::Message("已在交互模式中\n".to_string()),
            Ok(parsed) => Input::Command(parsed.command),
            Err(e) => Input::Message(e.render().to_string()),
        },
    }
}

fn prompt() -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(b"grayshop> ")?;
    out.flush()
}

fn say(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Run the shell until `exit`, `quit` or end of input.
///
/// # Errors
///
/// Returns `CliError::Io` if stdin or stdout fails.
pub async fn run(app: &mut App) -> Result<(), CliError> {
    dispatch_all(app, vec![Action::LoadProducts]).await;
    print(app, View::Catalog).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Message(text) => say(&text)?,
            Input::Command(command) => match run_command(app, command).await {
                Ok((_, text)) => say(&text)?,
                Err(e) => say(&format!("! {e}\n"))?,
            },
        }
    }

    tracing::debug!("Shell closed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use grayshop_core::CartLineId;
    use grayshop_integration_tests::TestContext;
    use grayshop_storefront::navigation::Route;

    async fn line(app: &mut App, text: &str) -> (bool, String) {
        match parse(text) {
            Input::Command(command) => run_command(app, command).await.unwrap(),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_blank_and_quit() {
        assert!(matches!(parse("   "), Input::Blank));
        assert!(matches!(parse("quit"), Input::Quit));
        assert!(matches!(parse(" exit "), Input::Quit));
    }

    #[test]
    fn test_parse_command() {
        match parse("dec 12") {
            Input::Command(Command::Dec { line }) => assert_eq!(line, CartLineId::new(12)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_flags() {
        match parse("products --category 数码 --sort newest") {
            Input::Command(Command::Products { category, sort, .. }) => {
                assert_eq!(category.as_deref(), Some("数码"));
                assert_eq!(sort, "newest");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_nested_shell_is_refused() {
        assert!(matches!(parse("shell"), Input::Message(_)));
    }

    #[test]
    fn test_parse_error_is_a_message() {
        assert!(matches!(parse("pay not-a-number"), Input::Message(_)));
    }

    #[tokio::test]
    async fn test_catalog_after_logout() {
        let ctx = TestContext::new().await;
        ctx.sign_in("alice").await;
        ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
        ctx.backend.seed_stock("保温杯", "生活", 8900, 2).await;
        let mut app = ctx.app();

        let (ok, _) = line(&mut app, "logout").await;
        assert!(ok);
        assert_eq!(app.route().await, Route::Login);

        let (ok, text) = line(&mut app, "products --category 数码").await;
        assert!(ok);
        assert_eq!(app.route().await, Route::Catalog);
        assert_eq!(app.state().filter.category.as_deref(), Some("数码"));
        assert!(text.contains("鼠标"));
        assert!(!text.contains("保温杯"));

        let (ok, text) = line(&mut app, "reset").await;
        assert!(ok);
        assert!(text.contains("保温杯"));
    }

    #[tokio::test]
    async fn test_catalog_after_session_expiry() {
        let ctx = TestContext::new().await;
        ctx.sign_in("alice").await;
        let id = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
        let mut app = ctx.app();
        ctx.backend.revoke_all().await;

        let (ok, text) = line(&mut app, "cart").await;
        assert!(!ok);
        assert!(text.contains("请登录"));

        let (ok, text) = line(&mut app, &format!("show {id}")).await;
        assert!(ok);
        assert_eq!(app.route().await, Route::Catalog);
        assert!(text.contains("鼠标"));
    }
}
