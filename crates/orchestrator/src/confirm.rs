use async_trait::async_trait;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Asked before every paid provider call
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn confirm(&self, operation: &str, number: &str, provider: &str) -> Decision;
}

/// Never asks
#[derive(Debug, Default, Clone, Copy)]
pub struct RunAll;

#[async_trait]
impl ConfirmGate for RunAll {
    async fn confirm(&self, _operation: &str, _number: &str, _provider: &str) -> Decision {
        Decision::Proceed
    }
}

/// Interactive y/n prompt on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

#[async_trait]
impl ConfirmGate for StdinPrompt {
    async fn confirm(&self, operation: &str, number: &str, provider: &str) -> Decision {
        let question = format!("{operation} {number} with {provider}? ");
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            prompt(&question, &mut input, &mut std::io::stdout())
        })
        .await
        .unwrap_or(Decision::Abort)
    }
}

/// Ask until the answer is `y` or `n`. End of input counts as `n`.
fn prompt(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Decision {
    loop {
        // a closed terminal is treated like a refusal
        if write!(output, "{question}").and_then(|_| output.flush()).is_err() {
            return Decision::Abort;
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return Decision::Abort,
            Ok(_) => {}
        }

        match line.trim() {
            "y" => return Decision::Proceed,
            "n" => return Decision::Abort,
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_reasks_until_answered() {
        let mut input = Cursor::new("maybe\n\ny\n");
        let mut output = Vec::new();
        let decision = prompt("Lookup 5551234567 with mock? ", &mut input, &mut output);

        assert_eq!(decision, Decision::Proceed);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Lookup 5551234567 with mock? ").count(), 3);
    }

    #[test]
    fn test_prompt_no_and_eof_abort() {
        let mut output = Vec::new();
        assert_eq!(
            prompt("? ", &mut Cursor::new("n\n"), &mut output),
            Decision::Abort
        );
        assert_eq!(prompt("? ", &mut Cursor::new(""), &mut output), Decision::Abort);
    }

    #[tokio::test]
    async fn test_run_all_always_proceeds() {
        assert_eq!(
            RunAll.confirm("Lookup", "5551234567", "WhitePages").await,
            Decision::Proceed
        );
    }
}
