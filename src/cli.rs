//! Interactive terminal session over the page flow.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::flow::{FlowController, Page};
use crate::render;

/// What one line of input asks for on the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Back,
    Retry,
    Example(usize),
    /// Submit on the entry page, open the doctor search on the results page.
    Next,
    UseLocation,
    Radius(f64),
    Limit(u32),
    Text(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line {
            ":q" | ":quit" => Self::Quit,
            ":b" | ":back" => Self::Back,
            ":r" | ":retry" => Self::Retry,
            ":n" | ":next" | ":d" | ":doctors" => Self::Next,
            ":l" | ":location" => Self::UseLocation,
            _ => {
                if let Some(rest) = line.strip_prefix(":radius ") {
                    Self::Radius(rest.trim().parse().ok()?)
                } else if let Some(rest) = line.strip_prefix(":limit ") {
                    Self::Limit(rest.trim().parse().ok()?)
                } else if let Some(n) = line.strip_prefix(':').and_then(|n| n.parse::<usize>().ok()) {
                    Self::Example(n.checked_sub(1)?)
                } else {
                    Self::Text(line.to_string())
                }
            }
        };
        Some(command)
    }
}

fn prompt(page: Page) -> &'static str {
    match page {
        Page::SymptomEntry => "Describe your symptoms (:1-:3 example, :r recheck backend, :q quit)",
        Page::Results => ":d find doctors, :b back, :r recheck backend, :q quit",
        Page::FindDoctors => {
            "Type an address to search (:l use my location, :radius KM, :limit N, :b back, :q quit)"
        }
    }
}

/// Drive the flow from stdin until the user quits or input ends.
pub async fn run_session(mut flow: FlowController) -> Result<()> {
    let mut lines: Lines<BufReader<Stdin>> = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    flow.start().await;

    loop {
        let screen = format!("{}\n{}\n> ", render::page(flow.active()), prompt(flow.page()));
        stdout.write_all(screen.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        // Errors are already recorded on the page and shown on the next render.
        match (flow.page(), command) {
            (_, Command::Quit) => break,
            (_, Command::Back) => {
                flow.back().await;
            }
            (_, Command::Retry) => flow.retry_health_check().await,

            (Page::SymptomEntry, Command::Example(i)) => {
                if let Some(page) = flow.symptom_entry_mut() {
                    page.use_example(i);
                }
            }
            (Page::SymptomEntry, Command::Text(text)) => {
                if let Some(page) = flow.symptom_entry_mut() {
                    page.set_text(text);
                }
                stdout.write_all(b"Analyzing your symptoms...\n").await?;
                let _ = flow.submit_symptoms().await;
            }
            (Page::SymptomEntry, Command::Next) => {
                stdout.write_all(b"Analyzing your symptoms...\n").await?;
                let _ = flow.submit_symptoms().await;
            }

            (Page::Results, Command::Next) => {
                if let Err(e) = flow.open_find_doctors().await {
                    stdout.write_all(format!("!! {e}\n").as_bytes()).await?;
                }
            }

            (Page::FindDoctors, Command::Text(address)) => {
                if let Some(page) = flow.find_doctors_mut() {
                    page.set_address(address);
                }
                stdout.write_all(b"Searching for doctors...\n").await?;
                let _ = flow.search_doctors().await;
            }
            (Page::FindDoctors, Command::UseLocation) => {
                let _ = flow.use_my_location().await;
            }
            (Page::FindDoctors, Command::Radius(km)) => {
                if let Some(page) = flow.find_doctors_mut() {
                    page.set_radius_km(km);
                }
            }
            (Page::FindDoctors, Command::Limit(limit)) => {
                let accepted = flow.find_doctors_mut().is_some_and(|page| page.set_limit(limit));
                if !accepted {
                    stdout
                        .write_all(b"Limit must be one of 10, 20, 25, 50, 100\n")
                        .await?;
                }
            }
            (Page::FindDoctors, Command::Next) => {
                let _ = flow.search_doctors().await;
            }

            (_, other) => {
                tracing::debug!(?other, "Command not available on this page");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("  "), None);
        assert_eq!(Command::parse(":q"), Some(Command::Quit));
        assert_eq!(Command::parse(":2"), Some(Command::Example(1)));
        assert_eq!(Command::parse(":0"), None);
        assert_eq!(Command::parse(":radius 12.5"), Some(Command::Radius(12.5)));
        assert_eq!(Command::parse(":limit 50"), Some(Command::Limit(50)));
        assert_eq!(Command::parse(":limit many"), None);
        assert_eq!(
            Command::parse(" headache, fever "),
            Some(Command::Text("headache, fever".to_string()))
        );
    }
}
