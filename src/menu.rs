//! Interactive chart menu for `--menu`.

use std::io::{BufRead, Write};

use log::error;

use crate::analysis::ChartKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Chart(ChartKind),
    All,
    Quit,
}

const MENU: &str = "\
Charts:
  1) Housing prices by property type
  2) Broadband upload vs download speed
  3) FTSE daily high over time
  4) All of the above
  q) Quit";

pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim().to_lowercase().as_str() {
        "1" | "housing" => Some(MenuChoice::Chart(ChartKind::Housing)),
        "2" | "broadband" => Some(MenuChoice::Chart(ChartKind::Broadband)),
        "3" | "ftse" => Some(MenuChoice::Chart(ChartKind::Ftse)),
        "4" | "all" => Some(MenuChoice::All),
        "q" | "quit" | "exit" => Some(MenuChoice::Quit),
        _ => None,
    }
}

/// Prompt until the user quits or input ends. A failing chart is reported
/// and the menu carries on.
pub fn run<R, W, F>(input: R, mut output: W, mut generate: F) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&[ChartKind]) -> anyhow::Result<()>,
{
    let mut lines = input.lines();
    loop {
        writeln!(output, "\n{}", MENU)?;
        write!(output, "> ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        let kinds = match parse_choice(&line) {
            Some(MenuChoice::Quit) => return Ok(()),
            Some(MenuChoice::All) => ChartKind::ALL.to_vec(),
            Some(MenuChoice::Chart(kind)) => vec![kind],
            None => {
                writeln!(output, "Unrecognised choice: {}", line.trim())?;
                continue;
            }
        };

        if let Err(e) = generate(&kinds) {
            error!("{:#}", e);
            writeln!(output, "Failed: {:#}", e)?;
        }
    }
}
