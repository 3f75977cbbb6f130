//! Terminal rendering for verdicts and change reports.

use console::{style, Color};

use schema_compat::SchemaDiff;

const SAFE: Color = Color::Color256(78);
const BREAKING: Color = Color::Color256(203);
const NOTICE: Color = Color::Color256(179);
const FRAME: Color = Color::Color256(67);
const MUTED: Color = Color::Color256(244);

/// Width of the right-hand tag column in the report frame.
const TAG_WIDTH: usize = "BREAKING".len();

/// Outcome of a subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    NotEquivalent,
    InPlace,
    ForceReplace,
}

impl Verdict {
    fn label(self) -> &'static str {
        match self {
            Verdict::Equivalent => "equivalent",
            Verdict::NotEquivalent => "not equivalent",
            Verdict::InPlace => "in-place",
            Verdict::ForceReplace => "force-replace",
        }
    }

    fn detail(self) -> &'static str {
        match self {
            Verdict::Equivalent => "both texts describe the same schema",
            Verdict::NotEquivalent => "the schemas differ",
            Verdict::InPlace => "the table can be altered without recreating it",
            Verdict::ForceReplace => "the table must be recreated",
        }
    }

    fn color(self) -> Color {
        match self {
            Verdict::Equivalent | Verdict::InPlace => SAFE,
            Verdict::NotEquivalent => NOTICE,
            Verdict::ForceReplace => BREAKING,
        }
    }

    fn mark(self) -> &'static str {
        match self {
            Verdict::Equivalent | Verdict::InPlace => "\u{2714}", // ✔
            Verdict::NotEquivalent | Verdict::ForceReplace => "\u{2718}", // ✘
        }
    }
}

/// Print a one-line verdict.
pub fn verdict(verdict: Verdict) {
    let color = verdict.color();
    println!(
        "  {} {}  {}",
        style(verdict.mark()).fg(color).bold(),
        style(verdict.label()).fg(color).bold(),
        style(verdict.detail()).fg(MUTED)
    );
}

/// Print a secondary hint line.
pub fn hint(msg: &str) {
    println!("  {}", style(msg).fg(MUTED));
}

/// Inner width of the report frame: room for the longest line, a gap and the
/// tag column, and never narrower than the title.
fn frame_width<'a>(lines: impl Iterator<Item = &'a str>, title: &str) -> usize {
    let text_width = lines.map(|line| line.chars().count()).max().unwrap_or(0);
    (text_width + 2 + TAG_WIDTH).max(title.chars().count() + 1)
}

/// Print every change inside a frame as wide as the longest line. Breaking
/// changes are tagged and highlighted.
pub fn report(diff: &SchemaDiff) {
    let rows: Vec<(String, bool)> = diff
        .changes
        .iter()
        .map(|change| (change.describe(), change.is_breaking()))
        .collect();

    let count = rows.len();
    let title = format!(" {} change{} ", count, if count == 1 { "" } else { "s" });
    let inner = frame_width(rows.iter().map(|(text, _)| text.as_str()), &title);

    println!();
    println!(
        "  {}{}{}",
        style("\u{256D}\u{2500}").fg(FRAME), // ╭─
        style(&title).fg(FRAME).bold(),
        style(format!(
            "{}\u{256E}", // ╮
            "\u{2500}".repeat(inner + 1 - title.chars().count())
        ))
        .fg(FRAME)
    );

    for (text, breaking) in &rows {
        let padding = " ".repeat(inner - TAG_WIDTH - text.chars().count());
        let (text, tag) = if *breaking {
            (
                style(text.as_str()).fg(BREAKING),
                style(format!("{:>width$}", "BREAKING", width = TAG_WIDTH)).fg(BREAKING).bold(),
            )
        } else {
            (
                style(text.as_str()),
                style(format!("{:>width$}", "ok", width = TAG_WIDTH)).fg(MUTED),
            )
        };
        println!(
            "  {} {}{}{} {}",
            style("\u{2502}").fg(FRAME), // │
            text,
            padding,
            tag,
            style("\u{2502}").fg(FRAME)
        );
    }

    println!(
        "  {}",
        style(format!(
            "\u{2570}{}\u{256F}", // ╰ ╯
            "\u{2500}".repeat(inner + 2)
        ))
        .fg(FRAME)
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_fits_longest_line() {
        let lines = ["- Field 'a' removed", "~ Field 'address.city' type changed: STRING -> INT64"];
        let width = frame_width(lines.iter().copied(), " 2 changes ");
        assert_eq!(width, lines[1].chars().count() + 2 + TAG_WIDTH);
    }

    #[test]
    fn test_frame_never_narrower_than_title() {
        let title = " 1 change with a very long title ";
        assert_eq!(frame_width(["+"].into_iter(), title), title.chars().count() + 1);
    }

    #[test]
    fn test_frame_counts_chars_not_bytes() {
        let ascii = frame_width(["~ Field 'a'"].into_iter(), "");
        let wide = frame_width(["~ Field '\u{00E9}'"].into_iter(), "");
        assert_eq!(ascii, wide);
    }

    #[test]
    fn test_verdict_colors() {
        assert_eq!(Verdict::InPlace.color(), SAFE);
        assert_eq!(Verdict::ForceReplace.color(), BREAKING);
        assert_eq!(Verdict::NotEquivalent.label(), "not equivalent");
    }
}
