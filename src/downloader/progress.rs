//! Textual progress rendering for stream transfers

use std::io::{self, Write};
use std::time::{Duration, Instant};

const BAR_CELLS: usize = 50;
const PRINT_INTERVAL: Duration = Duration::from_millis(500);

/// Progress line for a transfer with a known total size.
pub fn render_bar(downloaded: u64, total: u64) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        downloaded as f64 * 100.0 / total as f64
    };
    let filled = ((percent / 2.0) as usize).min(BAR_CELLS);
    format!(
        "Progress: [{}{}] {:.2}% ({:.2}/{:.2} MB)",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled),
        percent,
        downloaded as f64 / 1024.0 / 1024.0,
        total as f64 / 1024.0 / 1024.0
    )
}

/// Progress line when the server reported no content length.
pub fn render_counter(downloaded: u64) -> String {
    format!("Downloaded: {:.2} MB", downloaded as f64 / 1024.0 / 1024.0)
}

/// Stdout progress printer, redrawing a single line in place
pub struct ProgressPrinter {
    total: Option<u64>,
    downloaded: u64,
    last_print: Option<Instant>,
}

impl ProgressPrinter {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total,
            downloaded: 0,
            last_print: None,
        }
    }

    /// Record newly received bytes, redrawing at most twice a second.
    pub fn advance(&mut self, bytes: u64) {
        self.downloaded += bytes;
        if self
            .last_print
            .map_or(true, |t| t.elapsed() >= PRINT_INTERVAL)
        {
            self.draw();
            self.last_print = Some(Instant::now());
        }
    }

    /// Final redraw plus the newline the in-place updates withheld.
    pub fn finish(&mut self) {
        self.draw();
        println!();
    }

    fn draw(&self) {
        let line = match self.total {
            Some(total) => render_bar(self.downloaded, total),
            None => render_counter(self.downloaded),
        };
        print!("\r{}", line);
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_empty_at_zero_and_full_at_total() {
        let start = render_bar(0, 1_000_000);
        assert!(start.contains(&"░".repeat(50)));
        assert!(start.contains("0.00%"));

        let done = render_bar(1_000_000, 1_000_000);
        assert!(done.contains(&"█".repeat(50)));
        assert!(done.contains("100.00%"));
    }

    #[test]
    fn bar_fills_proportionally() {
        let half = render_bar(512, 1024);
        assert!(half.contains("50.00%"));
        assert!(half.contains(&format!("{}{}", "█".repeat(25), "░".repeat(25))));
    }

    #[test]
    fn bar_never_overflows_its_cells() {
        // A server can deliver more than the advertised content length.
        let over = render_bar(2048, 1024);
        assert!(over.contains(&"█".repeat(50)));
        assert!(!over.contains("░"));
    }

    #[test]
    fn counter_reports_megabytes() {
        assert_eq!(render_counter(5 * 1024 * 1024), "Downloaded: 5.00 MB");
    }
}
