//! Rendering of summary results for the terminal and the browser.

use std::io::Write;

use crate::core::models::SummaryResult;
use crate::lifecycle::Notifier;

pub const LOADING_MARKDOWN: &str = "Summarizing…";

/// Detail markdown for a result: the digest, an error block, or the loading text.
#[must_use]
pub fn render_summary_markdown(result: Option<&SummaryResult>) -> String {
    match result {
        None => LOADING_MARKDOWN.to_string(),
        Some(SummaryResult::Summary(text)) => text.clone(),
        Some(SummaryResult::Failed { message, .. }) => {
            format!("**Error:** Couldn't generate summary.\n\n```\n{message}\n```")
        }
    }
}

/// Standalone HTML page showing a digest, for opening in a browser.
#[must_use]
pub fn render_summary_html(title: &str, summary: &str) -> String {
    let title = escape_html(title);
    let body = escape_html(summary);
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>body {{ font-family: -apple-system, sans-serif; max-width: 46rem; margin: 2rem auto; line-height: 1.5; }} \
         .summary {{ white-space: pre-wrap; }}</style>\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <div class=\"summary\">{body}</div>\n\
         </body>\n\
         </html>\n"
    )
}

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Notifications go to stderr, the rendered result to stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show_progress(&self, title: &str) {
        eprintln!("… {title}");
    }

    fn show_success(&self, title: &str, message: &str) {
        eprintln!("✔ {title}: {message}");
    }

    fn show_error(&self, title: &str, message: &str) {
        eprintln!("✘ {title}: {message}");
    }

    fn render_result(&self, result: Option<&SummaryResult>) {
        // The loading text is already covered by the progress notification.
        if result.is_none() {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "\n{}\n", render_summary_markdown(result));
        let _ = stdout.flush();
    }
}
