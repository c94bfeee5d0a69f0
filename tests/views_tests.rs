use slack_digest::core::models::SummaryResult;
use slack_digest::errors::ErrorKind;
use slack_digest::features::deliver::write_summary_html;
use slack_digest::views::{LOADING_MARKDOWN, render_summary_html, render_summary_markdown};

#[test]
fn loading_renders_placeholder() {
    assert_eq!(render_summary_markdown(None), LOADING_MARKDOWN);
}

#[test]
fn summary_renders_as_is() {
    let result = SummaryResult::Summary("- shipped v2\n- hiring freeze".to_string());
    assert_eq!(render_summary_markdown(Some(&result)), "- shipped v2\n- hiring freeze");
}

#[test]
fn failure_renders_heading_and_preformatted_message() {
    let result = SummaryResult::Failed {
        kind: ErrorKind::NoSuchChannel,
        message: "No such channel: genral".to_string(),
    };
    let markdown = render_summary_markdown(Some(&result));

    assert!(markdown.starts_with("**Error:** Couldn't generate summary."));
    assert!(markdown.contains("```\nNo such channel: genral\n```"));
}

#[test]
fn html_escapes_summary_and_title() {
    let html = render_summary_html("#dev <team>", "a < b && \"c\"");

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>#dev &lt;team&gt;</title>"));
    assert!(html.contains("a &lt; b &amp;&amp; &quot;c&quot;"));
    assert!(!html.contains("a < b"));
}

#[test]
fn html_file_is_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_summary_html(dir.path(), "Thread summary", "- done").unwrap();

    assert!(path.starts_with(dir.path()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("<h1>Thread summary</h1>"));
    assert!(written.contains("- done"));
}
