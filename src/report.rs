//! Report rendering
//!
//! Turns verdicts into reviewer-facing documents. The engine knows nothing
//! about rendering; this module consumes finished `ScriptVerdict`s (which
//! carry the original statement text) and produces HTML or plain text. JSON
//! is the verdict's own `serde` form.

use crate::engine::verdict::{IssueCategory, ScriptVerdict, StatementVerdict};
use crate::engine::BatchReport;

/// Minimal HTML escaping for statement text and issue messages.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn status_badge(verdict: &ScriptVerdict) -> &'static str {
    if verdict.passed() {
        r#"<span class="badge pass">PASS</span>"#
    } else {
        r#"<span class="badge fail">FAIL</span>"#
    }
}

const STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', sans-serif; margin: 2rem auto; max-width: 900px; color: #1f2430; }
h1 { border-bottom: 2px solid #e4e7ee; padding-bottom: .5rem; }
.badge { padding: .15rem .6rem; border-radius: .75rem; font-size: .8rem; font-weight: 600; color: #fff; }
.badge.pass { background: #2e9e5b; }
.badge.fail { background: #ce3b3b; }
.badge.skipped { background: #8a90a0; }
.statement { border: 1px solid #e4e7ee; border-radius: .5rem; margin: 1rem 0; padding: 1rem; }
.statement pre { background: #f6f7fa; padding: .75rem; border-radius: .4rem; overflow-x: auto; }
.issues li { margin: .25rem 0; }
.issues .advisory { color: #6a6f80; font-style: italic; }
.script-issues { border-left: 4px solid #ce3b3b; padding: .5rem 1rem; background: #fdf2f2; }
.summary { color: #555c6e; }
"#;

/// Render one script verdict as a standalone HTML document.
pub fn render_html(verdict: &ScriptVerdict) -> String {
    let title = verdict.name.as_deref().unwrap_or("migration script");

    let mut body = String::new();
    body.push_str(&format!(
        "<h1>DDL validation - {} {}</h1>\n",
        escape_html(title),
        status_badge(verdict)
    ));
    body.push_str(&format!(
        "<p class=\"summary\">{} statements, {} issues</p>\n",
        verdict.statements.len(),
        verdict.binding_issue_count()
    ));

    if !verdict.script_issues.is_empty() {
        body.push_str("<div class=\"script-issues\"><ul>\n");
        for issue in &verdict.script_issues {
            body.push_str(&format!("<li>{}</li>\n", escape_html(&issue.message)));
        }
        body.push_str("</ul></div>\n");
    }

    for statement in &verdict.statements {
        body.push_str(&render_statement_html(statement));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>DDL validation - {}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn render_statement_html(statement: &StatementVerdict) -> String {
    let badge = if !statement.checked {
        r#"<span class="badge skipped">SKIPPED</span>"#
    } else if statement.valid {
        r#"<span class="badge pass">OK</span>"#
    } else {
        r#"<span class="badge fail">ISSUES</span>"#
    };

    let mut section = format!(
        "<div class=\"statement\">\n<h3>#{} {} {}</h3>\n<pre>{}</pre>\n",
        statement.index,
        statement.kind,
        badge,
        escape_html(&statement.text)
    );

    if !statement.issues.is_empty() {
        section.push_str("<ul class=\"issues\">\n");
        for issue in &statement.issues {
            if issue.category == IssueCategory::Advisory {
                section.push_str(&format!(
                    "<li class=\"advisory\">reviewer: {}</li>\n",
                    escape_html(&issue.message)
                ));
            } else {
                section.push_str(&format!("<li>{}</li>\n", escape_html(&issue.message)));
            }
        }
        section.push_str("</ul>\n");
    }

    section.push_str("</div>\n");
    section
}

/// Render one script verdict as plain text.
pub fn render_text(verdict: &ScriptVerdict) -> String {
    let title = verdict.name.as_deref().unwrap_or("migration script");
    let mut out = format!("DDL validation - {}: {}\n", title, verdict.status);
    out.push_str(&format!(
        "{} statements, {} issues\n\n",
        verdict.statements.len(),
        verdict.binding_issue_count()
    ));

    for issue in &verdict.script_issues {
        out.push_str(&format!("[script] {}\n", issue.message));
    }

    for statement in &verdict.statements {
        let mark = if !statement.checked {
            "SKIPPED"
        } else if statement.valid {
            "ok"
        } else {
            "FAIL"
        };
        out.push_str(&format!(
            "#{} {} [{}] {}\n",
            statement.index, statement.kind, mark, statement.text
        ));
        for issue in &statement.issues {
            if issue.category == IssueCategory::Advisory {
                out.push_str(&format!("    reviewer: {}\n", issue.message));
            } else {
                out.push_str(&format!("    - {}\n", issue.message));
            }
        }
    }

    out
}

/// Render a consolidated HTML document for a batch run.
pub fn render_batch_html(report: &BatchReport) -> String {
    let mut body = String::new();
    body.push_str("<h1>DDL validation - batch report</h1>\n");
    body.push_str(&format!(
        "<p class=\"summary\">{} scripts: {} passed, {} failed{}</p>\n",
        report.total,
        report.passed,
        report.failed,
        if report.truncated > 0 {
            format!(
                " ({} scripts beyond the batch cap were not processed)",
                report.truncated
            )
        } else {
            String::new()
        }
    ));

    for verdict in &report.reports {
        let name = verdict.name.as_deref().unwrap_or("script");
        body.push_str(&format!(
            "<h2>{} {}</h2>\n",
            escape_html(name),
            status_badge(verdict)
        ));
        if !verdict.script_issues.is_empty() {
            body.push_str("<div class=\"script-issues\"><ul>\n");
            for issue in &verdict.script_issues {
                body.push_str(&format!("<li>{}</li>\n", escape_html(&issue.message)));
            }
            body.push_str("</ul></div>\n");
        }
        for statement in &verdict.statements {
            body.push_str(&render_statement_html(statement));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>DDL validation - batch report</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, body
    )
}
