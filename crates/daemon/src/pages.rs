// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTML rendering.
//!
//! Pages are small self-contained documents. Every interpolated string goes
//! through [`escape_html`]; variant names in links are percent-encoded as a
//! single path segment.

use civet_adapters::RemoteError;
use civet_core::{
    escape_html, CommitHash, JobInfo, JobOutcome, Node, StatusSnapshot, StatusTree, VariantError,
    VariantPath,
};

use crate::engine::BulkReport;

const STYLE: &str = "body{font-family:sans-serif;margin:1em 2em}\
nav a{text-decoration:none}\
form.inline{display:inline}\
li.passed a{color:#2a7d2a}li.failed a{color:#b22}li.running a{color:#a60}\
li.aborted a,li.skipped a,li.pending a{color:#777}li.malformed{color:#b22}\
pre.log{background:#111;color:#ddd;padding:1em;white-space:pre-wrap}\
.ansi-bold{font-weight:bold}.ansi-faint{opacity:.7}.ansi-italic{font-style:italic}\
.ansi-underline{text-decoration:underline}\
.ansi-fg-red{color:#e55}.ansi-fg-green{color:#5c5}.ansi-fg-yellow{color:#dc5}\
.ansi-fg-blue{color:#68f}.ansi-fg-magenta{color:#d6d}.ansi-fg-cyan{color:#5dd}";

const DOCUMENT_TAIL: &str = "</main>\n</body>\n</html>\n";

// ── Links ───────────────────────────────────────────────────────────────

pub fn index_url(base: &str) -> String {
    format!("{}/", base)
}

pub fn commit_url(base: &str, commit: &CommitHash) -> String {
    format!("{}/commit/{}", base, commit)
}

pub fn variant_url(base: &str, commit: &CommitHash, variant: &str) -> String {
    format!("{}/variant/{}", commit_url(base, commit), urlencoding::encode(variant))
}

// ── Document chrome ─────────────────────────────────────────────────────

/// One breadcrumb; the last crumb of a page has no link.
struct Crumb {
    label: String,
    href: Option<String>,
}

impl Crumb {
    fn link(label: impl Into<String>, href: String) -> Self {
        Self { label: label.into(), href: Some(href) }
    }

    fn text(label: impl Into<String>) -> Self {
        Self { label: label.into(), href: None }
    }
}

fn document_head(base: &str, title: &str, crumbs: &[Crumb]) -> String {
    let mut out = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>{}</style>\n</head>\n<body>\n<nav><a href=\"{}\">civet</a>",
        escape_html(title),
        STYLE,
        escape_html(&index_url(base)),
    );
    for crumb in crumbs {
        out.push_str(" / ");
        match &crumb.href {
            Some(href) => out.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape_html(href),
                escape_html(&crumb.label)
            )),
            None => out.push_str(&escape_html(&crumb.label)),
        }
    }
    out.push_str("</nav>\n<main>\n");
    out
}

fn document(base: &str, title: &str, crumbs: &[Crumb], body: &str) -> String {
    let mut out = document_head(base, title, crumbs);
    out.push_str(body);
    out.push_str(DOCUMENT_TAIL);
    out
}

fn post_button(action: &str, label: &str) -> String {
    format!(
        "<form class=\"inline\" method=\"post\" action=\"{}\">\
         <button type=\"submit\">{}</button></form>\n",
        escape_html(action),
        escape_html(label)
    )
}

fn commit_crumbs(base: &str, commit: &CommitHash, variant: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb::link(commit.short(), commit_url(base, commit))];
    crumbs.extend(variant.split(civet_core::VARIANT_SEPARATOR).map(Crumb::text));
    crumbs
}

// ── Index ───────────────────────────────────────────────────────────────

pub fn index_page(base: &str) -> String {
    let body = format!(
        "<h1>Build status</h1>\n<form method=\"get\" action=\"{}\">\n\
         <label>Commit <input name=\"commit\" size=\"40\" autofocus></label>\n\
         <button type=\"submit\">Show</button>\n</form>\n",
        escape_html(&index_url(base))
    );
    document(base, "civet", &[], &body)
}

// ── Commit ──────────────────────────────────────────────────────────────

/// Payload of one status tree leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Job { variant: VariantPath, outcome: JobOutcome },
    /// A variant name that could not be split into segments.
    Malformed { raw: String, error: VariantError },
}

/// Group a commit's jobs by variant path. Malformed names are kept at the
/// top level so they still show up.
pub fn status_tree(jobs: &[JobInfo]) -> StatusTree<TreeEntry> {
    let mut tree = StatusTree::new();
    for info in jobs {
        match VariantPath::parse(&info.variant) {
            Ok(variant) => {
                let path = variant.path().to_vec();
                tree.insert(path.as_slice(), TreeEntry::Job {
                    variant,
                    outcome: info.outcome.clone(),
                });
            }
            Err(error) => {
                let top: &[&str] = &[];
                tree.insert(top, TreeEntry::Malformed { raw: info.variant.clone(), error });
            }
        }
    }
    tree
}

pub fn commit_page(base: &str, commit: &CommitHash, jobs: &[JobInfo], live_refs: usize) -> String {
    let url = commit_url(base, commit);
    let mut body = format!("<h1>Commit <code>{}</code></h1>\n<p>", escape_html(commit.as_str()));
    body.push_str(&post_button(&format!("{}/cancel", url), "Cancel running jobs"));
    body.push_str(&post_button(&format!("{}/rebuild-failed", url), "Rebuild failed jobs"));
    body.push_str(&post_button(&format!("{}/rebuild-all", url), "Rebuild all jobs"));
    body.push_str("</p>\n");
    body.push_str(&format!(
        "<p class=\"refs\">{} live job {}</p>\n",
        live_refs,
        if live_refs == 1 { "reference" } else { "references" }
    ));

    let tree = status_tree(jobs);
    if tree.is_empty() {
        body.push_str("<p>No jobs recorded for this commit.</p>\n");
    } else {
        render_nodes(&mut body, tree.nodes(), base, commit);
    }
    document(base, &format!("civet: {}", commit.short()), &[Crumb::text(commit.short())], &body)
}

fn render_nodes(out: &mut String, nodes: &[Node<TreeEntry>], base: &str, commit: &CommitHash) {
    out.push_str("<ul>\n");
    for node in nodes {
        match node {
            Node::Branch { segment, children } => {
                out.push_str(&format!(
                    "<li class=\"group\"><span class=\"segment\">{}</span>\n",
                    escape_html(segment)
                ));
                render_nodes(out, children, base, commit);
                out.push_str("</li>\n");
            }
            Node::Leaf(TreeEntry::Job { variant, outcome }) => {
                let class = outcome.class();
                out.push_str(&format!(
                    "<li class=\"{}\"><a href=\"{}\">{}</a> <span class=\"status\">{}</span>",
                    class,
                    escape_html(&variant_url(base, commit, &variant.to_string())),
                    escape_html(variant.label()),
                    class,
                ));
                if let Some(detail) = outcome.detail() {
                    out.push_str(&format!(" <span class=\"detail\">{}</span>", escape_html(detail)));
                }
                out.push_str("</li>\n");
            }
            Node::Leaf(TreeEntry::Malformed { raw, error }) => {
                out.push_str(&format!(
                    "<li class=\"malformed\">invalid variant &quot;{}&quot;: {}</li>\n",
                    escape_html(raw),
                    escape_html(&error.to_string())
                ));
            }
        }
    }
    out.push_str("</ul>\n");
}

// ── Variant log ─────────────────────────────────────────────────────────

/// Page up to and including the opening of the log block.
pub fn log_prologue(
    base: &str,
    commit: &CommitHash,
    variant: &str,
    snapshot: &StatusSnapshot,
) -> String {
    let mut out = document_head(
        base,
        &format!("civet: {} {}", commit.short(), variant),
        &commit_crumbs(base, commit, variant),
    );
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(variant)));
    if snapshot.can_cancel {
        out.push_str(&post_button(
            &format!("{}/cancel", variant_url(base, commit, variant)),
            "Cancel",
        ));
    }
    out.push_str("<pre class=\"log\">");
    out
}

/// Closing of the log block after a clean end of stream.
pub fn log_epilogue(
    base: &str,
    commit: &CommitHash,
    variant: &str,
    snapshot: &StatusSnapshot,
) -> String {
    let mut out = "</pre>\n".to_string();
    if snapshot.can_rebuild {
        out.push_str(&post_button(
            &format!("{}/rebuild", variant_url(base, commit, variant)),
            "Rebuild",
        ));
    }
    out.push_str(DOCUMENT_TAIL);
    out
}

/// Closing of the log block when reading the log failed mid-stream.
pub fn log_failure(error: &RemoteError) -> String {
    format!(
        "</pre>\n<p class=\"error\">Log stream interrupted: {}</p>\n{}",
        escape_html(&error.to_string()),
        DOCUMENT_TAIL
    )
}

// ── Bulk actions ────────────────────────────────────────────────────────

pub fn bulk_page(base: &str, commit: &CommitHash, report: &BulkReport) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape_html(&report.action.to_string()));
    body.push_str(&format!("<p>{}</p>\n", escape_html(&report.headline())));
    if report.attempted() > 0 {
        body.push_str("<ul>\n");
        for job in report.successes() {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(&variant_url(base, commit, &job.variant)),
                escape_html(&job.variant)
            ));
        }
        body.push_str("</ul>\n");
        body.push_str(&format!("<p>{}</p>\n", escape_html(&report.failure_summary())));
    }
    body.push_str(&format!(
        "<p><a href=\"{}\">Back to commit</a></p>\n",
        escape_html(&commit_url(base, commit))
    ));
    let crumbs = [
        Crumb::link(commit.short(), commit_url(base, commit)),
        Crumb::text(report.action.to_string()),
    ];
    document(base, &format!("civet: {} {}", commit.short(), report.action), &crumbs, &body)
}

// ── Errors ──────────────────────────────────────────────────────────────

pub fn error_page(base: &str, status: u16, message: &str) -> String {
    let title = format!("{} {}", status, crate::http::reason(status));
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n",
        escape_html(&title),
        escape_html(message)
    );
    document(base, &title, &[], &body)
}

#[cfg(test)]
#[path = "pages_tests.rs"]
mod tests;
