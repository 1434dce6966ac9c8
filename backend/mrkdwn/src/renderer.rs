//! Renderers for the markup IR
//!
//! Turns the AST into mrkdwn for text payloads, or into plain text for
//! `plain_text` payloads (buttons, headers, option labels).

use crate::escape::{collapse_whitespace, escape, split_padding};
use crate::ir::{IrParser, List, ListKind, MarkupNode};
use crate::list;
use blockforge_core::Node;
use blockforge_layout::LayoutEngine;
use chrono::DateTime;
use tracing::trace;

/// Format used by `<time>` when it has no text of its own.
pub const DEFAULT_TIME_FORMAT: &str = "{date_num} {time_secs}";

/// A rendered line and the width it must be indented by.
///
/// Indents are kept as widths until the very end so nested levels add up
/// exactly and each line gets a single synthesized indent.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    indent: f64,
    text: String,
}

impl Line {
    fn new(indent: f64, text: impl Into<String>) -> Self {
        Self {
            indent,
            text: text.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Collects lines and the blank separators paragraphs ask for.
#[derive(Default)]
struct LineBuffer {
    lines: Vec<Line>,
    gap: bool,
}

impl LineBuffer {
    fn push(&mut self, line: Line) {
        if std::mem::take(&mut self.gap) && self.lines.last().is_some_and(|l| !l.is_blank()) {
            self.lines.push(Line::new(0.0, ""));
        }
        self.lines.push(line);
    }

    fn extend(&mut self, lines: impl IntoIterator<Item = Line>) {
        for line in lines {
            self.push(line);
        }
    }

    fn request_gap(&mut self) {
        if !self.lines.is_empty() {
            self.gap = true;
        }
    }

    fn finish(mut self) -> Vec<Line> {
        while self.lines.last().is_some_and(Line::is_blank) {
            self.lines.pop();
        }
        let leading = self.lines.iter().take_while(|l| l.is_blank()).count();
        self.lines.drain(..leading);
        self.lines
    }
}

pub struct Renderer<'a> {
    layout: &'a LayoutEngine,
}

impl<'a> Renderer<'a> {
    pub fn new(layout: &'a LayoutEngine) -> Self {
        Self { layout }
    }

    /// Render markup children of a text-bearing container.
    pub fn render_nodes(&self, nodes: &[Node]) -> String {
        self.render(&IrParser::parse(nodes))
    }

    /// Renders the AST to mrkdwn.
    pub fn render(&self, nodes: &[MarkupNode]) -> String {
        let lines = self.block_lines(nodes, 0);
        trace!(lines = lines.len(), "rendered mrkdwn");
        lines
            .iter()
            .map(|line| self.line_text(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the AST to plain text, dropping all formatting.
    pub fn to_plain_text(nodes: &[MarkupNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            plain(node, &mut output);
        }
        output
            .split('\n')
            .map(|line| line.trim_matches(' '))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Plain text of generic nodes.
    pub fn plain_text(nodes: &[Node]) -> String {
        Self::to_plain_text(&IrParser::parse(nodes))
    }

    /// Text leaves concatenated verbatim, for pre-formatted mrkdwn.
    pub fn raw_text(nodes: &[Node]) -> String {
        let mut output = String::new();
        for node in nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Element(el) => output.push_str(&Self::raw_text(&el.children)),
            }
        }
        output
    }

    fn line_text(&self, line: &Line) -> String {
        if line.is_blank() {
            return String::new();
        }
        let mut text = self.layout.make_indent(line.indent);
        text.push_str(&line.text);
        text
    }

    fn block_lines(&self, nodes: &[MarkupNode], depth: usize) -> Vec<Line> {
        let mut buffer = LineBuffer::default();
        let mut inline = String::new();

        for node in nodes {
            if !node.is_block() {
                self.inline(node, &mut inline);
                continue;
            }
            flush_inline(&mut inline, &mut buffer);

            match node {
                MarkupNode::Paragraph(children) => {
                    buffer.request_gap();
                    let mut text = String::new();
                    for child in children {
                        self.inline(child, &mut text);
                    }
                    flush_inline(&mut text, &mut buffer);
                    buffer.request_gap();
                }
                MarkupNode::Blockquote(children) => {
                    for line in self.block_lines(children, depth) {
                        let text = self.line_text(&line);
                        let quoted = if text.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {text}")
                        };
                        buffer.push(Line::new(0.0, quoted));
                    }
                }
                MarkupNode::Preformatted(children) => {
                    let mut code = String::new();
                    for child in children {
                        self.preformatted(child, &mut code);
                    }
                    buffer.push(Line::new(0.0, "```"));
                    for line in code.trim_matches('\n').split('\n') {
                        buffer.push(Line::new(0.0, line));
                    }
                    buffer.push(Line::new(0.0, "```"));
                }
                MarkupNode::List(list) => buffer.extend(self.list_lines(list, depth)),
                _ => {}
            }
        }
        flush_inline(&mut inline, &mut buffer);
        buffer.finish()
    }

    /// Lines of one list. Markers are right-aligned to the widest marker and
    /// everything after an item's first line is indented past the marker and
    /// its trailing space.
    fn list_lines(&self, list: &List, depth: usize) -> Vec<Line> {
        let mut number = match list.kind {
            ListKind::Ordered { start, .. } => start,
            ListKind::Unordered => 1,
        };
        let markers: Vec<String> = list
            .items
            .iter()
            .map(|item| {
                if let Some(value) = item.value {
                    number = value;
                }
                let marker = list::marker(list.kind, number, depth);
                number = number.saturating_add(1);
                marker
            })
            .collect();

        let widths: Vec<f64> = markers
            .iter()
            .map(|m| self.layout.measure_width(m))
            .collect();
        let widest = widths.iter().copied().fold(0.0, f64::max);
        let content_indent = widest + self.layout.measure_width(" ");

        let mut lines = Vec::new();
        for ((item, marker), width) in list.items.iter().zip(&markers).zip(&widths) {
            let pad = widest - width;
            let mut body = self.block_lines(&item.children, depth + 1).into_iter();

            match body.next() {
                Some(first) => {
                    let first_text = self.line_text(&first);
                    lines.push(Line::new(pad, format!("{marker} {first_text}")));
                }
                None => lines.push(Line::new(pad, marker.clone())),
            }
            for line in body {
                let indent = if line.is_blank() {
                    0.0
                } else {
                    content_indent + line.indent
                };
                lines.push(Line::new(indent, line.text));
            }
        }
        lines
    }

    fn inline(&self, node: &MarkupNode, out: &mut String) {
        match node {
            MarkupNode::Text(text) => out.push_str(&escape(&collapse_whitespace(text))),
            MarkupNode::Bold(children) => self.wrap(children, "*", out),
            MarkupNode::Italic(children) => self.wrap(children, "_", out),
            MarkupNode::Strike(children) => self.wrap(children, "~", out),
            MarkupNode::Code(children) => {
                // Formatting does not render inside code spans.
                let mut code = String::new();
                for child in children {
                    plain(child, &mut code);
                }
                push_wrapped(&escape(&code), "`", out);
            }
            MarkupNode::LineBreak => out.push('\n'),
            MarkupNode::Link { href, children } => self.link(href.as_deref(), children, out),
            MarkupNode::Time {
                timestamp,
                fallback,
                format,
            } => self.time(*timestamp, fallback.as_deref(), format, out),
            block => {
                let lines = self.block_lines(std::slice::from_ref(block), 0);
                let text: Vec<String> = lines.iter().map(|l| self.line_text(l)).collect();
                out.push_str(&text.join("\n"));
            }
        }
    }

    fn wrap(&self, children: &[MarkupNode], mark: &str, out: &mut String) {
        let mut inner = String::new();
        for child in children {
            self.inline(child, &mut inner);
        }
        push_wrapped(&inner, mark, out);
    }

    fn link(&self, href: Option<&str>, children: &[MarkupNode], out: &mut String) {
        let mut label = String::new();
        for child in children {
            self.inline(child, &mut label);
        }
        let label = label.replace('\n', " ");
        let label = label.trim_matches(' ');

        let Some(href) = href.filter(|h| !h.is_empty()) else {
            out.push_str(label);
            return;
        };
        if let Some(mention) = mention(href) {
            out.push_str(&mention);
            return;
        }
        let href = escape(href).replace('|', "%7C");
        if label.is_empty() {
            out.push_str(&format!("<{href}>"));
        } else {
            out.push_str(&format!("<{href}|{label}>"));
        }
    }

    fn time(
        &self,
        timestamp: Option<i64>,
        fallback: Option<&str>,
        format: &[MarkupNode],
        out: &mut String,
    ) {
        let mut text = String::new();
        for node in format {
            plain(node, &mut text);
        }
        let text = text.trim();

        let Some(timestamp) = timestamp else {
            out.push_str(&escape(fallback.unwrap_or(text)));
            return;
        };
        let format = if text.is_empty() { DEFAULT_TIME_FORMAT } else { text };
        let fallback = match fallback {
            Some(f) => f.to_string(),
            None => DateTime::from_timestamp(timestamp, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| timestamp.to_string()),
        };
        out.push_str(&format!(
            "<!date^{timestamp}^{}|{}>",
            escape(format),
            escape(&fallback)
        ));
    }

    fn preformatted(&self, node: &MarkupNode, out: &mut String) {
        match node {
            MarkupNode::Text(text) => out.push_str(&escape(text)),
            MarkupNode::LineBreak => out.push('\n'),
            MarkupNode::Link { .. } => self.inline(node, out),
            other => plain(other, out),
        }
    }
}

/// Split an accumulated inline run into lines and hand them to the buffer.
fn flush_inline(inline: &mut String, buffer: &mut LineBuffer) {
    let chunk = std::mem::take(inline);
    if chunk.trim_matches([' ', '\n']).is_empty() {
        return;
    }
    for line in chunk.split('\n') {
        buffer.push(Line::new(0.0, line.trim_matches(' ')));
    }
}

/// Wrap every line of `content` in `mark` separately; mrkdwn marks cannot
/// span line breaks.
fn push_wrapped(content: &str, mark: &str, out: &mut String) {
    for (index, line) in content.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let (lead, core, tail) = split_padding(line);
        out.push_str(lead);
        if !core.is_empty() {
            out.push_str(mark);
            out.push_str(core);
            out.push_str(mark);
        }
        out.push_str(tail);
    }
}

/// Special link targets that render as mentions instead of URLs.
fn mention(href: &str) -> Option<String> {
    match href {
        "@here" | "@channel" | "@everyone" => Some(format!("<!{}>", &href[1..])),
        _ if href.starts_with("@S") => Some(format!("<!subteam^{}>", &href[1..])),
        _ if href.starts_with("@U") || href.starts_with("@W") => Some(format!("<@{}>", &href[1..])),
        _ if href.starts_with("#C") => Some(format!("<#{}>", &href[1..])),
        _ => None,
    }
}

fn plain(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&collapse_whitespace(text)),
        MarkupNode::LineBreak => out.push('\n'),
        MarkupNode::Bold(children)
        | MarkupNode::Italic(children)
        | MarkupNode::Strike(children)
        | MarkupNode::Code(children) => children.iter().for_each(|c| plain(c, out)),
        MarkupNode::Link { href, children } => {
            if children.is_empty() {
                out.push_str(href.as_deref().unwrap_or_default());
            }
            children.iter().for_each(|c| plain(c, out));
        }
        MarkupNode::Time {
            fallback, format, ..
        } => match fallback {
            Some(fallback) => out.push_str(fallback),
            None => format.iter().for_each(|c| plain(c, out)),
        },
        MarkupNode::Paragraph(children)
        | MarkupNode::Blockquote(children)
        | MarkupNode::Preformatted(children) => {
            out.push('\n');
            children.iter().for_each(|c| plain(c, out));
            out.push('\n');
        }
        MarkupNode::List(list) => {
            for item in &list.items {
                out.push('\n');
                item.children.iter().for_each(|c| plain(c, out));
            }
            out.push('\n');
        }
    }
}
