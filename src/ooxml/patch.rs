//! Streaming rewrites of chart and drawing parts that place an
//! `a:effectLst` inside a chosen `spPr` element.
//!
//! Everything else is copied through event by event. An `effectLst` that
//! already sits in a patched `spPr` is dropped in favour of the new one.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DesignError, Result};
use crate::ooxml::package::local_name;

struct Rewriter<'a> {
    writer: Writer<Cursor<Vec<u8>>>,
    path: Vec<Vec<u8>>,
    /// Depth of the `spPr` being patched and the markup it receives.
    open: Option<(usize, &'a str)>,
    skipping: usize,
}

impl<'a> Rewriter<'a> {
    fn new() -> Self {
        Rewriter {
            writer: Writer::new(Cursor::new(Vec::new())),
            path: Vec::new(),
            open: None,
            skipping: 0,
        }
    }

    fn path(&self) -> &[Vec<u8>] {
        &self.path
    }

    fn parent(&self) -> Option<&[u8]> {
        self.path.last().map(Vec::as_slice)
    }

    /// Swallows events while inside a replaced `effectLst`.
    fn skip(&mut self, event: &Event<'_>) -> bool {
        if self.skipping == 0 {
            return false;
        }
        match event {
            Event::Start(_) => self.skipping += 1,
            Event::End(_) => self.skipping -= 1,
            _ => (),
        }
        true
    }

    fn replaces(&self, name: &[u8]) -> bool {
        name == b"effectLst" && matches!(self.open, Some((depth, _)) if depth == self.path.len())
    }

    fn start(&mut self, e: BytesStart<'_>, effects: Option<&'a str>) -> Result<()> {
        let name = local_name(e.name().as_ref()).to_vec();
        if self.replaces(&name) {
            self.skipping = 1;
            return Ok(());
        }
        self.writer.write_event(Event::Start(e))?;
        self.path.push(name);
        if let Some(effects) = effects {
            self.open = Some((self.path.len(), effects));
        }
        Ok(())
    }

    fn empty(&mut self, e: BytesStart<'_>, effects: Option<&'a str>) -> Result<()> {
        let name = local_name(e.name().as_ref()).to_vec();
        if self.replaces(&name) {
            return Ok(());
        }
        match effects {
            Some(effects) => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                self.writer.write_event(Event::Start(e))?;
                self.raw(effects)?;
                self.writer.write_event(Event::End(BytesEnd::new(qname)))?;
            }
            None => self.writer.write_event(Event::Empty(e))?,
        }
        Ok(())
    }

    fn end(&mut self, e: BytesEnd<'_>) -> Result<()> {
        if let Some((depth, effects)) = self.open {
            if depth == self.path.len() {
                self.raw(effects)?;
                self.open = None;
            }
        }
        self.writer.write_event(Event::End(e))?;
        self.path.pop();
        Ok(())
    }

    fn raw(&mut self, xml: &str) -> Result<()> {
        self.writer.get_mut().write_all(xml.as_bytes())?;
        Ok(())
    }

    fn copy(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event)?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| DesignError::Ooxml(e.to_string()))
    }
}

/// `c:` in `c:chartSpace`; empty for unprefixed names.
fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|b| *b == b':') {
        Some(idx) => String::from_utf8_lossy(&name[..=idx]).into_owned(),
        None => String::new(),
    }
}

fn sp_pr(prefix: &str, effects: &str) -> String {
    format!("<{0}spPr>{1}</{0}spPr>", prefix, effects)
}

fn is(segment: &[u8], name: &[u8]) -> bool {
    segment == name
}

/// Adds effects to the chart area (`chartSpace/spPr`) and the plot area
/// (`chartSpace/chart/plotArea/spPr`), creating either `spPr` if the chart
/// has none.
pub(crate) fn patch_chart(
    xml: &str,
    chart_area: Option<&str>,
    plot_area: Option<&str>,
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Rewriter::new();
    let mut chart_area = chart_area;
    let mut plot_area = plot_area;
    let mut prefix = String::new();
    // Set after `</c:chart>`: the chart area's spPr, if any, comes next.
    let mut after_chart = false;

    loop {
        let event = reader.read_event()?;
        if out.skip(&event) {
            continue;
        }
        if after_chart && out.path().len() == 1 {
            // Whitespace and comments do not decide where the chart area goes.
            let next_is_sp_pr = match &event {
                Event::Start(e) | Event::Empty(e) => Some(local_name(e.name().as_ref()) == b"spPr"),
                Event::End(_) => Some(false),
                _ => None,
            };
            if let Some(next_is_sp_pr) = next_is_sp_pr {
                after_chart = false;
                if !next_is_sp_pr {
                    if let Some(effects) = chart_area.take() {
                        out.raw(&sp_pr(&prefix, effects))?;
                    }
                }
            }
        }
        match event {
            Event::Start(e) => {
                if out.path().is_empty() {
                    prefix = prefix_of(e.name().as_ref());
                }
                let effects = chart_target(out.path(), &e, &mut chart_area, &mut plot_area);
                out.start(e, effects)?;
            }
            Event::Empty(e) => {
                let closes_chart =
                    local_name(e.name().as_ref()) == b"chart" && out.path().len() == 1;
                let effects = chart_target(out.path(), &e, &mut chart_area, &mut plot_area);
                out.empty(e, effects)?;
                if closes_chart && chart_area.is_some() {
                    after_chart = true;
                }
            }
            Event::End(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                if is(&name, b"plotArea") && out.path().len() == 3 {
                    if let Some(effects) = plot_area.take() {
                        out.raw(&sp_pr(&prefix, effects))?;
                    }
                }
                let closes_chart = is(&name, b"chart") && out.path().len() == 2;
                out.end(e)?;
                if closes_chart && chart_area.is_some() {
                    after_chart = true;
                }
            }
            Event::Eof => break,
            other => out.copy(other)?,
        }
    }
    out.finish()
}

fn chart_target<'a>(
    path: &[Vec<u8>],
    e: &BytesStart<'_>,
    chart_area: &mut Option<&'a str>,
    plot_area: &mut Option<&'a str>,
) -> Option<&'a str> {
    if local_name(e.name().as_ref()) != b"spPr" {
        return None;
    }
    match path {
        [root] if is(root, b"chartSpace") => chart_area.take(),
        [root, chart, plot]
            if is(root, b"chartSpace") && is(chart, b"chart") && is(plot, b"plotArea") =>
        {
            plot_area.take()
        }
        _ => None,
    }
}

/// Adds effects to text-box shapes of a drawing part. `shapes` is keyed by
/// the shape's ordinal among the drawing's `xdr:sp` anchors.
pub(crate) fn patch_drawing(xml: &str, shapes: &BTreeMap<usize, String>) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Rewriter::new();
    let mut shape_count = 0;
    let mut current_shape = None;

    loop {
        let event = reader.read_event()?;
        if out.skip(&event) {
            continue;
        }
        match event {
            Event::Start(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                let mut effects = None;
                if is(&name, b"sp") && out.parent().is_some_and(|p| p.ends_with(b"Anchor")) {
                    current_shape = Some(shape_count);
                    shape_count += 1;
                } else if is(&name, b"spPr") && out.parent() == Some(b"sp".as_slice()) {
                    effects = current_shape
                        .and_then(|index| shapes.get(&index))
                        .map(String::as_str);
                }
                out.start(e, effects)?;
            }
            Event::Empty(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                let effects = if is(&name, b"spPr") && out.parent() == Some(b"sp".as_slice()) {
                    current_shape
                        .and_then(|index| shapes.get(&index))
                        .map(String::as_str)
                } else {
                    None
                };
                out.empty(e, effects)?;
            }
            Event::End(e) => out.end(e)?,
            Event::Eof => break,
            other => out.copy(other)?,
        }
    }
    out.finish()
}
