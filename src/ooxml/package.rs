//! The parts of a saved `.xlsx` package and the relationships between them.

use std::io::{Cursor, Read, Write};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{DesignError, Result};

const OFFICE_DOCUMENT: &str = "/officeDocument";
const WORKSHEET: &str = "/worksheet";
const DRAWING: &str = "/drawing";
const CHART: &str = "/chart";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub external: bool,
}

/// Strips a namespace prefix from an element or attribute name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Name of the relationships part belonging to `part`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolves a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or(target);
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = source_part.rsplit_once('/').map_or("", |(dir, _)| dir);
            format!("{}/{}", dir, target)
        }
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Attributes (local name, unescaped value) of every `element` in `xml`,
/// in document order.
fn element_attributes(xml: &[u8], element: &[u8]) -> Result<Vec<Vec<(String, String)>>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut found = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(DesignError::Ooxml(format!(
                    "Error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                )))
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == element =>
            {
                let mut attributes = Vec::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = String::from_utf8_lossy(local_name(attr.key.as_ref())).into_owned();
                    let value = attr.unescape_value()?.into_owned();
                    attributes.push((key, value));
                }
                found.push(attributes);
            }
            _ => (),
        }
        buf.clear();
    }
    Ok(found)
}

fn attribute<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    for attributes in element_attributes(xml, b"Relationship")? {
        let (Some(id), Some(type_uri), Some(target)) = (
            attribute(&attributes, "Id"),
            attribute(&attributes, "Type"),
            attribute(&attributes, "Target"),
        ) else {
            continue;
        };
        relationships.push(Relationship {
            id: id.to_string(),
            type_uri: type_uri.to_string(),
            target: target.to_string(),
            external: attribute(&attributes, "TargetMode")
                .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
        });
    }
    Ok(relationships)
}

/// An unpacked `.xlsx` package. Parts keep their original order so the
/// rewritten archive still starts with `[Content_Types].xml`.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            parts.push((name, buf));
        }
        Ok(Package { parts })
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// A part that must exist, as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<&str> {
        let bytes = self
            .part(name)
            .ok_or_else(|| DesignError::Ooxml(format!("part {} is missing", name)))?;
        std::str::from_utf8(bytes)
            .map_err(|e| DesignError::Ooxml(format!("part {} is not UTF-8: {}", name, e)))
    }

    /// Replaces a part, or appends it when the package does not have it.
    pub fn set_part(&mut self, name: &str, bytes: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = bytes,
            None => self.parts.push((name.to_string(), bytes)),
        }
    }

    /// Relationships owned by `part`; empty when it has no `.rels` part.
    pub fn relationships(&self, part: &str) -> Result<Vec<Relationship>> {
        match self.part(&rels_path_for(part)) {
            Some(xml) => parse_relationships(xml),
            None => Ok(Vec::new()),
        }
    }

    /// Internal targets of `part`'s relationships whose type ends with
    /// `kind`, keyed by relationship id.
    fn targets(&self, part: &str, kind: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .relationships(part)?
            .into_iter()
            .filter(|r| !r.external && r.type_uri.ends_with(kind))
            .map(|r| (r.id, resolve_target(part, &r.target)))
            .collect())
    }

    pub fn workbook_part(&self) -> Result<String> {
        Ok(self
            .targets("", OFFICE_DOCUMENT)?
            .into_iter()
            .next()
            .map(|(_, target)| target)
            .unwrap_or_else(|| "xl/workbook.xml".to_string()))
    }

    /// Worksheet names and their parts, in workbook order.
    pub fn worksheet_parts(&self) -> Result<Vec<(String, String)>> {
        let workbook = self.workbook_part()?;
        let targets = self.targets(&workbook, WORKSHEET)?;
        let mut sheets = Vec::new();
        for attributes in element_attributes(self.part_str(&workbook)?.as_bytes(), b"sheet")? {
            let (Some(name), Some(id)) = (attribute(&attributes, "name"), attribute(&attributes, "id"))
            else {
                continue;
            };
            if let Some((_, part)) = targets.iter().find(|(rid, _)| rid == id) {
                sheets.push((name.to_string(), part.clone()));
            }
        }
        Ok(sheets)
    }

    pub fn drawing_for(&self, sheet_part: &str) -> Result<Option<String>> {
        Ok(self
            .targets(sheet_part, DRAWING)?
            .into_iter()
            .next()
            .map(|(_, target)| target))
    }

    /// Chart parts referenced by a drawing, in the drawing's anchor order.
    pub fn chart_parts(&self, drawing_part: &str) -> Result<Vec<String>> {
        let targets = self.targets(drawing_part, CHART)?;
        let mut charts = Vec::new();
        for attributes in element_attributes(self.part_str(drawing_part)?.as_bytes(), b"chart")? {
            let Some(id) = attribute(&attributes, "id") else {
                continue;
            };
            if let Some((_, part)) = targets.iter().find(|(rid, _)| rid == id) {
                charts.push(part.clone());
            }
        }
        Ok(charts)
    }

    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_package(entries: &[(&str, &str)]) -> Package {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, xml) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();
        Package::from_bytes(&bytes).unwrap()
    }

    const ROOT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data &amp; Notes" sheetId="1" r:id="rId2"/><sheet name="Charts" sheetId="2" r:id="rId1"/></sheets></workbook>"#;
    const WORKBOOK_RELS: &str = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet1.xml"/></Relationships>"#;
    const SHEET_RELS: &str = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/></Relationships>"#;
    const DRAWING: &str = r#"<xdr:wsDr xmlns:xdr="x" xmlns:c="c" xmlns:r="r"><xdr:twoCellAnchor><xdr:graphicFrame><c:chart r:id="rId2"/></xdr:graphicFrame></xdr:twoCellAnchor><xdr:twoCellAnchor><xdr:graphicFrame><c:chart r:id="rId1"/></xdr:graphicFrame></xdr:twoCellAnchor></xdr:wsDr>"#;
    const DRAWING_RELS: &str = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart2.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/></Relationships>"#;

    fn sample() -> Package {
        build_package(&[
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet2.xml", "<worksheet/>"),
            ("xl/worksheets/_rels/sheet2.xml.rels", SHEET_RELS),
            ("xl/drawings/drawing1.xml", DRAWING),
            ("xl/drawings/_rels/drawing1.xml.rels", DRAWING_RELS),
        ])
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "./worksheets/sheet3.xml#x"),
            "xl/worksheets/sheet3.xml"
        );
    }

    #[test]
    fn test_walks_workbook_to_charts() -> Result<()> {
        let package = sample();
        assert_eq!(package.workbook_part()?, "xl/workbook.xml");
        assert_eq!(
            package.worksheet_parts()?,
            vec![
                ("Data & Notes".to_string(), "xl/worksheets/sheet1.xml".to_string()),
                ("Charts".to_string(), "xl/worksheets/sheet2.xml".to_string()),
            ]
        );
        assert_eq!(
            package.drawing_for("xl/worksheets/sheet2.xml")?.as_deref(),
            Some("xl/drawings/drawing1.xml")
        );
        assert_eq!(package.drawing_for("xl/worksheets/sheet1.xml")?, None);
        assert_eq!(
            package.chart_parts("xl/drawings/drawing1.xml")?,
            vec!["xl/charts/chart1.xml", "xl/charts/chart2.xml"]
        );
        Ok(())
    }

    #[test]
    fn test_external_relationships_are_flagged() -> Result<()> {
        let rels = parse_relationships(SHEET_RELS.as_bytes())?;
        assert_eq!(rels.len(), 2);
        assert!(!rels[0].external);
        assert!(rels[1].external);
        Ok(())
    }

    #[test]
    fn test_set_part_keeps_order_and_rewrites() -> Result<()> {
        let mut package = sample();
        package.set_part("xl/worksheets/sheet2.xml", b"<worksheet><x/></worksheet>".to_vec());
        package.set_part("xl/extra.xml", b"<extra/>".to_vec());
        let reread = Package::from_bytes(&package.write_to_bytes()?)?;
        let names: Vec<&str> = reread.part_names().collect();
        assert_eq!(names.first(), Some(&"_rels/.rels"));
        assert_eq!(names.last(), Some(&"xl/extra.xml"));
        assert_eq!(reread.part_str("xl/worksheets/sheet2.xml")?, "<worksheet><x/></worksheet>");
        assert!(reread.part_str("xl/missing.xml").is_err());
        Ok(())
    }
}
