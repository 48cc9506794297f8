//! DrawingML `a:effectLst` markup.

use crate::design::{DesignColor, EffectDesign};

const EMU_PER_POINT: f64 = 12_700.0;

fn emu(points: f64) -> i64 {
    (points * EMU_PER_POINT).round() as i64
}

/// Angles are stored in 60000ths of a degree, clockwise.
fn angle(degrees: f64) -> i64 {
    (degrees.rem_euclid(360.0) * 60_000.0).round() as i64
}

/// Opacity in 1000ths of a percent.
fn alpha(transparency: f64) -> i64 {
    ((100.0 - transparency) * 1_000.0).round() as i64
}

fn srgb(color: DesignColor, transparency: f64) -> String {
    format!(
        "<a:srgbClr val=\"{}\"><a:alpha val=\"{}\"/></a:srgbClr>",
        color.to_hex(),
        alpha(transparency)
    )
}

/// Children are written in schema order: glow, outer shadow, soft edge.
pub(crate) fn effect_list(effects: &EffectDesign) -> String {
    let mut xml = String::from("<a:effectLst>");
    if let Some(glow) = &effects.glow {
        xml.push_str(&format!(
            "<a:glow rad=\"{}\">{}</a:glow>",
            emu(glow.size),
            srgb(glow.color, glow.transparency)
        ));
    }
    if let Some(shadow) = &effects.shadow {
        let shadow = shadow.resolve();
        xml.push_str(&format!(
            "<a:outerShdw blurRad=\"{}\" dist=\"{}\" dir=\"{}\"",
            emu(shadow.blur),
            emu(shadow.distance),
            angle(shadow.angle)
        ));
        if shadow.scale != 100.0 {
            let scale = (shadow.scale * 1_000.0).round() as i64;
            xml.push_str(&format!(" sx=\"{}\" sy=\"{}\"", scale, scale));
        }
        xml.push_str(&format!(
            " algn=\"{}\" rotWithShape=\"0\">{}</a:outerShdw>",
            shadow.alignment.as_ooxml(),
            srgb(shadow.color, shadow.transparency)
        ));
    }
    if let Some(radius) = effects.soft_edge {
        xml.push_str(&format!("<a:softEdge rad=\"{}\"/>", emu(radius)));
    }
    xml.push_str("</a:effectLst>");
    xml
}
