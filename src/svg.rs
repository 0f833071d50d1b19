//! SVG path fragment helpers and the standalone preview document.
//!
//! Block outlines are built as one continuous path string from small
//! fragments. Every helper returns a fragment with a trailing space so
//! fragments concatenate without separators.

use std::fmt::Write;

/// Relative move: `m dx,dy`.
pub fn move_by(dx: f64, dy: f64) -> String {
    format!("m {},{} ", dx, dy)
}

/// Absolute move: `M x,y`.
pub fn move_to(x: f64, y: f64) -> String {
    format!("M {},{} ", x, y)
}

/// Single-axis line, e.g. `line_on_axis('h', 5.0)` or `line_on_axis('V', 20.0)`.
pub fn line_on_axis(axis: char, value: f64) -> String {
    format!("{} {} ", axis, value)
}

/// A point operand: `x,y`.
pub fn point(x: f64, y: f64) -> String {
    format!("{},{}", x, y)
}

/// Relative polyline: `l x,y x,y ...`.
pub fn line(points: &[(f64, f64)]) -> String {
    let mut path = String::from("l");
    for &(x, y) in points {
        write!(&mut path, " {}", point(x, y)).unwrap();
    }
    path.push(' ');
    path
}

/// Cubic curve command (`c` or the smooth continuation `s`).
pub fn curve(command: char, points: &[(f64, f64)]) -> String {
    let mut path = String::new();
    write!(&mut path, "{}", command).unwrap();
    for &(x, y) in points {
        write!(&mut path, " {}", point(x, y)).unwrap();
    }
    path.push(' ');
    path
}

/// Arc with equal radii: `a r,r flags x,y`.
pub fn arc(command: char, flags: &str, radius: f64, end: (f64, f64)) -> String {
    format!(
        "{} {},{} {} {} ",
        command,
        radius,
        radius,
        flags,
        point(end.0, end.1)
    )
}

/// Margin around the block in [`preview`] documents, in px.
const PREVIEW_MARGIN: f64 = 20.0;

/// Wrap an outline path and its inline cutouts in a standalone SVG document.
///
/// This is a development aid for the CLI and the wasm demo; the editor proper
/// hands the raw path strings to its own DOM layer.
pub fn preview(outline: &str, inline: &str, width: f64, height: f64) -> String {
    let doc_w = width + PREVIEW_MARGIN * 2.0;
    let doc_h = height + PREVIEW_MARGIN * 2.0;

    let mut svg = String::new();
    writeln!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        doc_w, doc_h, -PREVIEW_MARGIN, -PREVIEW_MARGIN, doc_w, doc_h
    )
    .unwrap();

    writeln!(
        &mut svg,
        r#"<style>
  .block-outline {{ fill: #5b80a5; stroke: #496684; stroke-width: 1; }}
  .block-cutout {{ fill: #fff; stroke: #496684; stroke-width: 1; }}
</style>"#
    )
    .unwrap();

    writeln!(
        &mut svg,
        r#"<path class="block-outline" d="{}" />"#,
        outline.trim()
    )
    .unwrap();
    if !inline.trim().is_empty() {
        writeln!(
            &mut svg,
            r#"<path class="block-cutout" d="{}" />"#,
            inline.trim()
        )
        .unwrap();
    }

    writeln!(&mut svg, "</svg>").unwrap();
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_and_line() {
        assert_eq!(move_by(0.0, 8.0), "m 0,8 ");
        assert_eq!(move_to(2.5, -1.0), "M 2.5,-1 ");
        assert_eq!(line_on_axis('h', 15.0), "h 15 ");
        assert_eq!(line_on_axis('V', 24.5), "V 24.5 ");
    }

    #[test]
    fn test_polyline() {
        assert_eq!(
            line(&[(6.0, 4.0), (3.0, 0.0), (6.0, -4.0)]),
            "l 6,4 3,0 6,-4 "
        );
    }

    #[test]
    fn test_curve_and_arc() {
        assert_eq!(
            curve('c', &[(30.0, -15.0), (70.0, -15.0), (100.0, 0.0)]),
            "c 30,-15 70,-15 100,0 "
        );
        assert_eq!(arc('a', "0 0,1", 8.0, (8.0, -8.0)), "a 8,8 0 0,1 8,-8 ");
    }

    #[test]
    fn test_preview_document() {
        let svg = preview("m 0,0 h 10 v 10 h -10 z", "", 10.0, 10.0);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("block-outline"));
        assert!(!svg.contains("block-cutout"));
        assert!(svg.contains("</svg>"));
    }
}
