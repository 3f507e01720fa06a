use std::path::Path;

use log::info;

use super::{Scene, Shape};
use crate::color::rgb_color_string;
use crate::error::Result;
use crate::layers::Axis;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn to_svg(scene: &Scene) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<rect width="100%" height="100%" fill="white"/>
"#,
        scene.width, scene.height, scene.width, scene.height
    ));
    if scene.transform.is_identity() {
        svg.push_str("<g>\n");
    } else {
        svg.push_str(&format!(r#"<g transform="{}">"#, scene.transform.to_svg()));
        svg.push('\n');
    }

    for group in &scene.groups {
        if group.visible {
            svg.push_str(&format!(r#"<g id="{}">"#, group.id));
        } else {
            svg.push_str(&format!(r#"<g id="{}" display="none">"#, group.id));
        }
        svg.push('\n');
        for shape in &group.shapes {
            match shape {
                Shape::Rect {
                    rect,
                    fill,
                    stroke,
                    title,
                } => {
                    let fill_attr = match fill {
                        Some(p) if p.opacity < 1.0 => format!(
                            r#"fill="{}" fill-opacity="{}""#,
                            rgb_color_string(p.color),
                            p.opacity
                        ),
                        Some(p) => format!(r#"fill="{}""#, rgb_color_string(p.color)),
                        None => r#"fill="none""#.to_string(),
                    };
                    let stroke_attr = match stroke {
                        Some(c) => format!(r#" stroke="{}""#, rgb_color_string(*c)),
                        None => String::new(),
                    };
                    svg.push_str(&format!(
                        r#"<rect x="{}" y="{}" width="{}" height="{}" {}{}"#,
                        rect.x, rect.y, rect.width, rect.height, fill_attr, stroke_attr
                    ));
                    match title {
                        Some(t) => svg.push_str(&format!("><title>{}</title></rect>", escape_xml(t))),
                        None => svg.push_str("/>"),
                    }
                }
                Shape::Label { at, text, axis } => {
                    let align = match axis {
                        Axis::X => r#" text-anchor="middle" dominant-baseline="hanging""#,
                        Axis::Y => r#" dominant-baseline="middle""#,
                    };
                    svg.push_str(&format!(
                        r#"<text x="{}" y="{}"{}>{}</text>"#,
                        at.x,
                        at.y,
                        align,
                        escape_xml(text)
                    ));
                }
            }
            svg.push('\n');
        }
        svg.push_str("</g>\n");
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

pub fn write_svg(scene: &Scene, path: &Path) -> Result<()> {
    std::fs::write(path, to_svg(scene))?;
    info!("Wrote SVG to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point, Rect, Transform};
    use crate::render::{Group, Paint};
    use rgb::RGB8;
    use rstest::rstest;

    #[rstest]
    fn test_svg_structure() {
        let scene = Scene {
            width: 100,
            height: 50,
            transform: Transform::new(-10.0, -20.0, 2.0),
            groups: vec![
                Group {
                    id: "chrom_group",
                    visible: false,
                    shapes: vec![],
                },
                Group {
                    id: "unique_group",
                    visible: true,
                    shapes: vec![
                        Shape::Rect {
                            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                            fill: Some(Paint {
                                color: RGB8::new(255, 0, 0),
                                opacity: 0.5,
                            }),
                            stroke: None,
                            title: None,
                        },
                        Shape::Rect {
                            rect: Rect::new(5.0, 6.0, 1.0, 1.0),
                            fill: Some(Paint::solid(RGB8::new(0, 0, 255))),
                            stroke: None,
                            title: Some("Sample: A&B\nProximal start: 5".to_string()),
                        },
                    ],
                },
                Group {
                    id: "x-axis",
                    visible: true,
                    shapes: vec![Shape::Label {
                        at: Point::new(5.0, 0.0),
                        text: "X<&>".to_string(),
                        axis: Axis::X,
                    }],
                },
            ],
        };
        let svg = to_svg(&scene);
        assert!(svg.contains(r#"<g transform="translate(-10,-20)scale(2)">"#));
        assert!(svg.contains(r#"<g id="chrom_group" display="none">"#));
        assert!(svg.contains(
            r#"<rect x="1" y="2" width="3" height="4" fill="rgb(255,0,0)" fill-opacity="0.5"/>"#
        ));
        assert!(svg.contains(
            "<rect x=\"5\" y=\"6\" width=\"1\" height=\"1\" fill=\"rgb(0,0,255)\"><title>Sample: A&amp;B\nProximal start: 5</title></rect>"
        ));
        assert!(svg.contains("X&lt;&amp;&gt;</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
