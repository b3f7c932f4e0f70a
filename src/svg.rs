//! Scene serialization to SVG text
//!
//! Plain string building, no XML library. Attribute order comes from the
//! scene's sorted attribute maps and child order from creation order, so the
//! same scene always serializes to the same bytes.

use crate::scene::{NodeId, Scene};

/// Format a pixel value with up to three decimals, trailing zeros trimmed.
pub fn fmt_number(value: f64) -> String {
    let s = format!("{:.3}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Escape text for use in XML content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a scene from its root into a standalone SVG document.
pub fn render(scene: &Scene) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_node(scene, scene.root(), 0, &mut out);
    out
}

fn write_node(scene: &Scene, id: NodeId, depth: usize, out: &mut String) {
    let element = match scene.get(id) {
        Some(element) => element,
        None => return,
    };
    let pad = "  ".repeat(depth);
    out.push_str(&pad);
    out.push('<');
    out.push_str(element.tag());
    for (name, value) in element.attrs() {
        out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
    }

    match (element.text(), element.children()) {
        (None, []) => out.push_str("/>\n"),
        (Some(text), []) => {
            out.push_str(&format!(">{}</{}>\n", escape(text), element.tag()));
        }
        (text, children) => {
            out.push_str(">\n");
            if let Some(text) = text {
                out.push_str(&format!("{}  {}\n", pad, escape(text)));
            }
            for child in children {
                write_node(scene, *child, depth + 1, out);
            }
            out.push_str(&format!("{}</{}>\n", pad, element.tag()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_number_trims_zeros() {
        assert_eq!(fmt_number(735.0), "735");
        assert_eq!(fmt_number(380.25), "380.25");
        assert_eq!(fmt_number(4.0), "4");
        assert_eq!(fmt_number(0.5), "0.5");
        assert_eq!(fmt_number(-20.0), "-20");
        assert_eq!(fmt_number(1.0 / 3.0), "0.333");
    }

    #[test]
    fn test_escape_entities() {
        assert_eq!(escape("R&D <storm>"), "R&amp;D &lt;storm&gt;");
        assert_eq!(escape("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_document() {
        let mut scene = Scene::new("svg");
        scene.set_attr(scene.root(), "width", "800");
        let g = scene.create(scene.root(), "g");
        scene.set_attr(g, "class", "year");
        let path = scene.create(g, "path");
        scene.set_attr(path, "d", "M-4,0A4,4,0,0,1,4,0L0,0Z");
        let label = scene.create(scene.root(), "text");
        scene.set_text(label, "R&D <storm>");

        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<svg width=\"800\">
  <g class=\"year\">
    <path d=\"M-4,0A4,4,0,0,1,4,0L0,0Z\"/>
  </g>
  <text>R&amp;D &lt;storm&gt;</text>
</svg>
";
        assert_eq!(render(&scene), expected);
    }

    #[test]
    fn test_render_scene_with_only_root_self_closes() {
        let scene = Scene::new("svg");
        assert_eq!(
            render(&scene),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg/>\n"
        );
    }
}
