//! Welcome banner with a vertical color gradient (CLASS REGISTRY).

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};
use tracing::debug;

type Rgb = (u8, u8, u8);

/// Deep teal (#00796b).
const TEAL: Rgb = (0x00, 0x79, 0x6b);
/// Warm amber (#ffb300).
const AMBER: Rgb = (0xff, 0xb3, 0x00);

const TITLE: &str = "CLASS REGISTRY";
const TAGLINE: &str = "Weekly classes, monthly fees";

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// One color per line, first line `from`, last line `to`. A single line gets `to`.
fn gradient(lines: usize, from: Rgb, to: Rgb) -> Vec<Rgb> {
    (0..lines)
        .map(|i| {
            let t = if lines <= 1 {
                1.0
            } else {
                i as f64 / (lines - 1) as f64
            };
            lerp_rgb(from, to, t)
        })
        .collect()
}

fn fg((r, g, b): Rgb) -> SetForegroundColor {
    SetForegroundColor(Color::Rgb { r, g, b })
}

/// Renders `text` in figlet's standard font; plain text if the font fails to load.
fn render_art(text: &str) -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(text).map(|fig| fig.to_string()))
        .unwrap_or_else(|| format!("{}\n", text))
}

/// Writes `art` shaded teal to amber, followed by the version and tagline.
fn write_banner<W: Write>(out: &mut W, art: &str) -> io::Result<()> {
    let lines: Vec<&str> = art.lines().collect();
    for (line, color) in lines.iter().zip(gradient(lines.len(), TEAL, AMBER)) {
        queue!(out, fg(color), Print(line), Print("\r\n"), ResetColor)?;
    }
    queue!(
        out,
        fg(AMBER),
        Print(format!("v{}\r\n", env!("CARGO_PKG_VERSION"))),
        Print(format!("{}\r\n", TAGLINE)),
        ResetColor
    )?;
    out.flush()
}

pub fn print_welcome() {
    if let Err(e) = write_banner(&mut stdout().lock(), &render_art(TITLE)) {
        debug!(error = %e, "banner not printed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_runs_from_teal_to_amber() {
        assert_eq!(lerp_rgb(TEAL, AMBER, 0.0), TEAL);
        assert_eq!(lerp_rgb(TEAL, AMBER, 1.0), AMBER);

        let colors = gradient(6, TEAL, AMBER);
        assert_eq!(colors.len(), 6);
        assert_eq!(colors.first(), Some(&TEAL));
        assert_eq!(colors.last(), Some(&AMBER));
        assert_eq!(gradient(1, TEAL, AMBER), vec![AMBER]);
        assert!(gradient(0, TEAL, AMBER).is_empty());
    }

    #[test]
    fn art_is_multiline() {
        assert!(render_art("CR").lines().count() > 1);
    }

    #[test]
    fn banner_prints_every_line_then_version() {
        let mut buf = Vec::new();
        write_banner(&mut buf, "top\nbottom\n").unwrap();
        let text = String::from_utf8(buf).unwrap();

        let top = text.find("top").unwrap();
        let bottom = text.find("bottom").unwrap();
        let version = text.find(concat!("v", env!("CARGO_PKG_VERSION"))).unwrap();
        assert!(top < bottom && bottom < version);
        assert!(text.contains(TAGLINE));
        // Teal escape precedes the first line.
        assert!(text[..top].contains("38;2;0;121;107"));
    }
}
