// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the flatcheck CLI.
//!
//! OneDark on dark terminals, One Light on light ones. Colors are dropped
//! entirely when stdout isn't a TTY or `NO_COLOR` is set, so piped output
//! (and the CLI tests) see plain text.
//!
//! # Theme detection order
//!
//! 1. `FLATCHECK_THEME` env var ("dark" or "light")
//! 2. `COLORFGBG` env var (terminal background hint)
//! 3. Default to dark theme

use std::sync::OnceLock;

/// Width between the `│` borders.
pub const BOX_WIDTH: usize = 72;

/// Bytes per hex dump line.
pub const HEX_ROW: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════
// THEME DETECTION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("FLATCHECK_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": backgrounds 7 and up (except 8, dark gray) are light.
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

// ═══════════════════════════════════════════════════════════════════════════
// PALETTES
// ═══════════════════════════════════════════════════════════════════════════

fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

mod onedark {
    pub const RED: (u8, u8, u8) = (224, 108, 117); // #e06c75
    pub const GREEN: (u8, u8, u8) = (152, 195, 121); // #98c379
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123); // #e5c07b
    pub const BLUE: (u8, u8, u8) = (97, 175, 239); // #61afef
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221); // #c678dd
    pub const CYAN: (u8, u8, u8) = (86, 182, 194); // #56b6c2
    pub const GRAY: (u8, u8, u8) = (92, 99, 112); // #5c6370
}

mod onelight {
    pub const RED: (u8, u8, u8) = (228, 86, 73); // #e45649
    pub const GREEN: (u8, u8, u8) = (80, 161, 79); // #50a14f
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1); // #c18401
    pub const BLUE: (u8, u8, u8) = (64, 120, 242); // #4078f2
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164); // #a626a4
    pub const CYAN: (u8, u8, u8) = (1, 132, 188); // #0184bc
    pub const GRAY: (u8, u8, u8) = (160, 161, 167); // #a0a1a7
}

macro_rules! theme_color {
    ($($name:ident),*) => {
        $(
            #[allow(non_snake_case)]
            pub fn $name() -> String {
                let (r, g, b) = match theme() {
                    Theme::Dark => onedark::$name,
                    Theme::Light => onelight::$name,
                };
                rgb(r, g, b)
            }
        )*
    };
}

theme_color!(RED, GREEN, YELLOW, BLUE, MAGENTA, CYAN, GRAY);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Colors on? (`NO_COLOR` unset and stdout is a TTY)
pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Theme color plus modifiers, or plain text when colors are off.
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Length as shown on screen (ANSI escapes excluded).
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

fn border(text: &str) -> String {
    themed(GRAY, &[], text)
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

/// │ content          │
pub fn row(content: &str) {
    let pad = BOX_WIDTH.saturating_sub(visible_len(content) + 1);
    println!("{} {}{}{}", border("│"), content, " ".repeat(pad), border("│"));
}

/// ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!("{}{}{}", border("┌"), label_part, border(&format!("{}┐", "─".repeat(remaining))));
}

/// ├─ LABEL ──────────┤
pub fn section_mid(label: &str) {
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!("{}{}{}", border("├"), label_part, border(&format!("{}┤", "─".repeat(remaining))));
}

/// └──────────────────┘
pub fn section_bot() {
    println!("{}", border(&format!("└{}┘", "─".repeat(BOX_WIDTH))));
}

/// `  label  value` inside a box.
pub fn kv(label: &str, value: &str) {
    row(&format!("{} {}", pad_right(&themed(GRAY, &[], label), 14), value));
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// ✓ / ✗ verdict.
pub fn verdict(ok: bool) -> String {
    if ok {
        themed(GREEN, &[BOLD], "✓ valid")
    } else {
        themed(RED, &[BOLD], "✗ invalid")
    }
}

/// Color-coded wire type: scalars, strings, vectors and tables differ.
pub fn type_badge(type_name: &str) -> String {
    let color: fn() -> String = if type_name.starts_with('[') {
        MAGENTA
    } else if type_name == "string" {
        GREEN
    } else if crate_scalar_name(type_name) {
        BLUE
    } else {
        YELLOW
    };
    themed(color, &[], type_name)
}

fn crate_scalar_name(name: &str) -> bool {
    flatcheck::ScalarType::from_name(name).is_some()
}

/// Dimmed marker for fields that fall back to their default.
pub fn default_marker() -> String {
    themed(GRAY, &[DIM], "(default)")
}

/// One hex dump line: offset, hex bytes, printable ASCII.
pub fn hex_line(offset: usize, chunk: &[u8]) -> String {
    let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = chunk
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!(
        "{}  {:<width$}  {}",
        themed(GRAY, &[], &format!("{:08x}", offset)),
        hex.join(" "),
        themed(GRAY, &[DIM], &ascii),
        width = HEX_ROW * 3 - 1
    )
}

pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_len_with_escapes() {
        assert_eq!(visible_len("plain"), 5);
        assert_eq!(visible_len("\x1b[32mhello\x1b[0m"), 5);
    }

    #[test]
    fn test_hex_line_pads_short_rows() {
        let full = hex_line(0, &[0u8; HEX_ROW]);
        let short = hex_line(16, b"ab");
        assert_eq!(visible_len(&full), visible_len(&short) + HEX_ROW - 2);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }

    #[test]
    fn test_theme_colors_are_different() {
        assert_ne!(onedark::RED, onelight::RED);
        assert_ne!(onedark::GRAY, onelight::GRAY);
    }
}
