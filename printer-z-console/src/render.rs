use std::fmt::{Display, Write};

use printer_z::{DecodedFields, FileListFields, FontListFields, GeneralStatusFields};

const ABSENT: &str = "(not reported)";

pub fn render(decoded: &DecodedFields) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", decoded.query_id(), decoded.query_id().description());
    match decoded {
        DecodedFields::FontList(fields) => render_fonts(&mut out, fields),
        DecodedFields::FileList(fields) => render_files(&mut out, fields),
        DecodedFields::GeneralStatus(fields) => render_status(&mut out, fields),
    }
    out
}

fn render_fonts(out: &mut String, fields: &FontListFields) {
    let Some(fonts) = fields.fonts() else {
        let _ = writeln!(out, "Fonts: {ABSENT}");
        return;
    };
    let _ = writeln!(out, "Fonts ({}):", fonts.len());
    for font in fonts {
        let location = if font.is_resident() { "resident" } else { "downloaded" };
        match &font.name {
            Some(name) => {
                let _ = writeln!(out, "  {:<8} {:<10} {}", font.id, location, name);
            }
            None => {
                let _ = writeln!(out, "  {:<8} {}", font.id, location);
            }
        }
    }
    if fonts.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
}

fn render_files(out: &mut String, fields: &FileListFields) {
    match fields.files() {
        Some(files) => {
            let _ = writeln!(out, "Files ({}):", files.len());
            for file in files {
                let _ = writeln!(out, "  {:<24} {} bytes", file.name, file.size);
            }
            if files.is_empty() {
                let _ = writeln!(out, "  (none)");
            }
        }
        None => {
            let _ = writeln!(out, "Files: {ABSENT}");
        }
    }
    line(out, "Free bytes", fields.free());
}

fn render_status(out: &mut String, fields: &GeneralStatusFields) {
    line(out, "Paper out", fields.paper_out().map(yes_no));
    line(out, "Latch open", fields.latch_open().map(yes_no));
    line(out, "Battery low", fields.battery_low().map(yes_no));
    line(out, "Head over temperature", fields.head_over_temperature().map(yes_no));
    line(
        out,
        "Battery voltage",
        fields.battery_voltage().map(|v| format!("{v:.2} V")),
    );
}

fn line<T: Display>(out: &mut String, label: &str, value: Option<T>) {
    let _ = match value {
        Some(value) => writeln!(out, "{label}: {value}"),
        None => writeln!(out, "{label}: {ABSENT}"),
    };
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
