//! Line-format output.
//!
//! Writes the human-readable line format used by dump consumers:
//!
//! ```text
//! 001 00 *a 12345678 *b 870970
//! 245 00 *a Some title
//! $
//! ```
//!
//! Subfield values containing `*` or `@` are escaped with `@`.

use super::{Field, MarcRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatWriter;

impl LineFormatWriter {
    pub fn write(&self, record: &MarcRecord) -> Vec<u8> {
        let mut out = String::new();
        for field in &record.fields {
            match field {
                Field::Data(data) => {
                    out.push_str(&data.tag);
                    out.push(' ');
                    out.push(data.ind1.unwrap_or(' '));
                    out.push(data.ind2.unwrap_or(' '));
                    if let Some(ind3) = data.ind3 {
                        out.push(ind3);
                    }
                    for subfield in &data.subfields {
                        out.push_str(" *");
                        out.push(subfield.code);
                        out.push(' ');
                        push_escaped(&mut out, &subfield.data);
                    }
                }
                Field::Control(control) => {
                    out.push_str(&control.tag);
                    out.push(' ');
                    out.push_str(&control.data);
                }
            }
            out.push('\n');
        }
        out.push_str("$\n");
        out.into_bytes()
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == '*' || c == '@' {
            out.push('@');
        }
        out.push(c);
    }
}
