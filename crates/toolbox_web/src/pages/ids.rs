//! IDs page and the generated-id fragment it swaps in.

use std::fmt::Write;

use super::{NEW_ID_PATH, RenderError};
use crate::id::DecodedId;

/// Target element the fragment replaces.
pub const RESULT_TARGET: &str = "generated-id";

/// Selectable id schemes. Only xid-style ids exist today.
pub const SCHEMES: &[&str] = &["xid"];

pub fn ids_body() -> Result<String, RenderError> {
    let mut out = String::new();
    write_ids_body(&mut out).map_err(|source| RenderError::new("ids", source))?;
    Ok(out)
}

fn write_ids_body(out: &mut impl Write) -> std::fmt::Result {
    writeln!(out, "<h1>IDs</h1>")?;
    writeln!(
        out,
        r##"<select hx-post="{NEW_ID_PATH}" hx-trigger="change" hx-target="#{RESULT_TARGET}">"##
    )?;
    writeln!(out, "\t<option></option>")?;
    for scheme in SCHEMES {
        writeln!(out, r#"	<option value="{scheme}">{scheme}</option>"#)?;
    }
    writeln!(out, "</select>\n")?;
    writeln!(out, r#"<div id="{RESULT_TARGET}"></div>"#)
}

const COPY_SCRIPT: &str = r#"<script>
	async function copyText() {
		const x = document.getElementById('generatedIDValue').value;
		await navigator.clipboard.writeText(x || '');
	}
</script>
"#;

/// Table of the decoded fields, with a copy button next to the id.
pub fn result_fragment(decoded: &DecodedId) -> Result<String, RenderError> {
    let mut out = String::new();
    write_result(&mut out, decoded).map_err(|source| RenderError::new("id result", source))?;
    Ok(out)
}

fn write_result(out: &mut impl Write, decoded: &DecodedId) -> std::fmt::Result {
    writeln!(out, r#"<table id="idResultTable">"#)?;
    writeln!(
        out,
        r#"  <tr>
    <td style="text-align: left">ID</td>
    <td style="text-align: right"><button onClick="copyText()">Copy</button><input id="generatedIDValue" type="text" disabled value="{}" /></td>
  </tr>"#,
        decoded.id
    )?;
    write_row(out, "Time", &decoded.time)?;
    write_row(out, "Machine", &decoded.machine)?;
    write_row(out, "Pid", &decoded.pid)?;
    write_row(out, "Counter", &decoded.counter)?;
    writeln!(out, "</table>")?;
    out.write_str(COPY_SCRIPT)
}

fn write_row(out: &mut impl Write, label: &str, value: &dyn std::fmt::Display) -> std::fmt::Result {
    writeln!(
        out,
        r#"  <tr>
    <td style="text-align: left">{label}</td>
    <td style="text-align: right"><input type="text" disabled value="{value}" /></td>
  </tr>"#
    )
}
