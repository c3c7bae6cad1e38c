use std::fmt::Write;

use super::RenderError;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
   <head>
      <meta charset="UTF-8">
      <meta name="viewport" content="width=device-width, initial-scale=1.0">
"#;

const ASSETS: &str = r#"      <script src="https://unpkg.com/htmx.org@1.9.10"></script>
      <style>
         *, *::before, *::after {
           box-sizing: border-box;
         }
         * {
           margin: 0;
         }
         body {
           line-height: 1.5;
           -webkit-font-smoothing: antialiased;
         }
         img, picture, video, canvas, svg {
           display: block;
           max-width: 100%;
         }
         input, button, textarea, select {
           font: inherit;
         }
         p, h1, h2, h3, h4, h5, h6 {
           overflow-wrap: break-word;
         }
      </style>
   </head>
"#;

/// Full HTML document: shared head (htmx, CSS reset) around a page body.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub name: &'static str,
    pub title: &'a str,
    pub body: &'a str,
}

impl Page<'_> {
    pub fn render(&self) -> Result<String, RenderError> {
        let mut out = String::with_capacity(HEAD.len() + ASSETS.len() + self.body.len() + 128);
        self.write_into(&mut out)
            .map_err(|source| RenderError::new(self.name, source))?;
        Ok(out)
    }

    fn write_into(&self, out: &mut impl Write) -> std::fmt::Result {
        out.write_str(HEAD)?;
        writeln!(out, "      <title>{}</title>", self.title)?;
        out.write_str(ASSETS)?;
        writeln!(out, "   <body>\n      {}\n   </body>\n</html>", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_body_in_document() {
        let html = Page {
            name: "test",
            title: "Home",
            body: "<h1>Tools</h1>",
        }
        .render()
        .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("htmx.org"));
        assert!(html.contains("<body>\n      <h1>Tools</h1>\n   </body>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
